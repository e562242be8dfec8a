use anyhow::Context as _;
use sqlx::types::Json;
use tracing::info;

use nova_gate::{ConfigChange, GuildConfig, diff_configs};

use crate::cache::GUILD_CONFIG_CACHE_TTL;
use crate::database::Database;
use crate::impls::warnings::now_unix_secs;

/// Fetch a guild's config, creating the default one on first access.
///
/// Reads go through the Redis cache when it is enabled.
pub async fn get_or_create_guild_config(db: &Database, guild_id: u64) -> anyhow::Result<GuildConfig> {
    let key = db.cache().guild_config_key(guild_id);
    db.cache()
        .get_or_load_json(&key, GUILD_CONFIG_CACHE_TTL, || load_or_insert(db, guild_id))
        .await
}

async fn load_or_insert(db: &Database, guild_id: u64) -> anyhow::Result<GuildConfig> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let now = i64::try_from(now_unix_secs()).context("timestamp out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_configs (guild_id, config, created_at, updated_at)
         VALUES ($1, $2, $3, $3)
         ON CONFLICT (guild_id) DO NOTHING",
    )
    .bind(guild_id_i64)
    .bind(Json(GuildConfig::new(guild_id)))
    .bind(now)
    .execute(db.pool())
    .await?;

    let config: Json<GuildConfig> =
        sqlx::query_scalar("SELECT config FROM guild_configs WHERE guild_id = $1")
            .bind(guild_id_i64)
            .fetch_one(db.pool())
            .await?;

    Ok(config.0)
}

/// Validate and store a new config, returning what changed.
///
/// Each change is logged. The Redis entry is evicted; in-process caches pick
/// up the new value when their entry expires or is invalidated.
pub async fn update_guild_config(
    db: &Database,
    guild_id: u64,
    updated: &GuildConfig,
) -> anyhow::Result<Vec<ConfigChange>> {
    anyhow::ensure!(
        updated.guild_id == guild_id.to_string(),
        "config for guild {} cannot be stored under guild {guild_id}",
        updated.guild_id
    );
    updated
        .validate()
        .with_context(|| format!("invalid config for guild {guild_id}"))?;

    let current = load_or_insert(db, guild_id).await?;
    let changes = diff_configs(&current, updated);
    if changes.is_empty() {
        return Ok(changes);
    }

    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let now = i64::try_from(now_unix_secs()).context("timestamp out of i64 range")?;

    sqlx::query("UPDATE guild_configs SET config = $2, updated_at = $3 WHERE guild_id = $1")
        .bind(guild_id_i64)
        .bind(Json(updated))
        .bind(now)
        .execute(db.pool())
        .await?;

    db.cache().evict(&db.cache().guild_config_key(guild_id)).await;

    for change in &changes {
        info!(
            guild_id,
            path = %change.path,
            old = %change.old,
            new = %change.new,
            "guild config changed"
        );
    }

    Ok(changes)
}

/// Remove a guild's stored config. Returns whether one existed.
pub async fn delete_guild_config(db: &Database, guild_id: u64) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let deleted = sqlx::query("DELETE FROM guild_configs WHERE guild_id = $1")
        .bind(guild_id_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    db.cache().evict(&db.cache().guild_config_key(guild_id)).await;

    Ok(deleted > 0)
}
