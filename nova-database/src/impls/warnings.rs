use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::database::Database;
use crate::model::warnings::{NewWarning, WarningEntry, WarningRecord};

#[derive(sqlx::FromRow)]
struct WarningRow {
    id: i64,
    user_id: i64,
    user_tag: String,
    moderator_id: i64,
    moderator_tag: String,
    reason: String,
    warned_at: i64,
}

impl TryFrom<WarningRow> for WarningEntry {
    type Error = anyhow::Error;

    fn try_from(row: WarningRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: u64::try_from(row.user_id).context("user_id row out of u64 range")?,
            user_tag: row.user_tag,
            moderator_id: u64::try_from(row.moderator_id)
                .context("moderator_id row out of u64 range")?,
            moderator_tag: row.moderator_tag,
            reason: row.reason,
            warned_at: u64::try_from(row.warned_at).context("warned_at row out of u64 range")?,
        })
    }
}

/// Record a warning and return its id with the user's new warning count.
pub async fn record_warning(db: &Database, warning: NewWarning<'_>) -> anyhow::Result<WarningRecord> {
    let guild_id = i64::try_from(warning.guild_id).context("guild_id out of i64 range")?;
    let user_id = i64::try_from(warning.user_id).context("user_id out of i64 range")?;
    let moderator_id =
        i64::try_from(warning.moderator_id).context("moderator_id out of i64 range")?;
    let warned_at = i64::try_from(now_unix_secs()).context("warned_at out of i64 range")?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO warnings (guild_id, user_id, user_tag, moderator_id, moderator_tag, reason, warned_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id",
    )
    .bind(guild_id)
    .bind(user_id)
    .bind(warning.user_tag)
    .bind(moderator_id)
    .bind(warning.moderator_tag)
    .bind(warning.reason)
    .bind(warned_at)
    .fetch_one(db.pool())
    .await?;

    let warning_count = count_warnings(db, warning.guild_id, warning.user_id).await?;

    Ok(WarningRecord { id, warning_count })
}

pub async fn count_warnings(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<u64> {
    let guild_id = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let user_id = i64::try_from(user_id).context("user_id out of i64 range")?;

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM warnings WHERE guild_id = $1 AND user_id = $2")
            .bind(guild_id)
            .bind(user_id)
            .fetch_one(db.pool())
            .await?;

    u64::try_from(count).context("warning count out of u64 range")
}

/// Warnings for a user, newest first.
pub async fn list_warnings(
    db: &Database,
    guild_id: u64,
    user_id: u64,
) -> anyhow::Result<Vec<WarningEntry>> {
    let guild_id = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let user_id = i64::try_from(user_id).context("user_id out of i64 range")?;

    let rows: Vec<WarningRow> = sqlx::query_as(
        "SELECT id, user_id, user_tag, moderator_id, moderator_tag, reason, warned_at
         FROM warnings
         WHERE guild_id = $1 AND user_id = $2
         ORDER BY warned_at DESC, id DESC",
    )
    .bind(guild_id)
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(WarningEntry::try_from).collect()
}

pub async fn clear_warnings(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<u64> {
    let guild_id = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let user_id = i64::try_from(user_id).context("user_id out of i64 range")?;

    let deleted = sqlx::query("DELETE FROM warnings WHERE guild_id = $1 AND user_id = $2")
        .bind(guild_id)
        .bind(user_id)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted)
}

pub(crate) fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}
