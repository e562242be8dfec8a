use poise::serenity_prelude as serenity;
use tracing::{error, info};

use nova_core::Data;
use nova_database::impls::guild_config::{delete_guild_config, get_or_create_guild_config};

/// Make sure a joined guild has a stored configuration.
///
/// Guilds replayed from the gateway on startup (`is_new == Some(false)`)
/// already have one.
pub async fn handle_guild_create(data: &Data, guild: &serenity::Guild, is_new: Option<bool>) {
    if is_new == Some(false) {
        return;
    }

    info!(guild_id = %guild.id, guild_name = %guild.name, "joined guild");

    let created = match &data.backend {
        Some(backend) => backend
            .create_guild_config(guild.id.get())
            .await
            .map(|_| ())
            .map_err(anyhow::Error::from),
        None => get_or_create_guild_config(&data.db, guild.id.get())
            .await
            .map(|_| ()),
    };

    if let Err(source) = created {
        error!(?source, guild_id = %guild.id, "failed to create guild config");
    }
}

/// Drop the cached config for a guild the bot left, and the stored one too
/// when `DELETE_CONFIG_ON_LEAVE` is set.
///
/// Outages also arrive as guild deletes; those keep everything.
pub async fn handle_guild_delete(data: &Data, guild: &serenity::UnavailableGuild) {
    if guild.unavailable {
        return;
    }

    info!(guild_id = %guild.id, "left guild");
    data.configs().invalidate(guild.id.get());

    if !data.delete_config_on_leave {
        return;
    }

    let deleted = match &data.backend {
        Some(backend) => backend
            .delete_guild_config(guild.id.get())
            .await
            .map_err(anyhow::Error::from),
        None => delete_guild_config(&data.db, guild.id.get()).await,
    };

    match deleted {
        Ok(existed) => info!(guild_id = %guild.id, existed, "deleted guild config"),
        Err(source) => error!(?source, guild_id = %guild.id, "failed to delete guild config"),
    }
}
