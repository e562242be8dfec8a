use tracing::info;

use nova_core::{Context, Error};
use nova_gate::{CommandCategory, CommandSpec};

use crate::CommandMeta;
use crate::moderation::embeds::guild_only_message;

pub const META: CommandMeta = CommandMeta {
    name: "reload",
    desc: "Reload this server's configuration from the dashboard.",
    usage: "!reload",
    spec: CommandSpec::new("reload", CommandCategory::Admin).admin_only(),
};

#[poise::command(prefix_command, slash_command, category = "Admin")]
pub async fn reload(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let configs = ctx.data().configs();
    configs.invalidate(guild_id.get());
    info!(guild_id = %guild_id, "guild config cache invalidated on request");

    let reply = if configs.get(guild_id.get()).await.is_some() {
        "Configuration reloaded."
    } else {
        "Configuration cache cleared, but the configuration could not be loaded. Moderator and admin commands stay unavailable until it can."
    };
    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;

    Ok(())
}
