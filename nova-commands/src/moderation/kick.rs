use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::CommandMeta;
use crate::moderation::embeds::{
    guild_only_message, is_missing_permissions_error, moderation_action_embed, usage_message,
};
use crate::moderation::logging::{ModAction, ModLogEntry, publish_mod_action};
use crate::moderation::target::{TargetAction, check_target};
use nova_core::{Context, Error};
use nova_gate::{CommandCategory, CommandSpec};

pub const META: CommandMeta = CommandMeta {
    name: "kick",
    desc: "Kick a user from the server.",
    usage: "!kick <user> [reason]",
    spec: CommandSpec::new("kick", CommandCategory::Mod).mod_only(),
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "The user to kick"] user: Option<serenity::User>,
    #[description = "Reason for the kick"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if let Err(message) = check_target(TargetAction::Kick, ctx.author().id, user.id, user.bot) {
        ctx.say(message).await?;
        return Ok(());
    }

    let kick_result = guild_id
        .kick_with_reason(
            ctx.http(),
            user.id,
            reason.as_deref().unwrap_or("No reason provided"),
        )
        .await;

    if let Err(source) = kick_result {
        if !is_missing_permissions_error(&source) {
            error!(?source, "kick request failed");
        }
        ctx.say("I cannot kick this user. They may have higher permissions.")
            .await?;
        return Ok(());
    }

    info!(
        guild_id = %guild_id,
        user_id = %user.id,
        moderator_id = %ctx.author().id,
        "member kicked"
    );

    let embed = moderation_action_embed(&user, "kicked", reason.as_deref(), None);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    let log_entry =
        ModLogEntry::new(ModAction::Kick, ctx.author(), &user).reason(reason.as_deref());
    publish_mod_action(&ctx, guild_id, log_entry).await;

    Ok(())
}
