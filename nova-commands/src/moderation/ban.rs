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
    name: "ban",
    desc: "Ban a user from the server.",
    usage: "!ban <user> [reason]",
    spec: CommandSpec::new("ban", CommandCategory::Mod).mod_only(),
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "The user to ban"] user: Option<serenity::User>,
    #[description = "Reason for the ban"]
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

    if let Err(message) = check_target(TargetAction::Ban, ctx.author().id, user.id, user.bot) {
        ctx.say(message).await?;
        return Ok(());
    }

    let ban_result = guild_id
        .ban_with_reason(
            ctx.http(),
            user.id,
            0,
            reason.as_deref().unwrap_or("No reason provided"),
        )
        .await;

    if let Err(source) = ban_result {
        if !is_missing_permissions_error(&source) {
            error!(?source, "ban request failed");
        }
        ctx.say("I cannot ban this user. They may have higher permissions.")
            .await?;
        return Ok(());
    }

    info!(
        guild_id = %guild_id,
        user_id = %user.id,
        moderator_id = %ctx.author().id,
        "member banned"
    );

    let embed = moderation_action_embed(&user, "banned", reason.as_deref(), None);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    let log_entry =
        ModLogEntry::new(ModAction::Ban, ctx.author(), &user).reason(reason.as_deref());
    publish_mod_action(&ctx, guild_id, log_entry).await;

    Ok(())
}
