use poise::serenity_prelude as serenity;
use tracing::info;

use crate::CommandMeta;
use crate::moderation::embeds::{guild_only_message, moderation_action_embed, usage_message};
use crate::moderation::logging::{ModAction, ModLogEntry, publish_mod_action};
use crate::moderation::target::{TargetAction, check_target};
use nova_core::{Context, Error};
use nova_database::impls::warnings::clear_warnings as clear_user_warnings;
use nova_gate::{CommandCategory, CommandSpec};

pub const META: CommandMeta = CommandMeta {
    name: "clear-warnings",
    desc: "Clear all warnings for a user.",
    usage: "!clear-warnings <user> [reason]",
    spec: CommandSpec::new("clear-warnings", CommandCategory::Mod).mod_only(),
};

#[poise::command(
    prefix_command,
    slash_command,
    rename = "clear-warnings",
    category = "Moderation"
)]
pub async fn clear_warnings(
    ctx: Context<'_>,
    #[description = "The user to clear warnings for"] user: Option<serenity::User>,
    #[description = "Reason for clearing warnings"]
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

    if let Err(message) =
        check_target(TargetAction::ClearWarnings, ctx.author().id, user.id, user.bot)
    {
        ctx.say(message).await?;
        return Ok(());
    }

    let cleared = clear_user_warnings(&ctx.data().db, guild_id.get(), user.id.get()).await?;
    if cleared == 0 {
        ctx.say("This user has no warnings to clear.").await?;
        return Ok(());
    }

    info!(
        guild_id = %guild_id,
        user_id = %user.id,
        moderator_id = %ctx.author().id,
        cleared,
        "warnings cleared"
    );

    let action = format!("cleared of {cleared} warning(s)");
    let embed = moderation_action_embed(&user, &action, reason.as_deref(), None);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    let log_entry = ModLogEntry::new(ModAction::ClearWarnings, ctx.author(), &user)
        .reason(reason.as_deref())
        .field("Cleared", cleared.to_string());
    publish_mod_action(&ctx, guild_id, log_entry).await;

    Ok(())
}
