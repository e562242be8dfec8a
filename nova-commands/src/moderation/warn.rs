use poise::serenity_prelude as serenity;
use tracing::info;

use crate::CommandMeta;
use crate::moderation::embeds::{guild_only_message, moderation_action_embed, usage_message};
use crate::moderation::escalation::escalate_after_warning;
use crate::moderation::logging::{ModAction, ModLogEntry, publish_mod_action};
use crate::moderation::target::{TargetAction, check_target};
use nova_core::{Context, Error};
use nova_database::impls::warnings::record_warning;
use nova_database::model::warnings::NewWarning;
use nova_gate::{CommandCategory, CommandSpec};

pub const META: CommandMeta = CommandMeta {
    name: "warn",
    desc: "Issue a warning to a user.",
    usage: "!warn <user> [reason]",
    spec: CommandSpec::new("warn", CommandCategory::Mod).mod_only(),
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "The user to warn"] user: Option<serenity::User>,
    #[description = "Reason for warning"]
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

    if let Err(message) = check_target(TargetAction::Warn, ctx.author().id, user.id, user.bot) {
        ctx.say(message).await?;
        return Ok(());
    }

    let reason = reason.unwrap_or_else(|| "No reason provided".to_owned());
    let user_tag = user.tag();
    let moderator_tag = ctx.author().tag();

    let record = record_warning(
        &ctx.data().db,
        NewWarning {
            guild_id: guild_id.get(),
            user_id: user.id.get(),
            user_tag: &user_tag,
            moderator_id: ctx.author().id.get(),
            moderator_tag: &moderator_tag,
            reason: &reason,
        },
    )
    .await?;

    info!(
        guild_id = %guild_id,
        user_id = %user.id,
        moderator_id = %ctx.author().id,
        warning_id = record.id,
        warning_count = record.warning_count,
        "warning recorded"
    );

    let escalation = escalate_after_warning(ctx.http(), ctx.data(), guild_id, user.id).await;

    let mut embed = moderation_action_embed(&user, "warned", Some(&reason), None)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Warning #{} · {} active",
            record.id, record.warning_count
        )));
    let mut log_entry =
        ModLogEntry::new(ModAction::Warn, ctx.author(), &user).reason(Some(reason.as_str()));
    if let Some(outcome) = &escalation {
        embed = embed.field("Auto-Timeout", outcome.summary(), false);
        log_entry = log_entry.field("Auto-Timeout", outcome.summary());
    }
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    publish_mod_action(&ctx, guild_id, log_entry).await;

    Ok(())
}
