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
use nova_utils::formatting::format_compact_duration;
use nova_utils::parse::parse_duration_seconds;
use nova_utils::time::timeout_until;

pub const META: CommandMeta = CommandMeta {
    name: "timeout",
    desc: "Timeout a user for a duration (default: 10m, max: 28d).",
    usage: "!timeout <user> [duration] [reason]",
    spec: CommandSpec::new("timeout", CommandCategory::Mod).mod_only(),
};

const DEFAULT_TIMEOUT_SECS: u64 = 10 * 60;
/// Discord rejects communication timeouts longer than 28 days.
const MAX_TIMEOUT_SECS: u64 = 28 * 86_400;

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "The user to timeout"] user: Option<serenity::User>,
    #[description = "Duration (e.g. 10m, 2h)"] duration: Option<String>,
    #[description = "Reason for timeout"]
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

    if let Err(message) = check_target(TargetAction::Timeout, ctx.author().id, user.id, user.bot) {
        ctx.say(message).await?;
        return Ok(());
    }

    let duration_secs = match resolve_timeout_duration(duration.as_deref()) {
        Ok(seconds) => seconds,
        Err(message) => {
            ctx.say(message).await?;
            return Ok(());
        }
    };
    let duration_label = format_compact_duration(duration_secs);

    let until = timeout_until(duration_secs)?;
    let audit_reason = reason.as_deref().unwrap_or("No reason provided");
    let edit = serenity::EditMember::new()
        .disable_communication_until_datetime(until)
        .audit_log_reason(audit_reason);

    if let Err(source) = guild_id.edit_member(ctx.http(), user.id, edit).await {
        if !is_missing_permissions_error(&source) {
            error!(?source, "timeout request failed");
        }
        ctx.say("I cannot timeout this user. They may have higher permissions.")
            .await?;
        return Ok(());
    }

    info!(
        guild_id = %guild_id,
        user_id = %user.id,
        moderator_id = %ctx.author().id,
        duration_secs,
        "member timed out"
    );

    let embed = moderation_action_embed(&user, "timed out", reason.as_deref(), Some(&duration_label));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    let log_entry = ModLogEntry::new(ModAction::Timeout, ctx.author(), &user)
        .reason(reason.as_deref())
        .duration(duration_label);
    publish_mod_action(&ctx, guild_id, log_entry).await;

    Ok(())
}

fn resolve_timeout_duration(raw: Option<&str>) -> Result<u64, String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(DEFAULT_TIMEOUT_SECS);
    };

    match parse_duration_seconds(raw) {
        Some(seconds) if seconds <= MAX_TIMEOUT_SECS => Ok(seconds),
        _ => Err(
            "Invalid duration. Use a format like 10s, 10m, 1h, or 1d (max 28d).".to_owned(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS, resolve_timeout_duration};

    #[test]
    fn missing_duration_uses_default() {
        assert_eq!(resolve_timeout_duration(None), Ok(DEFAULT_TIMEOUT_SECS));
        assert_eq!(resolve_timeout_duration(Some("  ")), Ok(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn durations_are_capped_at_28_days() {
        assert_eq!(resolve_timeout_duration(Some("28d")), Ok(MAX_TIMEOUT_SECS));
        assert!(resolve_timeout_duration(Some("29d")).is_err());
        assert!(resolve_timeout_duration(Some("soon")).is_err());
        assert_eq!(resolve_timeout_duration(Some("2h")), Ok(7_200));
    }
}
