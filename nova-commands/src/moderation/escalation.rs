//! Applying auto-timeouts after a warning.
//!
//! The trigger decision comes from [`nova_gate::escalation`]. Applying the
//! timeout on Discord is best-effort and reported separately, so a failed
//! apply never hides that the threshold was reached.

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use nova_core::Data;
use nova_gate::EscalationResult;
use nova_gate::escalation::evaluate_after_warning;
use nova_utils::formatting::format_compact_duration;
use nova_utils::time::timeout_until;

use crate::moderation::embeds::is_missing_permissions_error;

const AUTO_TIMEOUT_REASON: &str = "Auto-timeout: warning threshold reached";

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("missing permissions to time out this member")]
    MissingPermissions,
    #[error("invalid timeout duration: {0}")]
    InvalidDuration(String),
    #[error("discord request failed: {0}")]
    Discord(String),
}

#[derive(Debug)]
pub struct EscalationOutcome {
    pub warning_count: u64,
    pub result: EscalationResult,
    pub applied: Result<(), ApplyError>,
}

impl EscalationOutcome {
    /// Line added to the warn reply.
    pub fn summary(&self) -> String {
        let duration = format_compact_duration(self.result.duration_secs.unwrap_or_default());
        match &self.applied {
            Ok(()) => format!(
                "User has been timed out for {duration} after reaching {} warning(s).",
                self.warning_count
            ),
            Err(source) => format!(
                "Warning threshold reached ({} warning(s)), but the {duration} timeout could not be applied: {source}.",
                self.warning_count
            ),
        }
    }
}

/// Evaluate the target's warnings and time them out when the guild's
/// threshold is reached.
///
/// Returns `None` when nothing triggered or the inputs were unavailable.
pub async fn escalate_after_warning(
    http: &serenity::Http,
    data: &Data,
    guild_id: serenity::GuildId,
    target: serenity::UserId,
) -> Option<EscalationOutcome> {
    let escalation =
        evaluate_after_warning(data.configs(), &data.db, guild_id.get(), target.get()).await?;
    if !escalation.result.trigger {
        return None;
    }

    let duration_secs = escalation.result.duration_secs?;
    let applied = apply_timeout(http, guild_id, target, duration_secs).await;

    match &applied {
        Ok(()) => info!(
            guild_id = %guild_id,
            user_id = %target,
            duration_secs,
            "auto-timeout applied"
        ),
        Err(ApplyError::MissingPermissions) => warn!(
            guild_id = %guild_id,
            user_id = %target,
            "missing permissions to auto-timeout user (check role hierarchy)"
        ),
        Err(source) => error!(?source, guild_id = %guild_id, user_id = %target, "failed to auto-timeout user"),
    }

    Some(EscalationOutcome {
        warning_count: escalation.warning_count,
        result: escalation.result,
        applied,
    })
}

async fn apply_timeout(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    target: serenity::UserId,
    duration_secs: u64,
) -> Result<(), ApplyError> {
    let until =
        timeout_until(duration_secs).map_err(|e| ApplyError::InvalidDuration(e.to_string()))?;
    let edit = serenity::EditMember::new()
        .disable_communication_until_datetime(until)
        .audit_log_reason(AUTO_TIMEOUT_REASON);

    guild_id
        .edit_member(http, target, edit)
        .await
        .map(|_| ())
        .map_err(|source| {
            if is_missing_permissions_error(&source) {
                ApplyError::MissingPermissions
            } else {
                ApplyError::Discord(source.to_string())
            }
        })
}
