//! Warning-count triggered auto-timeouts.
//!
//! [`evaluate`] only decides. Applying the timeout is up to the caller and is
//! best-effort: a failed apply does not change the decision.

use serde::Serialize;
use tracing::{error, info};

use crate::config_cache::ConfigCache;
use crate::model::GuildConfig;
use crate::service::WarningStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationResult {
    pub trigger: bool,
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

impl EscalationResult {
    pub const NONE: EscalationResult = EscalationResult {
        trigger: false,
        duration_secs: None,
    };
}

/// Fires once the active warning count reaches the configured threshold,
/// including on the warning that reaches it.
pub fn evaluate(config: &GuildConfig, warning_count: u64) -> EscalationResult {
    let auto_timeout = &config.moderation.auto_timeout;
    if !auto_timeout.enabled || warning_count < auto_timeout.warn_threshold {
        return EscalationResult::NONE;
    }

    EscalationResult {
        trigger: true,
        duration_secs: Some(auto_timeout.duration),
    }
}

/// Decision for a user right after they received a warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarningEscalation {
    pub warning_count: u64,
    pub result: EscalationResult,
}

/// Load the guild config and the user's warning count, then evaluate.
///
/// Returns `None` when either input is unavailable; the failure is logged.
pub async fn evaluate_after_warning(
    configs: &ConfigCache,
    warnings: &dyn WarningStore,
    guild_id: u64,
    user_id: u64,
) -> Option<WarningEscalation> {
    let config = configs.get(guild_id).await?;
    if !config.moderation.auto_timeout.enabled {
        return Some(WarningEscalation {
            warning_count: 0,
            result: EscalationResult::NONE,
        });
    }

    let warning_count = match warnings.count(guild_id, user_id).await {
        Ok(count) => count,
        Err(source) => {
            error!(?source, guild_id, user_id, "failed to count warnings for escalation");
            return None;
        }
    };

    let result = evaluate(&config, warning_count);
    if result.trigger {
        info!(
            guild_id,
            user_id,
            warning_count,
            duration_secs = result.duration_secs,
            "escalation triggered: auto-timeout"
        );
    }

    Some(WarningEscalation {
        warning_count,
        result,
    })
}
