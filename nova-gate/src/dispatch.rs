use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::debug;

use crate::command::{CommandSpec, UserContext};
use crate::config_cache::ConfigCache;
use crate::cooldown::{CooldownTracker, resolve_cooldown};
use crate::decision::{Decision, DenyReason};
use crate::permissions;

/// Everything the gate needs to know about one invocation.
#[derive(Clone, Debug)]
pub struct InvocationContext {
    /// Discord interaction or message id. Re-evaluating an id that was
    /// already allowed does not charge its cooldown twice.
    pub invocation_id: Option<u64>,
    pub guild_id: u64,
    pub user: UserContext,
    pub command: CommandSpec,
}

/// Single entry point deciding whether an invocation may run.
#[derive(Debug)]
pub struct CommandDispatchGate {
    configs: Arc<ConfigCache>,
    cooldowns: Arc<CooldownTracker>,
    charged: DashMap<u64, Instant>,
}

impl CommandDispatchGate {
    pub fn new(configs: Arc<ConfigCache>, cooldowns: Arc<CooldownTracker>) -> Self {
        Self {
            configs,
            cooldowns,
            charged: DashMap::new(),
        }
    }

    pub fn configs(&self) -> &Arc<ConfigCache> {
        &self.configs
    }

    pub fn cooldowns(&self) -> &Arc<CooldownTracker> {
        &self.cooldowns
    }

    /// Enablement, permissions, then cooldown. An allowed invocation with a
    /// cooldown starts the user's window for that command.
    pub async fn evaluate(&self, invocation: &InvocationContext) -> Decision {
        let config = self.configs.get(invocation.guild_id).await;

        let checked = permissions::check(config.as_deref(), &invocation.command, &invocation.user);
        if let Err(reason) = checked {
            return self.deny(invocation, reason);
        }

        let cooldown_secs = resolve_cooldown(config.as_deref(), &invocation.command);
        if cooldown_secs == 0 {
            return Decision::Allowed;
        }

        let remaining = match invocation.invocation_id {
            Some(invocation_id) => self.acquire_once(invocation, invocation_id, cooldown_secs),
            None => self.cooldowns.try_acquire(
                invocation.command.name,
                invocation.user.user_id,
                cooldown_secs,
            ),
        };

        match remaining {
            Some(remaining_secs) => self.deny(invocation, DenyReason::OnCooldown { remaining_secs }),
            None => Decision::Allowed,
        }
    }

    fn acquire_once(
        &self,
        invocation: &InvocationContext,
        invocation_id: u64,
        cooldown_secs: u64,
    ) -> Option<f64> {
        let now = Instant::now();

        match self.charged.entry(invocation_id) {
            Entry::Occupied(charged) if now < *charged.get() => {
                debug!(invocation_id, "invocation already charged; not re-acquiring cooldown");
                None
            }
            entry => {
                let remaining = self.cooldowns.try_acquire(
                    invocation.command.name,
                    invocation.user.user_id,
                    cooldown_secs,
                );
                if remaining.is_none() {
                    entry.insert(now + Duration::from_secs(cooldown_secs));
                }
                remaining
            }
        }
    }

    fn deny(&self, invocation: &InvocationContext, reason: DenyReason) -> Decision {
        debug!(
            guild_id = invocation.guild_id,
            user_id = invocation.user.user_id,
            command = invocation.command.name,
            %reason,
            "command invocation denied"
        );
        Decision::Denied(reason)
    }

    /// Drop elapsed cooldown slots and charged invocation ids.
    pub fn prune_expired(&self) -> usize {
        let now = Instant::now();
        self.charged.retain(|_, expires_at| now < *expires_at);
        self.cooldowns.prune_expired()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{CommandDispatchGate, InvocationContext};
    use crate::command::{CommandSpec, UserContext};
    use crate::config_cache::ConfigCache;
    use crate::config_cache::tests::StaticConfigService;
    use crate::cooldown::CooldownTracker;
    use crate::decision::{Decision, DenyReason, Requirement};
    use crate::model::{CommandCategory, GuildConfig};

    const WARN: CommandSpec = CommandSpec::new("warn", CommandCategory::Mod).mod_only();
    const PING: CommandSpec = CommandSpec::new("ping", CommandCategory::Utility).cooldown(10);

    fn gate_for(config: Option<GuildConfig>) -> CommandDispatchGate {
        let service = match config {
            Some(config) => StaticConfigService::serving(config),
            None => StaticConfigService::failing(),
        };
        CommandDispatchGate::new(
            Arc::new(ConfigCache::new(service)),
            Arc::new(CooldownTracker::new()),
        )
    }

    fn invocation(command: CommandSpec, roles: &[&str]) -> InvocationContext {
        InvocationContext {
            invocation_id: None,
            guild_id: 1,
            user: UserContext::new(42, roles.iter().map(|r| (*r).to_owned()).collect()),
            command,
        }
    }

    fn scenario_config() -> GuildConfig {
        let mut config = GuildConfig::new(1);
        config.moderation.mod_roles = vec!["R1".to_owned()];
        config
    }

    fn remaining(decision: Decision) -> f64 {
        match decision {
            Decision::Denied(DenyReason::OnCooldown { remaining_secs }) => remaining_secs,
            other => panic!("expected cooldown denial, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn moderator_may_warn() {
        let gate = gate_for(Some(scenario_config()));
        assert_eq!(
            gate.evaluate(&invocation(WARN, &["R1"])).await,
            Decision::Allowed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn non_moderator_may_not_warn() {
        let gate = gate_for(Some(scenario_config()));
        assert_eq!(
            gate.evaluate(&invocation(WARN, &["R2"])).await,
            Decision::Denied(DenyReason::InsufficientPermission(Requirement::Moderator))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_category_denies_before_cooldown() {
        let mut config = scenario_config();
        config.commands.category_toggles.utility = false;
        let gate = gate_for(Some(config));

        assert_eq!(
            gate.evaluate(&invocation(PING, &[])).await,
            Decision::Denied(DenyReason::FeatureDisabled)
        );
        assert_eq!(gate.cooldowns().active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_scenario() {
        let gate = gate_for(Some(scenario_config()));
        let ping = invocation(PING, &[]);

        assert_eq!(gate.evaluate(&ping).await, Decision::Allowed);

        tokio::time::advance(Duration::from_secs(5)).await;
        let left = remaining(gate.evaluate(&ping).await);
        assert!((left - 5.0).abs() < 0.01);

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(gate.evaluate(&ping).await, Decision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn guild_override_replaces_default_cooldown() {
        let mut config = scenario_config();
        config.commands.cooldowns.insert("ping".to_owned(), 30);
        let gate = gate_for(Some(config));
        let ping = invocation(PING, &[]);

        gate.evaluate(&ping).await;
        tokio::time::advance(Duration::from_secs(15)).await;

        assert!(remaining(gate.evaluate(&ping).await) > 14.9);
    }

    #[tokio::test(start_paused = true)]
    async fn owners_are_not_exempt_from_cooldowns() {
        let gate = gate_for(Some(scenario_config()));
        let mut ping = invocation(PING, &[]);
        ping.user.is_owner = true;

        assert_eq!(gate.evaluate(&ping).await, Decision::Allowed);
        assert!(!gate.evaluate(&ping).await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn retried_invocation_is_charged_once() {
        let gate = gate_for(Some(scenario_config()));
        let mut ping = invocation(PING, &[]);
        ping.invocation_id = Some(1001);

        assert_eq!(gate.evaluate(&ping).await, Decision::Allowed);
        assert_eq!(gate.evaluate(&ping).await, Decision::Allowed);

        ping.invocation_id = Some(1002);
        assert!(!gate.evaluate(&ping).await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_config_falls_back_per_check() {
        let gate = gate_for(None);

        assert_eq!(
            gate.evaluate(&invocation(WARN, &["R1"])).await,
            Decision::Denied(DenyReason::InsufficientPermission(Requirement::Moderator))
        );

        let uncooled = CommandSpec::new("help", CommandCategory::Utility);
        let help = invocation(uncooled, &[]);
        assert_eq!(gate.evaluate(&help).await, Decision::Allowed);
        assert_eq!(gate.evaluate(&help).await, Decision::Allowed);
        assert_eq!(gate.cooldowns().active(), 0);

        let ping = invocation(PING, &[]);
        assert_eq!(gate.evaluate(&ping).await, Decision::Allowed);
        assert!(!gate.evaluate(&ping).await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn prune_clears_charged_invocations() {
        let gate = gate_for(Some(scenario_config()));
        let mut ping = invocation(PING, &[]);
        ping.invocation_id = Some(7);
        gate.evaluate(&ping).await;

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(gate.prune_expired(), 1);
        assert_eq!(gate.cooldowns().active(), 0);
    }
}
