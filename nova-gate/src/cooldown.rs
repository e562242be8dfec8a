//! Per-command, per-user cooldowns.

use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::debug;

use crate::command::CommandSpec;
use crate::model::GuildConfig;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CooldownKey {
    command: String,
    user_id: u64,
}

impl CooldownKey {
    fn new(command: &str, user_id: u64) -> Self {
        Self {
            command: command.to_owned(),
            user_id,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CooldownSlot {
    last_used: Instant,
    window: Duration,
}

/// Tracks when each user last ran each command.
///
/// The check-and-set in [`CooldownTracker::try_acquire`] runs under the
/// entry's shard lock, so two concurrent invocations for the same
/// (command, user) pair cannot both acquire the slot.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    slots: DashMap<CooldownKey, CooldownSlot>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a cooldown window for `(command, user_id)` if none is running.
    ///
    /// Returns `None` when the slot was acquired, or the fractional seconds
    /// left in the running window. A blocked attempt leaves the window as is.
    pub fn try_acquire(&self, command: &str, user_id: u64, cooldown_secs: u64) -> Option<f64> {
        let window = Duration::from_secs(cooldown_secs);
        let now = Instant::now();

        match self.slots.entry(CooldownKey::new(command, user_id)) {
            Entry::Occupied(mut occupied) => {
                let expires_at = occupied.get().last_used + window;
                if now < expires_at {
                    return Some((expires_at - now).as_secs_f64());
                }
                occupied.insert(CooldownSlot {
                    last_used: now,
                    window,
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CooldownSlot {
                    last_used: now,
                    window,
                });
            }
        }

        None
    }

    /// Drop every slot whose window has elapsed.
    pub fn prune_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| now < slot.last_used + slot.window);
        let removed = before.saturating_sub(self.slots.len());

        if removed > 0 {
            debug!(removed, "pruned expired cooldowns");
        }
        removed
    }

    /// Forget every cooldown a user has running.
    pub fn clear_user(&self, user_id: u64) {
        self.slots.retain(|key, _| key.user_id != user_id);
        debug!(user_id, "cleared user cooldowns");
    }

    /// Number of tracked slots, including ones not yet pruned.
    pub fn active(&self) -> usize {
        self.slots.len()
    }
}

/// Cooldown for a command in a guild: a positive guild override wins over the
/// command's static default.
pub fn resolve_cooldown(config: Option<&GuildConfig>, command: &CommandSpec) -> u64 {
    config
        .and_then(|config| config.commands.cooldowns.get(command.name).copied())
        .filter(|seconds| *seconds > 0)
        .unwrap_or(command.default_cooldown_secs)
}
