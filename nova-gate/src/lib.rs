//! Invocation-time gating for Nova commands.
//!
//! Every command invocation passes through [`CommandDispatchGate::evaluate`],
//! which combines the cached guild configuration, the permission rules and the
//! per-user cooldowns into a single [`Decision`].

pub mod command;
pub mod config_cache;
pub mod cooldown;
pub mod decision;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod escalation;
pub mod model;
pub mod permissions;
pub mod service;

pub use command::{CommandSpec, UserContext};
pub use config_cache::{CONFIG_TTL, ConfigCache};
pub use cooldown::CooldownTracker;
pub use decision::{Decision, DenyReason, Requirement};
pub use diff::{ConfigChange, diff_configs};
pub use dispatch::{CommandDispatchGate, InvocationContext};
pub use error::{ConfigError, FetchError};
pub use escalation::EscalationResult;
pub use model::{CommandCategory, GuildConfig};
pub use service::{ConfigService, WarningStore};
