use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const WARN_THRESHOLD_RANGE: (u64, u64) = (1, 10);
pub const AUTO_TIMEOUT_DURATION_RANGE: (u64, u64) = (60, 604_800);
pub const COOLDOWN_OVERRIDE_RANGE: (u64, u64) = (0, 3_600);
pub const WELCOME_MESSAGE_MAX_LEN: usize = 2_000;

/// Coarse command grouping with a single per-guild on/off toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandCategory {
    Mod,
    Admin,
    Utility,
    Roles,
}

impl CommandCategory {
    pub const ALL: [CommandCategory; 4] = [
        CommandCategory::Mod,
        CommandCategory::Admin,
        CommandCategory::Utility,
        CommandCategory::Roles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandCategory::Mod => "mod",
            CommandCategory::Admin => "admin",
            CommandCategory::Utility => "utility",
            CommandCategory::Roles => "roles",
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-guild configuration as served by the backend and stored in Postgres.
///
/// Every section falls back to the same defaults a freshly created guild
/// receives, so partial JSON documents deserialize cleanly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildConfig {
    pub guild_id: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub moderation: ModerationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub welcome: WelcomeConfig,
    #[serde(default)]
    pub auto_roles: AutoRolesConfig,
}

impl GuildConfig {
    /// Defaults for a guild that has never been configured.
    pub fn new(guild_id: u64) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            settings: Settings::default(),
            features: Features::default(),
            moderation: ModerationConfig::default(),
            logging: LoggingConfig::default(),
            commands: CommandsConfig::default(),
            welcome: WelcomeConfig::default(),
            auto_roles: AutoRolesConfig::default(),
        }
    }

    /// Check the ranges the dashboard enforces before a config is persisted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let auto_timeout = &self.moderation.auto_timeout;
        check_range(
            "moderation.autoTimeout.warnThreshold",
            auto_timeout.warn_threshold,
            WARN_THRESHOLD_RANGE,
        )?;
        check_range(
            "moderation.autoTimeout.duration",
            auto_timeout.duration,
            AUTO_TIMEOUT_DURATION_RANGE,
        )?;

        let mut cooldowns: Vec<_> = self.commands.cooldowns.iter().collect();
        cooldowns.sort_unstable_by_key(|(name, _)| name.as_str());
        for (name, seconds) in cooldowns {
            check_range(
                &format!("commands.cooldowns.{name}"),
                *seconds,
                COOLDOWN_OVERRIDE_RANGE,
            )?;
        }

        check_len("welcome.message", self.welcome.message.as_deref())?;
        check_len("welcome.dmMessage", self.welcome.dm_message.as_deref())?;

        Ok(())
    }
}

fn check_range(field: &str, value: u64, (min, max): (u64, u64)) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field: field.to_owned(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn check_len(field: &str, value: Option<&str>) -> Result<(), ConfigError> {
    let len = value.map_or(0, |text| text.chars().count());
    if len > WELCOME_MESSAGE_MAX_LEN {
        return Err(ConfigError::TooLong {
            field: field.to_owned(),
            len,
            max: WELCOME_MESSAGE_MAX_LEN,
        });
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub locale: String,
    pub timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: "en-US".to_owned(),
            timezone: "UTC".to_owned(),
        }
    }
}

/// Master feature switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
    pub moderation: bool,
    pub logging: bool,
    pub welcome_messages: bool,
    pub auto_roles: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            moderation: true,
            logging: false,
            welcome_messages: false,
            auto_roles: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModerationConfig {
    pub mod_roles: Vec<String>,
    pub admin_roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute_role: Option<String>,
    pub auto_timeout: AutoTimeoutConfig,
}

/// Warning-count triggered timeout. `duration` is in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoTimeoutConfig {
    pub enabled: bool,
    pub warn_threshold: u64,
    pub duration: u64,
}

impl Default for AutoTimeoutConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            warn_threshold: 3,
            duration: 3_600,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub channels: LogChannels,
    pub events: LogEvents,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogChannels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogEvents {
    pub message_delete: bool,
    pub message_edit: bool,
    pub member_join: bool,
    pub member_leave: bool,
    pub mod_actions: bool,
}

impl Default for LogEvents {
    fn default() -> Self {
        Self {
            message_delete: true,
            message_edit: true,
            member_join: true,
            member_leave: true,
            mod_actions: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandsConfig {
    pub disabled: Vec<String>,
    pub category_toggles: CategoryToggles,
    /// Command name -> role ids allowed to use it. Empty means unrestricted.
    pub permissions: HashMap<String, Vec<String>>,
    /// Command name -> cooldown override in seconds. Zero means no override.
    pub cooldowns: HashMap<String, u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryToggles {
    #[serde(rename = "mod")]
    pub moderation: bool,
    pub admin: bool,
    pub utility: bool,
    pub roles: bool,
}

impl CategoryToggles {
    pub fn is_enabled(&self, category: CommandCategory) -> bool {
        match category {
            CommandCategory::Mod => self.moderation,
            CommandCategory::Admin => self.admin,
            CommandCategory::Utility => self.utility,
            CommandCategory::Roles => self.roles,
        }
    }
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            moderation: true,
            admin: true,
            utility: true,
            roles: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WelcomeConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub dm_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dm_message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoRolesConfig {
    pub enabled: bool,
    pub roles: Vec<String>,
}
