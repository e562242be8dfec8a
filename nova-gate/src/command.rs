use crate::model::CommandCategory;

/// Static gating metadata attached to every command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub category: CommandCategory,
    pub mod_only: bool,
    pub admin_only: bool,
    /// Cooldown used when the guild has no override. Zero disables it.
    pub default_cooldown_secs: u64,
}

impl CommandSpec {
    pub const fn new(name: &'static str, category: CommandCategory) -> Self {
        Self {
            name,
            category,
            mod_only: false,
            admin_only: false,
            default_cooldown_secs: 0,
        }
    }

    pub const fn mod_only(mut self) -> Self {
        self.mod_only = true;
        self
    }

    pub const fn admin_only(mut self) -> Self {
        self.admin_only = true;
        self
    }

    pub const fn cooldown(mut self, seconds: u64) -> Self {
        self.default_cooldown_secs = seconds;
        self
    }
}

/// Who is invoking a command, as resolved from the guild member.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: u64,
    /// Role ids held by the member, as decimal snowflake strings.
    pub roles: Vec<String>,
    pub is_owner: bool,
    pub has_administrator: bool,
}

impl UserContext {
    pub fn new(user_id: u64, roles: Vec<String>) -> Self {
        Self {
            user_id,
            roles,
            is_owner: false,
            has_administrator: false,
        }
    }

    /// Guild owners and members with the Administrator permission skip tier
    /// and allowlist checks. They are still subject to enablement and cooldowns.
    pub fn bypasses_role_checks(&self) -> bool {
        self.is_owner || self.has_administrator
    }
}
