//! Layered permission rules for command invocations.
//!
//! Checks run in a fixed order and stop at the first failure:
//! enablement, owner/administrator bypass, mod/admin tier, per-command role
//! allowlist. Every rule takes `Option<&GuildConfig>`; `None` means the config
//! could not be loaded and each rule applies its own fallback. Enablement and
//! allowlists fall back to permitting the invocation, tier checks fall back to
//! denying it.

use tracing::debug;

use crate::command::{CommandSpec, UserContext};
use crate::decision::{DenyReason, Requirement};
use crate::model::GuildConfig;

/// Category toggle on and command not explicitly disabled.
pub fn is_command_enabled(config: Option<&GuildConfig>, command: &CommandSpec) -> bool {
    let Some(config) = config else {
        return true;
    };

    config
        .commands
        .category_toggles
        .is_enabled(command.category)
        && !config
            .commands
            .disabled
            .iter()
            .any(|name| name == command.name)
}

/// Holds a moderator or administrator role.
pub fn is_moderator(config: Option<&GuildConfig>, user_roles: &[String]) -> bool {
    let Some(config) = config else {
        return false;
    };

    roles_intersect(user_roles, &config.moderation.mod_roles)
        || roles_intersect(user_roles, &config.moderation.admin_roles)
}

/// Holds an administrator role.
pub fn is_admin(config: Option<&GuildConfig>, user_roles: &[String]) -> bool {
    let Some(config) = config else {
        return false;
    };

    roles_intersect(user_roles, &config.moderation.admin_roles)
}

/// Passes the guild's custom role allowlist for `command_name`, if any.
pub fn has_command_permission(
    config: Option<&GuildConfig>,
    command_name: &str,
    user_roles: &[String],
) -> bool {
    let Some(config) = config else {
        return true;
    };

    match config.commands.permissions.get(command_name) {
        Some(allowed) if !allowed.is_empty() => roles_intersect(user_roles, allowed),
        _ => true,
    }
}

/// Run every permission rule for an invocation, in order.
pub fn check(
    config: Option<&GuildConfig>,
    command: &CommandSpec,
    user: &UserContext,
) -> Result<(), DenyReason> {
    if !is_command_enabled(config, command) {
        return Err(DenyReason::FeatureDisabled);
    }

    if user.bypasses_role_checks() {
        return Ok(());
    }

    if command.mod_only && !is_moderator(config, &user.roles) {
        return Err(DenyReason::InsufficientPermission(Requirement::Moderator));
    }

    if command.admin_only && !is_admin(config, &user.roles) {
        return Err(DenyReason::InsufficientPermission(
            Requirement::Administrator,
        ));
    }

    if !has_command_permission(config, command.name, &user.roles) {
        return Err(DenyReason::InsufficientPermission(
            Requirement::CommandRoles,
        ));
    }

    Ok(())
}

pub fn can_use(config: Option<&GuildConfig>, command: &CommandSpec, user: &UserContext) -> bool {
    check(config, command, user).is_ok()
}

/// Whether any of the member's roles appears in `allowed`.
///
/// Role ids are opaque strings and must match exactly. Blank entries in the
/// guild config never match anything.
pub fn roles_intersect(user_roles: &[String], allowed: &[String]) -> bool {
    allowed.iter().any(|candidate| {
        if candidate.trim().is_empty() {
            debug!("ignoring blank role id in guild config");
            return false;
        }

        user_roles.iter().any(|role| role == candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::{can_use, check, has_command_permission, is_admin, is_moderator, roles_intersect};
    use crate::command::{CommandSpec, UserContext};
    use crate::decision::{DenyReason, Requirement};
    use crate::model::{CommandCategory, GuildConfig};

    const WARN: CommandSpec = CommandSpec::new("warn", CommandCategory::Mod).mod_only();
    const CONFIG: CommandSpec = CommandSpec::new("config", CommandCategory::Admin).admin_only();
    const PING: CommandSpec = CommandSpec::new("ping", CommandCategory::Utility);

    fn roles(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    fn mod_config() -> GuildConfig {
        let mut config = GuildConfig::new(1);
        config.moderation.mod_roles = roles(&["R1"]);
        config
    }

    #[test]
    fn moderator_role_may_warn() {
        let user = UserContext::new(7, roles(&["R1"]));
        assert_eq!(check(Some(&mod_config()), &WARN, &user), Ok(()));
    }

    #[test]
    fn other_role_may_not_warn() {
        let user = UserContext::new(7, roles(&["R2"]));
        assert_eq!(
            check(Some(&mod_config()), &WARN, &user),
            Err(DenyReason::InsufficientPermission(Requirement::Moderator))
        );
    }

    #[test]
    fn admin_roles_count_as_moderators() {
        let mut config = GuildConfig::new(1);
        config.moderation.admin_roles = roles(&["A"]);

        assert!(is_moderator(Some(&config), &roles(&["A"])));
        assert!(is_admin(Some(&config), &roles(&["A"])));
        assert!(!is_admin(Some(&mod_config()), &roles(&["R1"])));
    }

    #[test]
    fn disabled_category_wins_over_everything() {
        let mut config = mod_config();
        config.commands.category_toggles.moderation = false;

        let mut owner = UserContext::new(7, roles(&["R1"]));
        owner.is_owner = true;

        assert_eq!(
            check(Some(&config), &WARN, &owner),
            Err(DenyReason::FeatureDisabled)
        );
    }

    #[test]
    fn disabled_command_is_rejected_even_with_category_on() {
        let mut config = GuildConfig::new(1);
        config.commands.disabled = roles(&["ping"]);

        let mut admin = UserContext::new(7, Vec::new());
        admin.has_administrator = true;

        assert_eq!(
            check(Some(&config), &PING, &admin),
            Err(DenyReason::FeatureDisabled)
        );
    }

    #[test]
    fn owner_and_administrator_skip_tiers_and_allowlists() {
        let mut config = GuildConfig::new(1);
        config
            .commands
            .permissions
            .insert("config".to_owned(), roles(&["R9"]));

        let mut owner = UserContext::new(1, Vec::new());
        owner.is_owner = true;
        let mut admin = UserContext::new(2, Vec::new());
        admin.has_administrator = true;

        for user in [&owner, &admin] {
            assert!(can_use(Some(&config), &WARN, user));
            assert!(can_use(Some(&config), &CONFIG, user));
        }
    }

    #[test]
    fn admin_only_requires_admin_role() {
        let mut config = mod_config();
        config.moderation.admin_roles = roles(&["A"]);

        let moderator = UserContext::new(7, roles(&["R1"]));
        assert_eq!(
            check(Some(&config), &CONFIG, &moderator),
            Err(DenyReason::InsufficientPermission(
                Requirement::Administrator
            ))
        );

        let admin = UserContext::new(8, roles(&["A"]));
        assert!(can_use(Some(&config), &CONFIG, &admin));
    }

    #[test]
    fn custom_allowlist_restricts_unprivileged_commands() {
        let mut config = GuildConfig::new(1);
        config
            .commands
            .permissions
            .insert("ping".to_owned(), roles(&["R5"]));

        assert_eq!(
            check(Some(&config), &PING, &UserContext::new(1, roles(&["R1"]))),
            Err(DenyReason::InsufficientPermission(
                Requirement::CommandRoles
            ))
        );
        assert!(can_use(
            Some(&config),
            &PING,
            &UserContext::new(1, roles(&["R1", "R5"]))
        ));
    }

    #[test]
    fn empty_allowlist_is_unrestricted() {
        let mut config = GuildConfig::new(1);
        config.commands.permissions.insert("ping".to_owned(), Vec::new());

        assert!(has_command_permission(Some(&config), "ping", &[]));
    }

    #[test]
    fn tier_check_runs_before_allowlist() {
        let mut config = mod_config();
        config
            .commands
            .permissions
            .insert("warn".to_owned(), roles(&["R2"]));

        let allowlisted = UserContext::new(1, roles(&["R2"]));
        assert_eq!(
            check(Some(&config), &WARN, &allowlisted),
            Err(DenyReason::InsufficientPermission(Requirement::Moderator))
        );

        let both = UserContext::new(1, roles(&["R1", "R2"]));
        assert!(can_use(Some(&config), &WARN, &both));
    }

    #[test]
    fn missing_config_is_open_for_features_and_closed_for_tiers() {
        let user = UserContext::new(1, roles(&["R1"]));

        assert!(can_use(None, &PING, &user));
        assert_eq!(
            check(None, &WARN, &user),
            Err(DenyReason::InsufficientPermission(Requirement::Moderator))
        );
        assert!(!is_admin(None, &user.roles));

        let mut owner = user.clone();
        owner.is_owner = true;
        assert!(can_use(None, &WARN, &owner));
    }

    #[test]
    fn role_ids_match_exactly() {
        assert!(roles_intersect(&roles(&["R1"]), &roles(&["", "R1"])));
        assert!(roles_intersect(
            &roles(&["123456789012345678"]),
            &roles(&["123456789012345678"])
        ));
        assert!(!roles_intersect(&roles(&["123"]), &roles(&[" 123 "])));
        assert!(!roles_intersect(&roles(&["r1"]), &roles(&["R1"])));
    }

    #[test]
    fn blank_role_entries_never_match() {
        assert!(!roles_intersect(&roles(&[""]), &roles(&["", "  "])));
        assert!(!roles_intersect(&roles(&["  "]), &roles(&["  "])));
    }

    #[test]
    fn blank_mod_role_grants_nothing() {
        let mut config = GuildConfig::new(1);
        config.moderation.mod_roles = roles(&[""]);

        let user = UserContext::new(7, roles(&[""]));
        assert_eq!(
            check(Some(&config), &WARN, &user),
            Err(DenyReason::InsufficientPermission(Requirement::Moderator))
        );
    }
}
