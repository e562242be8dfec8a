pub mod admin;
pub mod gate;
pub mod moderation;
pub mod roles;
pub mod utility;

use nova_core::{Data, Error};
use nova_gate::{CommandCategory, CommandSpec};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub usage: &'static str,
    /// Category, tier flags and default cooldown checked before the command runs.
    pub spec: CommandSpec,
}

impl CommandMeta {
    pub fn category(&self) -> CommandCategory {
        self.spec.category
    }
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    moderation::warn::META,
    moderation::warnings::META,
    moderation::clear_warnings::META,
    moderation::timeout::META,
    moderation::kick::META,
    moderation::ban::META,
    roles::role::META,
    admin::config::META,
    admin::cooldown::META,
    admin::reload::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        moderation::warn::warn(),
        moderation::warnings::warnings(),
        moderation::clear_warnings::clear_warnings(),
        moderation::timeout::timeout(),
        moderation::kick::kick(),
        moderation::ban::ban(),
        roles::role::role(),
        admin::config::config(),
        admin::cooldown::cooldown(),
        admin::reload::reload(),
    ]
}

pub fn find_meta(name: &str) -> Option<&'static CommandMeta> {
    COMMANDS.iter().find(|meta| meta.name == name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use nova_gate::CommandCategory;

    use super::{COMMANDS, commands, find_meta};

    #[test]
    fn every_registered_command_has_metadata() {
        let registered = commands();
        assert_eq!(registered.len(), COMMANDS.len());

        for command in &registered {
            let meta = find_meta(&command.name)
                .unwrap_or_else(|| panic!("no metadata for `{}`", command.name));
            assert_eq!(meta.spec.name, meta.name);
        }
    }

    #[test]
    fn command_names_are_unique() {
        let names: HashSet<&str> = COMMANDS.iter().map(|meta| meta.name).collect();
        assert_eq!(names.len(), COMMANDS.len());
    }

    #[test]
    fn tiers_follow_categories() {
        for meta in COMMANDS {
            match meta.category() {
                CommandCategory::Mod | CommandCategory::Roles => {
                    assert!(meta.spec.mod_only, "{}", meta.name)
                }
                CommandCategory::Admin => assert!(meta.spec.admin_only, "{}", meta.name),
                CommandCategory::Utility => {
                    assert!(!meta.spec.mod_only && !meta.spec.admin_only, "{}", meta.name)
                }
            }
        }
    }

    #[test]
    fn every_category_has_a_command() {
        for category in CommandCategory::ALL {
            assert!(
                COMMANDS.iter().any(|meta| meta.category() == category),
                "{category}"
            );
        }
    }
}
