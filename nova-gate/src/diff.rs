//! Field-by-field comparison of two guild configs, for audit logging.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::model::GuildConfig;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConfigChange {
    pub path: String,
    pub old: Value,
    pub new: Value,
}

struct Changes(Vec<ConfigChange>);

impl Changes {
    fn track<T: PartialEq + Serialize>(&mut self, path: &str, old: &T, new: &T) {
        if old != new {
            self.0.push(ConfigChange {
                path: path.to_owned(),
                old: to_value(old),
                new: to_value(new),
            });
        }
    }

    fn track_map<T: PartialEq + Serialize>(
        &mut self,
        prefix: &str,
        old: &HashMap<String, T>,
        new: &HashMap<String, T>,
    ) {
        let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
        for key in keys {
            let before = old.get(key);
            let after = new.get(key);
            if before != after {
                self.0.push(ConfigChange {
                    path: format!("{prefix}.{key}"),
                    old: before.map_or(Value::Null, to_value),
                    new: after.map_or(Value::Null, to_value),
                });
            }
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Every leaf that differs between `old` and `new`, using dashboard paths
/// (`moderation.autoTimeout.enabled`, `commands.cooldowns.ping`, ...).
pub fn diff_configs(old: &GuildConfig, new: &GuildConfig) -> Vec<ConfigChange> {
    let mut changes = Changes(Vec::new());
    let c = &mut changes;

    c.track("settings.locale", &old.settings.locale, &new.settings.locale);
    c.track("settings.timezone", &old.settings.timezone, &new.settings.timezone);

    let (of, nf) = (&old.features, &new.features);
    c.track("features.moderation", &of.moderation, &nf.moderation);
    c.track("features.logging", &of.logging, &nf.logging);
    c.track("features.welcomeMessages", &of.welcome_messages, &nf.welcome_messages);
    c.track("features.autoRoles", &of.auto_roles, &nf.auto_roles);

    let (om, nm) = (&old.moderation, &new.moderation);
    c.track("moderation.modRoles", &om.mod_roles, &nm.mod_roles);
    c.track("moderation.adminRoles", &om.admin_roles, &nm.admin_roles);
    c.track("moderation.logChannel", &om.log_channel, &nm.log_channel);
    c.track("moderation.muteRole", &om.mute_role, &nm.mute_role);
    let (ot, nt) = (&om.auto_timeout, &nm.auto_timeout);
    c.track("moderation.autoTimeout.enabled", &ot.enabled, &nt.enabled);
    c.track("moderation.autoTimeout.warnThreshold", &ot.warn_threshold, &nt.warn_threshold);
    c.track("moderation.autoTimeout.duration", &ot.duration, &nt.duration);

    let (ol, nl) = (&old.logging, &new.logging);
    c.track("logging.enabled", &ol.enabled, &nl.enabled);
    c.track("logging.channels.moderation", &ol.channels.moderation, &nl.channels.moderation);
    c.track("logging.channels.messages", &ol.channels.messages, &nl.channels.messages);
    c.track("logging.channels.members", &ol.channels.members, &nl.channels.members);
    let (oe, ne) = (&ol.events, &nl.events);
    c.track("logging.events.messageDelete", &oe.message_delete, &ne.message_delete);
    c.track("logging.events.messageEdit", &oe.message_edit, &ne.message_edit);
    c.track("logging.events.memberJoin", &oe.member_join, &ne.member_join);
    c.track("logging.events.memberLeave", &oe.member_leave, &ne.member_leave);
    c.track("logging.events.modActions", &oe.mod_actions, &ne.mod_actions);

    let (oc, nc) = (&old.commands, &new.commands);
    c.track("commands.disabled", &oc.disabled, &nc.disabled);
    let (og, ng) = (&oc.category_toggles, &nc.category_toggles);
    c.track("commands.categoryToggles.mod", &og.moderation, &ng.moderation);
    c.track("commands.categoryToggles.admin", &og.admin, &ng.admin);
    c.track("commands.categoryToggles.utility", &og.utility, &ng.utility);
    c.track("commands.categoryToggles.roles", &og.roles, &ng.roles);
    c.track_map("commands.permissions", &oc.permissions, &nc.permissions);
    c.track_map("commands.cooldowns", &oc.cooldowns, &nc.cooldowns);

    let (ow, nw) = (&old.welcome, &new.welcome);
    c.track("welcome.enabled", &ow.enabled, &nw.enabled);
    c.track("welcome.channelId", &ow.channel_id, &nw.channel_id);
    c.track("welcome.message", &ow.message, &nw.message);
    c.track("welcome.dmEnabled", &ow.dm_enabled, &nw.dm_enabled);
    c.track("welcome.dmMessage", &ow.dm_message, &nw.dm_message);

    c.track("autoRoles.enabled", &old.auto_roles.enabled, &new.auto_roles.enabled);
    c.track("autoRoles.roles", &old.auto_roles.roles, &new.auto_roles.roles);

    changes.0
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{ConfigChange, diff_configs};
    use crate::model::GuildConfig;

    #[test]
    fn identical_configs_have_no_changes() {
        let config = GuildConfig::new(1);
        assert!(diff_configs(&config, &config.clone()).is_empty());
    }

    #[test]
    fn reports_leaf_paths_with_old_and_new_values() {
        let old = GuildConfig::new(1);
        let mut new = old.clone();
        new.moderation.auto_timeout.enabled = true;
        new.commands.category_toggles.admin = false;
        new.moderation.log_channel = Some("555".to_owned());

        assert_eq!(
            diff_configs(&old, &new),
            vec![
                ConfigChange {
                    path: "moderation.logChannel".to_owned(),
                    old: Value::Null,
                    new: json!("555"),
                },
                ConfigChange {
                    path: "moderation.autoTimeout.enabled".to_owned(),
                    old: json!(false),
                    new: json!(true),
                },
                ConfigChange {
                    path: "commands.categoryToggles.admin".to_owned(),
                    old: json!(true),
                    new: json!(false),
                },
            ]
        );
    }

    #[test]
    fn map_entries_are_diffed_per_command() {
        let mut old = GuildConfig::new(1);
        old.commands.cooldowns.insert("ping".to_owned(), 5);
        old.commands.cooldowns.insert("help".to_owned(), 2);
        let mut new = old.clone();
        new.commands.cooldowns.remove("ping");
        new.commands
            .permissions
            .insert("ban".to_owned(), vec!["900".to_owned()]);

        let changes = diff_configs(&old, &new);
        let paths: Vec<&str> = changes.iter().map(|change| change.path.as_str()).collect();

        assert_eq!(paths, ["commands.permissions.ban", "commands.cooldowns.ping"]);
        assert_eq!(changes[0].new, json!(["900"]));
        assert_eq!(changes[1].old, json!(5));
        assert_eq!(changes[1].new, Value::Null);
    }
}
