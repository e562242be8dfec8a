use nova_core::{Context, Error};
use nova_gate::{CommandCategory, CommandSpec, GuildConfig};
use nova_utils::embed::titled_embed;
use nova_utils::formatting::{format_compact_duration, format_role_mentions};

use crate::CommandMeta;
use crate::moderation::embeds::guild_only_message;

pub const META: CommandMeta = CommandMeta {
    name: "config",
    desc: "View the current server configuration.",
    usage: "!config",
    spec: CommandSpec::new("config", CommandCategory::Admin).admin_only(),
};

#[poise::command(prefix_command, slash_command, category = "Admin")]
pub async fn config(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(config) = ctx.data().configs().get(guild_id.get()).await else {
        ctx.send(
            poise::CreateReply::default()
                .content("Failed to fetch configuration.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    let mut embed = titled_embed("Server Configuration", "Use the dashboard for full configuration.");
    for (name, value, inline) in config_fields(&config) {
        embed = embed.field(name, value, inline);
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

fn toggle(enabled: bool) -> &'static str {
    if enabled { "✅" } else { "❌" }
}

fn config_fields(config: &GuildConfig) -> Vec<(&'static str, String, bool)> {
    let features = &config.features;
    let toggles = &config.commands.category_toggles;
    let moderation = &config.moderation;
    let auto_timeout = &moderation.auto_timeout;

    let mut fields = vec![
        (
            "Features",
            [
                format!("Moderation: {}", toggle(features.moderation)),
                format!("Logging: {}", toggle(features.logging)),
                format!("Welcome Messages: {}", toggle(features.welcome_messages)),
                format!("Auto Roles: {}", toggle(features.auto_roles)),
            ]
            .join("\n"),
            true,
        ),
        (
            "Command Categories",
            [
                format!("Moderation: {}", toggle(toggles.moderation)),
                format!("Admin: {}", toggle(toggles.admin)),
                format!("Utility: {}", toggle(toggles.utility)),
                format!("Roles: {}", toggle(toggles.roles)),
            ]
            .join("\n"),
            true,
        ),
        (
            "Moderation",
            [
                format!("Mod Roles: {}", format_role_mentions(&moderation.mod_roles)),
                format!("Admin Roles: {}", format_role_mentions(&moderation.admin_roles)),
                format!(
                    "Log Channel: {}",
                    moderation
                        .log_channel
                        .as_deref()
                        .map_or("Not set".to_owned(), |id| format!("<#{id}>"))
                ),
                if auto_timeout.enabled {
                    format!(
                        "Auto-Timeout: {} after {} warning(s)",
                        format_compact_duration(auto_timeout.duration),
                        auto_timeout.warn_threshold
                    )
                } else {
                    "Auto-Timeout: Disabled".to_owned()
                },
            ]
            .join("\n"),
            false,
        ),
    ];

    if !config.commands.disabled.is_empty() {
        let mut disabled = config.commands.disabled.clone();
        disabled.sort_unstable();
        fields.push(("Disabled Commands", disabled.join(", "), false));
    }

    if !config.commands.cooldowns.is_empty() {
        let mut cooldowns: Vec<_> = config.commands.cooldowns.iter().collect();
        cooldowns.sort_unstable_by_key(|(name, _)| name.as_str());
        let lines = cooldowns
            .into_iter()
            .map(|(name, seconds)| format!("`{name}`: {}", format_compact_duration(*seconds)))
            .collect::<Vec<_>>()
            .join("\n");
        fields.push(("Cooldown Overrides", lines, false));
    }

    fields
}

#[cfg(test)]
mod tests {
    use nova_gate::GuildConfig;

    use super::config_fields;

    #[test]
    fn default_config_has_three_sections() {
        let fields = config_fields(&GuildConfig::new(1));
        let names: Vec<&str> = fields.iter().map(|(name, _, _)| *name).collect();
        assert_eq!(names, ["Features", "Command Categories", "Moderation"]);
        assert!(fields[2].1.contains("Mod Roles: None set"));
        assert!(fields[2].1.contains("Auto-Timeout: Disabled"));
    }

    #[test]
    fn overrides_and_disabled_commands_are_listed() {
        let mut config = GuildConfig::new(1);
        config.moderation.mod_roles = vec!["10".to_owned()];
        config.moderation.auto_timeout.enabled = true;
        config.commands.disabled = vec!["warn".to_owned(), "ban".to_owned()];
        config.commands.cooldowns.insert("ping".to_owned(), 30);

        let fields = config_fields(&config);
        assert!(fields[2].1.contains("Mod Roles: <@&10>"));
        assert!(fields[2].1.contains("after 3 warning(s)"));
        assert_eq!(fields[3], ("Disabled Commands", "ban, warn".to_owned(), false));
        assert_eq!(fields[4], ("Cooldown Overrides", "`ping`: 30s".to_owned(), false));
    }
}
