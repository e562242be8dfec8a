use nova_core::{Context, Error};
use nova_gate::{CommandCategory, CommandSpec};
use nova_utils::embed::titled_embed;
use nova_utils::formatting::format_compact_duration;

use crate::{COMMANDS, CommandMeta, find_meta};

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Lists commands, or shows details for one command or category.",
    usage: "!help [command|category]",
    spec: CommandSpec::new("help", CommandCategory::Utility),
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command or category name"] query: Option<String>,
) -> Result<(), Error> {
    let query = query.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let embed = match query {
        None => titled_embed("Available Commands", grouped_help_description(None)),
        Some(wanted) => {
            if let Some(meta) = find_meta(&wanted.to_ascii_lowercase()) {
                let cooldown = match ctx.guild_id() {
                    Some(guild_id) => {
                        ctx.data().configs().cooldown(guild_id.get(), &meta.spec).await
                    }
                    None => meta.spec.default_cooldown_secs,
                };
                titled_embed(format!("!{}", meta.name), command_detail(meta, cooldown))
            } else if let Some(category) = parse_category(wanted) {
                titled_embed(
                    format!("{} Commands", display_category(category)),
                    grouped_help_description(Some(category)),
                )
            } else {
                ctx.say(unknown_query_message(wanted)).await?;
                return Ok(());
            }
        }
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn parse_category(raw: &str) -> Option<CommandCategory> {
    let raw = raw.to_ascii_lowercase();
    CommandCategory::ALL.into_iter().find(|category| {
        category.as_str() == raw || display_category(*category).eq_ignore_ascii_case(&raw)
    })
}

fn display_category(category: CommandCategory) -> &'static str {
    match category {
        CommandCategory::Mod => "Moderation",
        CommandCategory::Admin => "Admin",
        CommandCategory::Utility => "Utility",
        CommandCategory::Roles => "Roles",
    }
}

fn grouped_help_description(only: Option<CommandCategory>) -> String {
    let mut out = String::new();

    for category in CommandCategory::ALL {
        if only.is_some_and(|wanted| wanted != category) {
            continue;
        }

        let commands: Vec<&CommandMeta> = COMMANDS
            .iter()
            .filter(|meta| meta.category() == category)
            .collect();
        if commands.is_empty() {
            continue;
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("**{}**\n", display_category(category)));
        for meta in commands {
            out.push_str(&format!("`{}`: {}\n", meta.name, meta.desc));
        }
    }

    if out.is_empty() {
        out.push_str("No commands in this category.");
    }

    out.trim_end().to_owned()
}

fn command_detail(meta: &CommandMeta, cooldown_secs: u64) -> String {
    let required = if meta.spec.admin_only {
        "Administrator"
    } else if meta.spec.mod_only {
        "Moderator"
    } else {
        "Everyone"
    };
    let cooldown = if cooldown_secs == 0 {
        "None".to_owned()
    } else {
        format_compact_duration(cooldown_secs)
    };

    format!(
        "{}\n\n**Usage :** `{}`\n**Category :** {}\n**Required :** {}\n**Cooldown :** {}",
        meta.desc,
        meta.usage,
        display_category(meta.category()),
        required,
        cooldown
    )
}

fn unknown_query_message(query: &str) -> String {
    let categories = CommandCategory::ALL
        .into_iter()
        .map(display_category)
        .collect::<Vec<_>>()
        .join(", ");
    format!("No command or category named `{query}`.\nCategories: {categories}")
}

#[cfg(test)]
mod tests {
    use nova_gate::CommandCategory;

    use super::{command_detail, grouped_help_description, parse_category};
    use crate::find_meta;

    #[test]
    fn categories_parse_by_key_or_label() {
        assert_eq!(parse_category("mod"), Some(CommandCategory::Mod));
        assert_eq!(parse_category("Moderation"), Some(CommandCategory::Mod));
        assert_eq!(parse_category("utility"), Some(CommandCategory::Utility));
        assert_eq!(parse_category("fun"), None);
    }

    #[test]
    fn grouped_listing_filters_by_category() {
        let all = grouped_help_description(None);
        assert!(all.contains("**Moderation**"));
        assert!(all.contains("`warn`"));
        assert!(all.contains("**Roles**"));

        let roles = grouped_help_description(Some(CommandCategory::Roles));
        assert!(roles.starts_with("**Roles**"));
        assert!(roles.contains("`role`"));
        assert!(!roles.contains("`warn`"));
        assert!(!grouped_help_description(Some(CommandCategory::Utility)).contains("`warn`"));
    }

    #[test]
    fn detail_shows_tier_and_effective_cooldown() {
        let warn = find_meta("warn").expect("registered");
        let detail = command_detail(warn, 0);
        assert!(detail.contains("**Required :** Moderator"));
        assert!(detail.contains("**Cooldown :** None"));

        let ping = find_meta("ping").expect("registered");
        assert!(command_detail(ping, 90).contains("**Cooldown :** 1m 30s"));
    }
}
