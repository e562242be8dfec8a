use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{guild_only_message, usage_message};
use nova_core::{Context, Error};
use nova_database::impls::warnings::list_warnings;
use nova_database::model::warnings::WarningEntry;
use nova_gate::{CommandCategory, CommandSpec};
use nova_utils::embed::titled_embed;

pub const META: CommandMeta = CommandMeta {
    name: "warnings",
    desc: "Show the active warnings for a user.",
    usage: "!warnings <user>",
    spec: CommandSpec::new("warnings", CommandCategory::Mod).mod_only(),
};

const SHOWN_WARNINGS: usize = 10;
const REASON_PREVIEW_CHARS: usize = 200;

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "The user to check"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let entries = list_warnings(&ctx.data().db, guild_id.get(), user.id.get()).await?;

    let embed = if entries.is_empty() {
        titled_embed("No Warnings", format!("{} has no warnings.", user.tag()))
    } else {
        let mut embed = titled_embed(
            format!("Warnings for {}", user.tag()),
            warnings_description(&entries),
        );
        if entries.len() > SHOWN_WARNINGS {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Showing {SHOWN_WARNINGS} of {} warnings",
                entries.len()
            )));
        }
        embed
    };

    ctx.send(poise::CreateReply::default().embed(embed.thumbnail(user.face())))
        .await?;
    Ok(())
}

fn warnings_description(entries: &[WarningEntry]) -> String {
    let mut out = format!("Total: {} warning(s)\n", entries.len());

    for entry in entries.iter().take(SHOWN_WARNINGS) {
        let reason: String = entry.reason.chars().take(REASON_PREVIEW_CHARS).collect();
        out.push_str(&format!(
            "\n**#{}** <t:{}:d> by {}\n{}",
            entry.id,
            entry.warned_at,
            entry.moderator_tag,
            reason.replace('@', "@\u{200B}")
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use nova_database::model::warnings::WarningEntry;

    use super::warnings_description;

    fn entry(id: i64, reason: &str) -> WarningEntry {
        WarningEntry {
            id,
            user_id: 2,
            user_tag: "member".to_owned(),
            moderator_id: 1,
            moderator_tag: "mod".to_owned(),
            reason: reason.to_owned(),
            warned_at: 1_700_000_000,
        }
    }

    #[test]
    fn lists_newest_ten() {
        let entries: Vec<WarningEntry> = (1..=12).rev().map(|id| entry(id, "spam")).collect();
        let description = warnings_description(&entries);

        assert!(description.starts_with("Total: 12 warning(s)"));
        assert!(description.contains("**#12**"));
        assert!(description.contains("**#3**"));
        assert!(!description.contains("**#2**"));
    }

    #[test]
    fn long_reasons_are_truncated_and_mentions_defused() {
        let long = "x".repeat(500);
        let description = warnings_description(&[entry(1, &long), entry(2, "@everyone")]);

        assert!(!description.contains(&"x".repeat(201)));
        assert!(description.contains("@\u{200B}everyone"));
    }
}
