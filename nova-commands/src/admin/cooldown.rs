use tracing::info;

use nova_core::{Context, Error};
use nova_database::BackendClient;
use nova_database::impls::guild_config::{get_or_create_guild_config, update_guild_config};
use nova_gate::model::COOLDOWN_OVERRIDE_RANGE;
use nova_gate::{CommandCategory, CommandSpec};
use nova_utils::formatting::format_compact_duration;
use nova_utils::parse::parse_duration_seconds;

use crate::moderation::embeds::{guild_only_message, usage_message};
use crate::{CommandMeta, find_meta};

pub const META: CommandMeta = CommandMeta {
    name: "cooldown",
    desc: "Show or override a command's cooldown in this server.",
    usage: "!cooldown <command> [duration|off]",
    spec: CommandSpec::new("cooldown", CommandCategory::Admin).admin_only(),
};

#[poise::command(prefix_command, slash_command, category = "Admin")]
pub async fn cooldown(
    ctx: Context<'_>,
    #[description = "Command name"] command: Option<String>,
    #[description = "New cooldown (e.g. 30s, 2m) or `off`"] value: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(command) = command else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let Some(target) = find_meta(&command.trim().to_ascii_lowercase()) else {
        ctx.say(format!("Unknown command `{command}`.")).await?;
        return Ok(());
    };

    let Some(raw_value) = value else {
        let effective = ctx
            .data()
            .configs()
            .cooldown(guild_id.get(), &target.spec)
            .await;
        ctx.say(format!(
            "`{}` cooldown: {}",
            target.name,
            describe_cooldown(effective)
        ))
        .await?;
        return Ok(());
    };

    if let Some(message) = override_write_refusal(ctx.data().backend.as_ref()) {
        ctx.say(message).await?;
        return Ok(());
    }

    let override_secs = match parse_cooldown_override(&raw_value) {
        Ok(seconds) => seconds,
        Err(message) => {
            ctx.say(message).await?;
            return Ok(());
        }
    };

    let db = &ctx.data().db;
    let mut config = get_or_create_guild_config(db, guild_id.get()).await?;
    match override_secs {
        Some(seconds) => {
            config.commands.cooldowns.insert(target.name.to_owned(), seconds);
        }
        None => {
            config.commands.cooldowns.remove(target.name);
        }
    }

    let changes = update_guild_config(db, guild_id.get(), &config).await?;
    ctx.data().configs().invalidate(guild_id.get());

    info!(
        guild_id = %guild_id,
        command = target.name,
        changes = changes.len(),
        "cooldown override updated"
    );

    let reply = match override_secs {
        Some(seconds) => format!(
            "`{}` cooldown set to {}.",
            target.name,
            format_compact_duration(seconds)
        ),
        None => format!(
            "`{}` cooldown override removed; default is {}.",
            target.name,
            describe_cooldown(target.spec.default_cooldown_secs)
        ),
    };
    ctx.say(reply).await?;

    Ok(())
}

fn describe_cooldown(seconds: u64) -> String {
    if seconds == 0 {
        "none".to_owned()
    } else {
        format_compact_duration(seconds)
    }
}

/// Overrides are written to Postgres, which is not where configs are read
/// from while the dashboard backend serves them.
fn override_write_refusal(backend: Option<&BackendClient>) -> Option<&'static str> {
    backend.map(|_| {
        "Cooldown overrides for this server are managed in the dashboard. \
         Changes made there apply here after `!reload`."
    })
}

/// `Ok(None)` clears the override so the command's default applies again.
fn parse_cooldown_override(raw: &str) -> Result<Option<u64>, String> {
    let raw = raw.trim();
    if matches!(raw.to_ascii_lowercase().as_str(), "off" | "reset" | "default")
        || is_zero_duration(raw)
    {
        return Ok(None);
    }

    let (_, max) = COOLDOWN_OVERRIDE_RANGE;
    match parse_duration_seconds(raw) {
        Some(seconds) if seconds <= max => Ok(Some(seconds)),
        Some(_) => Err(format!(
            "Cooldowns can be at most {}.",
            format_compact_duration(max)
        )),
        None => Err("Invalid duration. Use a format like 30s or 2m, or `off`.".to_owned()),
    }
}

/// `0`, `0s`, `0m0s` and the like.
fn is_zero_duration(raw: &str) -> bool {
    let mut saw_digit = false;
    let only_zeros = raw
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .all(|ch| match ch.to_ascii_lowercase() {
            '0' => {
                saw_digit = true;
                true
            }
            's' | 'm' | 'h' | 'd' | 'w' => saw_digit,
            _ => false,
        });

    only_zeros && saw_digit
}
