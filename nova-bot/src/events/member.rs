use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};

use nova_core::Data;
use nova_gate::GuildConfig;
use nova_utils::log_channels::{LogEvent, log_channel, snowflake};

const AUTO_ROLE_REASON: &str = "Auto-role on join";
const JOIN_COLOR: u32 = 0x57_F2_87;
const LEAVE_COLOR: u32 = 0xED_42_45;

/// Member join: log it, hand out auto-roles, then send the welcome messages.
pub async fn handle_member_add(ctx: &serenity::Context, data: &Data, member: &serenity::Member) {
    let guild_id = member.guild_id;
    let Some(config) = data.configs().get(guild_id.get()).await else {
        debug!(guild_id = %guild_id, "no guild config; skipping member join handling");
        return;
    };

    log_member_event(ctx, &config, LogEvent::MemberJoin, &member.user).await;

    let auto_roles = auto_role_ids(&config);
    if !auto_roles.is_empty() {
        assign_auto_roles(ctx, member, &auto_roles).await;
    }

    if config.features.welcome_messages && config.welcome.enabled {
        send_welcome(ctx, &config, member).await;
    }
}

pub async fn handle_member_remove(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
) {
    let Some(config) = data.configs().get(guild_id.get()).await else {
        return;
    };

    log_member_event(ctx, &config, LogEvent::MemberLeave, user).await;
}

/// Roles to give new members; empty when either auto-role switch is off.
fn auto_role_ids(config: &GuildConfig) -> Vec<serenity::RoleId> {
    if !config.features.auto_roles || !config.auto_roles.enabled {
        return Vec::new();
    }

    config
        .auto_roles
        .roles
        .iter()
        .filter_map(|raw| {
            let id = snowflake(raw);
            if id.is_none() {
                debug!(role_id = %raw, "ignoring invalid auto-role id");
            }
            id
        })
        .map(serenity::RoleId::new)
        .collect()
}

async fn assign_auto_roles(
    ctx: &serenity::Context,
    member: &serenity::Member,
    roles: &[serenity::RoleId],
) {
    for role_id in roles {
        let added = ctx
            .http
            .add_member_role(member.guild_id, member.user.id, *role_id, Some(AUTO_ROLE_REASON))
            .await;

        if let Err(source) = added {
            error!(
                ?source,
                guild_id = %member.guild_id,
                role_id = %role_id,
                "failed to add auto-role"
            );
        }
    }

    info!(
        guild_id = %member.guild_id,
        user_id = %member.user.id,
        roles = roles.len(),
        "auto-roles assigned"
    );
}

async fn send_welcome(ctx: &serenity::Context, config: &GuildConfig, member: &serenity::Member) {
    let guild_id = member.guild_id;
    let (server, member_count) = match guild_summary(ctx, guild_id).await {
        Some(summary) => summary,
        None => {
            warn!(guild_id = %guild_id, "guild not found; skipping welcome messages");
            return;
        }
    };

    let welcome = &config.welcome;
    let channel_id = welcome.channel_id.as_deref().and_then(snowflake);
    if let (Some(channel_id), Some(template)) = (channel_id, welcome.message.as_deref()) {
        let content = render_channel_welcome(template, &member.user, &server, member_count);
        let sent = serenity::ChannelId::new(channel_id)
            .send_message(&ctx.http, serenity::CreateMessage::new().content(content))
            .await;

        if let Err(source) = sent {
            error!(?source, guild_id = %guild_id, "failed to send welcome message");
        }
    }

    let dm_template = welcome.dm_message.as_deref().filter(|_| welcome.dm_enabled);
    if let Some(template) = dm_template {
        let content = render_dm_welcome(template, &member.user, &server);
        let sent = member
            .user
            .direct_message(ctx, serenity::CreateMessage::new().content(content))
            .await;

        // Members with closed DMs are common.
        if let Err(source) = sent {
            warn!(?source, user_id = %member.user.id, "failed to send welcome DM");
        }
    }
}

/// Guild name and member count, from the cache when possible.
async fn guild_summary(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
) -> Option<(String, Option<u64>)> {
    let cached = ctx
        .cache
        .guild(guild_id)
        .map(|guild| (guild.name.clone(), Some(guild.member_count)));
    if cached.is_some() {
        return cached;
    }

    match guild_id.to_partial_guild(&ctx.http).await {
        Ok(guild) => Some((guild.name, guild.approximate_member_count)),
        Err(source) => {
            error!(?source, guild_id = %guild_id, "failed to fetch guild");
            None
        }
    }
}

/// `{user}` mentions the member in channel messages.
fn render_channel_welcome(
    template: &str,
    user: &serenity::User,
    server: &str,
    member_count: Option<u64>,
) -> String {
    let member_count = member_count.map_or_else(|| "?".to_owned(), |count| count.to_string());

    template
        .replace("{user}", &format!("<@{}>", user.id))
        .replace("{username}", &user.name)
        .replace("{server}", server)
        .replace("{memberCount}", &member_count)
}

/// Mentions don't resolve in DMs, so `{user}` is the plain username there.
fn render_dm_welcome(template: &str, user: &serenity::User, server: &str) -> String {
    template
        .replace("{user}", &user.name)
        .replace("{username}", &user.name)
        .replace("{server}", server)
}

async fn log_member_event(
    ctx: &serenity::Context,
    config: &GuildConfig,
    event: LogEvent,
    user: &serenity::User,
) {
    let Some(channel_id) = log_channel(config, event) else {
        return;
    };

    let (title, color) = match event {
        LogEvent::MemberLeave => ("Member Left", LEAVE_COLOR),
        _ => ("Member Joined", JOIN_COLOR),
    };

    let mut embed = serenity::CreateEmbed::new()
        .color(color)
        .title(title)
        .thumbnail(user.face())
        .field("User", user.tag(), true)
        .field("ID", user.id.to_string(), true)
        .footer(serenity::CreateEmbedFooter::new(format!("User ID: {}", user.id)))
        .timestamp(serenity::Timestamp::now());

    if event == LogEvent::MemberJoin {
        let age = account_age_days(
            serenity::Timestamp::now().unix_timestamp(),
            user.id.created_at().unix_timestamp(),
        );
        embed = embed.field("Account Age", format!("{age} days"), true);
    }

    let sent = channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await;
    if let Err(source) = sent {
        error!(?source, channel_id = %channel_id, "failed to log member event");
    }
}

fn account_age_days(now_secs: i64, created_secs: i64) -> i64 {
    now_secs.saturating_sub(created_secs).max(0) / 86_400
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use nova_gate::GuildConfig;

    use super::{account_age_days, auto_role_ids, render_channel_welcome, render_dm_welcome};

    fn member_user() -> serenity::User {
        let mut user = serenity::User::default();
        user.id = serenity::UserId::new(42);
        user.name = "nova_fan".to_owned();
        user
    }

    #[test]
    fn channel_welcome_fills_every_placeholder() {
        let rendered = render_channel_welcome(
            "Welcome {user} ({username}) to {server}! You are #{memberCount}.",
            &member_user(),
            "Nova HQ",
            Some(120),
        );

        assert_eq!(rendered, "Welcome <@42> (nova_fan) to Nova HQ! You are #120.");
        assert_eq!(
            render_channel_welcome("{memberCount}", &member_user(), "Nova HQ", None),
            "?"
        );
    }

    #[test]
    fn dm_welcome_uses_plain_names() {
        assert_eq!(
            render_dm_welcome("Hi {user}, welcome to {server}.", &member_user(), "Nova HQ"),
            "Hi nova_fan, welcome to Nova HQ."
        );
    }

    #[test]
    fn auto_roles_need_both_switches() {
        let mut config = GuildConfig::new(1);
        config.auto_roles.roles = vec!["10".to_owned(), "bogus".to_owned(), "20".to_owned()];

        assert!(auto_role_ids(&config).is_empty());

        config.auto_roles.enabled = true;
        assert!(auto_role_ids(&config).is_empty());

        config.features.auto_roles = true;
        assert_eq!(
            auto_role_ids(&config),
            vec![serenity::RoleId::new(10), serenity::RoleId::new(20)]
        );
    }

    #[test]
    fn account_age_rounds_down_to_days() {
        assert_eq!(account_age_days(3 * 86_400 + 5, 0), 3);
        assert_eq!(account_age_days(0, 100), 0);
    }
}
