use poise::serenity_prelude as serenity;

use nova_gate::GuildConfig;

/// Log entries a guild can route to a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogEvent {
    ModAction,
    MemberJoin,
    MemberLeave,
}

/// Channel that receives `event` for this guild.
///
/// `None` when the logging feature or the event is switched off, or when no
/// valid channel id is configured for it.
pub fn log_channel(config: &GuildConfig, event: LogEvent) -> Option<serenity::ChannelId> {
    if !config.features.logging {
        return None;
    }

    let logging = &config.logging;
    let (enabled, channel) = match event {
        LogEvent::ModAction => (logging.events.mod_actions, &logging.channels.moderation),
        LogEvent::MemberJoin => (logging.events.member_join, &logging.channels.members),
        LogEvent::MemberLeave => (logging.events.member_leave, &logging.channels.members),
    };

    if !enabled {
        return None;
    }

    snowflake(channel.as_deref()?).map(serenity::ChannelId::new)
}

/// Parse a stored Discord id; zero and non-numeric ids are rejected.
pub fn snowflake(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|id| *id != 0)
}
