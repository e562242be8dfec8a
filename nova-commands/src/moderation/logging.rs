use tracing::{debug, error};

use poise::serenity_prelude as serenity;

use nova_core::Context;
use nova_utils::log_channels::{LogEvent, log_channel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModAction {
    Warn,
    ClearWarnings,
    Timeout,
    Kick,
    Ban,
}

impl ModAction {
    fn label(self) -> &'static str {
        match self {
            ModAction::Warn => "Warn",
            ModAction::ClearWarnings => "Clear Warnings",
            ModAction::Timeout => "Timeout",
            ModAction::Kick => "Kick",
            ModAction::Ban => "Ban",
        }
    }

    fn color(self) -> u32 {
        match self {
            ModAction::Warn => 0xFE_E7_5C,
            ModAction::ClearWarnings => 0x57_F2_87,
            ModAction::Timeout => 0xE6_7E_22,
            ModAction::Kick => 0xED_42_45,
            ModAction::Ban => 0x99_2D_22,
        }
    }
}

/// One moderation action as it appears in the guild's moderation log.
pub struct ModLogEntry<'a> {
    action: ModAction,
    moderator: &'a serenity::User,
    target: &'a serenity::User,
    reason: Option<&'a str>,
    duration: Option<String>,
    extra: Vec<(&'static str, String)>,
}

impl<'a> ModLogEntry<'a> {
    pub fn new(action: ModAction, moderator: &'a serenity::User, target: &'a serenity::User) -> Self {
        Self {
            action,
            moderator,
            target,
            reason: None,
            duration: None,
            extra: Vec::new(),
        }
    }

    pub fn reason(mut self, reason: Option<&'a str>) -> Self {
        self.reason = reason;
        self
    }

    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn field(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.extra.push((name, value.into()));
        self
    }

    /// `(name, value, inline)` in display order.
    fn fields(&self) -> Vec<(&'static str, String, bool)> {
        let mut fields = vec![
            (
                "Moderator",
                format!("{} ({})", self.moderator.tag(), self.moderator.id),
                true,
            ),
            (
                "Target",
                format!("{} ({})", self.target.tag(), self.target.id),
                true,
            ),
        ];

        if let Some(reason) = self.reason {
            fields.push(("Reason", reason.replace('@', "@\u{200B}"), false));
        }
        if let Some(duration) = &self.duration {
            fields.push(("Duration", duration.clone(), true));
        }
        for (name, value) in &self.extra {
            fields.push((*name, value.clone(), false));
        }

        fields
    }

    fn embed(&self) -> serenity::CreateEmbed {
        serenity::CreateEmbed::new()
            .color(self.action.color())
            .title(format!("Moderation Action: {}", self.action.label()))
            .fields(self.fields())
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Target ID: {}",
                self.target.id
            )))
            .timestamp(serenity::Timestamp::now())
    }
}

/// Post `entry` to the guild's moderation log channel, when logging is on.
///
/// Failures are logged here and never surface to the moderator.
pub async fn publish_mod_action(
    ctx: &Context<'_>,
    guild_id: serenity::GuildId,
    entry: ModLogEntry<'_>,
) {
    let Some(config) = ctx.data().configs().get(guild_id.get()).await else {
        debug!(guild_id = %guild_id, "no guild config; skipping moderation log");
        return;
    };

    let Some(channel_id) = log_channel(&config, LogEvent::ModAction) else {
        return;
    };

    let message = serenity::CreateMessage::new().embed(entry.embed());
    if let Err(source) = channel_id.send_message(ctx.http(), message).await {
        error!(
            ?source,
            guild_id = %guild_id,
            channel_id = %channel_id,
            "failed to publish moderation log entry"
        );
    }
}
