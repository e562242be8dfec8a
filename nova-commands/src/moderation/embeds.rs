use poise::serenity_prelude as serenity;

use nova_utils::embed::DEFAULT_EMBED_COLOR;

pub fn moderation_action_embed(
    target: &serenity::User,
    action_past_tense: &str,
    reason: Option<&str>,
    duration: Option<&str>,
) -> serenity::CreateEmbed {
    let reason = reason
        .unwrap_or("No reason provided")
        .replace('@', "@\u{200B}");

    let mut description = format!("**Target :** <@{}>\n**Reason :** {}", target.id.get(), reason);
    if let Some(duration) = duration {
        description.push_str(&format!("\n**Duration :** {duration}"));
    }

    let display_name = target.global_name.as_deref().unwrap_or(&target.name);

    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .author(
            serenity::CreateEmbedAuthor::new(format!(
                "{display_name} has been {action_past_tense}"
            ))
            .icon_url(target.face()),
        )
        .description(description)
}

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn is_missing_permissions_error(source: &serenity::Error) -> bool {
    matches!(
        source,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403 || response.error.code == 50013
    )
}
