use poise::serenity_prelude as serenity;

pub const DEFAULT_EMBED_COLOR: u32 = 0x58_65_F2;

/// Plain titled embed in the default color.
pub fn titled_embed(title: impl Into<String>, description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(title)
        .description(description)
}
