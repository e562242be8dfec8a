/// Guild configuration storage.
pub mod guild_config;
/// Warning storage and counts.
pub mod warnings;
