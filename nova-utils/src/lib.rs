/// Shared embed styling.
pub mod embed;
/// Duration formatting for user-facing replies.
pub mod formatting;
/// Message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Where guild log entries are sent.
pub mod log_channels;
/// Pure parser helpers.
pub mod parse;
/// Resolve gate user contexts from guild members.
pub mod permissions;
/// Shared time helpers.
pub mod time;
