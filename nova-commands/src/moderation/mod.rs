pub mod ban;
pub mod clear_warnings;
pub(crate) mod embeds;
pub mod escalation;
pub mod kick;
pub mod logging;
pub mod target;
pub mod timeout;
pub mod warn;
pub mod warnings;
