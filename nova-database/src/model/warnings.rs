use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct WarningEntry {
    pub id: i64,
    pub user_id: u64,
    pub user_tag: String,
    pub moderator_id: u64,
    pub moderator_tag: String,
    pub reason: String,
    pub warned_at: u64,
}

/// Input for [`crate::impls::warnings::record_warning`].
#[derive(Clone, Copy, Debug)]
pub struct NewWarning<'a> {
    pub guild_id: u64,
    pub user_id: u64,
    pub user_tag: &'a str,
    pub moderator_id: u64,
    pub moderator_tag: &'a str,
    pub reason: &'a str,
}

#[derive(Clone, Copy, Debug)]
pub struct WarningRecord {
    pub id: i64,
    /// Active warnings for the user after this one was recorded.
    pub warning_count: u64,
}
