use async_trait::async_trait;

use crate::error::FetchError;
use crate::model::GuildConfig;

/// Source of truth for guild configuration.
///
/// Implementations must be idempotent: the cache may retry or abandon a
/// fetch at any time.
#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn fetch(&self, guild_id: u64) -> Result<GuildConfig, FetchError>;
}

/// Read access to persisted warnings.
#[async_trait]
pub trait WarningStore: Send + Sync {
    /// Number of active warnings for a user in a guild.
    async fn count(&self, guild_id: u64, user_id: u64) -> Result<u64, FetchError>;
}
