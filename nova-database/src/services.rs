use async_trait::async_trait;

use nova_gate::{ConfigService, FetchError, GuildConfig, WarningStore};

use crate::database::Database;
use crate::impls::guild_config::get_or_create_guild_config;
use crate::impls::warnings::count_warnings;

#[async_trait]
impl ConfigService for Database {
    async fn fetch(&self, guild_id: u64) -> Result<GuildConfig, FetchError> {
        get_or_create_guild_config(self, guild_id)
            .await
            .map_err(|e| FetchError::Database(format!("{e:#}")))
    }
}

#[async_trait]
impl WarningStore for Database {
    async fn count(&self, guild_id: u64, user_id: u64) -> Result<u64, FetchError> {
        count_warnings(self, guild_id, user_id)
            .await
            .map_err(|e| FetchError::Database(format!("{e:#}")))
    }
}
