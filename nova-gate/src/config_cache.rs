//! TTL cache in front of a [`ConfigService`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::{Instant, timeout};
use tracing::{debug, warn};

use crate::command::CommandSpec;
use crate::cooldown::resolve_cooldown;
use crate::error::FetchError;
use crate::model::GuildConfig;
use crate::permissions;
use crate::service::ConfigService;

/// How long a fetched config is served before it is fetched again.
pub const CONFIG_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct CacheEntry {
    config: Arc<GuildConfig>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-wide cache of guild configurations, keyed by guild id.
pub struct ConfigCache {
    service: Arc<dyn ConfigService>,
    entries: DashMap<u64, CacheEntry>,
    fetch_timeout: Duration,
}

impl fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigCache")
            .field("cached_guilds", &self.entries.len())
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl ConfigCache {
    pub fn new(service: Arc<dyn ConfigService>) -> Self {
        Self {
            service,
            entries: DashMap::new(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Return the guild's config, fetching it when missing or expired.
    ///
    /// `None` means the fetch failed or timed out. Callers decide what that
    /// means for their check.
    pub async fn get(&self, guild_id: u64) -> Option<Arc<GuildConfig>> {
        if let Some(entry) = self.entries.get(&guild_id)
            && entry.is_fresh(Instant::now())
        {
            return Some(Arc::clone(&entry.config));
        }

        match self.fetch(guild_id).await {
            Ok(config) => {
                let config = Arc::new(config);
                self.entries.insert(
                    guild_id,
                    CacheEntry {
                        config: Arc::clone(&config),
                        expires_at: Instant::now() + CONFIG_TTL,
                    },
                );
                debug!(guild_id, "cached guild config");
                Some(config)
            }
            Err(source) => {
                warn!(?source, guild_id, "failed to fetch guild config");
                let now = Instant::now();
                self.entries
                    .remove_if(&guild_id, |_, entry| !entry.is_fresh(now));
                None
            }
        }
    }

    async fn fetch(&self, guild_id: u64) -> Result<GuildConfig, FetchError> {
        timeout(self.fetch_timeout, self.service.fetch(guild_id))
            .await
            .map_err(|_| FetchError::Timeout(self.fetch_timeout))?
    }

    pub fn invalidate(&self, guild_id: u64) {
        if self.entries.remove(&guild_id).is_some() {
            debug!(guild_id, "invalidated cached guild config");
        }
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
        debug!("cleared guild config cache");
    }

    /// Number of cached guilds, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn is_command_enabled(&self, guild_id: u64, command: &CommandSpec) -> bool {
        let config = self.get(guild_id).await;
        permissions::is_command_enabled(config.as_deref(), command)
    }

    pub async fn has_command_permission(
        &self,
        guild_id: u64,
        command_name: &str,
        user_roles: &[String],
    ) -> bool {
        let config = self.get(guild_id).await;
        permissions::has_command_permission(config.as_deref(), command_name, user_roles)
    }

    pub async fn is_moderator(&self, guild_id: u64, user_roles: &[String]) -> bool {
        let config = self.get(guild_id).await;
        permissions::is_moderator(config.as_deref(), user_roles)
    }

    pub async fn is_admin(&self, guild_id: u64, user_roles: &[String]) -> bool {
        let config = self.get(guild_id).await;
        permissions::is_admin(config.as_deref(), user_roles)
    }

    /// Effective cooldown for a command, `0` when the config is unavailable
    /// and the command has no static default.
    pub async fn cooldown(&self, guild_id: u64, command: &CommandSpec) -> u64 {
        let config = self.get(guild_id).await;
        resolve_cooldown(config.as_deref(), command)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{CONFIG_TTL, ConfigCache};
    use crate::command::CommandSpec;
    use crate::error::FetchError;
    use crate::model::{CommandCategory, GuildConfig};
    use crate::service::ConfigService;

    /// Serves whatever config is currently stored and counts fetches.
    #[derive(Default)]
    pub(crate) struct StaticConfigService {
        pub config: Mutex<Option<GuildConfig>>,
        pub fetches: AtomicUsize,
    }

    impl StaticConfigService {
        pub fn serving(config: GuildConfig) -> Arc<Self> {
            Arc::new(Self {
                config: Mutex::new(Some(config)),
                fetches: AtomicUsize::new(0),
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConfigService for StaticConfigService {
        async fn fetch(&self, _guild_id: u64) -> Result<GuildConfig, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.config
                .lock()
                .expect("config lock")
                .clone()
                .ok_or_else(|| FetchError::Backend("HTTP 500".to_owned()))
        }
    }

    struct HangingConfigService;

    #[async_trait]
    impl ConfigService for HangingConfigService {
        async fn fetch(&self, _guild_id: u64) -> Result<GuildConfig, FetchError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn serves_from_cache_until_ttl_elapses() {
        let service = StaticConfigService::serving(GuildConfig::new(1));
        let cache = ConfigCache::new(service.clone());

        assert!(cache.get(1).await.is_some());
        tokio::time::advance(CONFIG_TTL - Duration::from_millis(1)).await;
        assert!(cache.get(1).await.is_some());
        assert_eq!(service.fetches(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.get(1).await.is_some());
        assert_eq!(service.fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_a_refetch() {
        let service = StaticConfigService::serving(GuildConfig::new(1));
        let cache = ConfigCache::new(service.clone());

        cache.get(1).await;
        cache.invalidate(1);
        cache.get(1).await;
        assert_eq!(service.fetches(), 2);

        cache.get(2).await;
        assert_eq!(cache.len(), 2);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_is_absent_and_not_cached() {
        let service = StaticConfigService::failing();
        let cache = ConfigCache::new(service.clone());

        assert!(cache.get(1).await.is_none());
        assert!(cache.get(1).await.is_none());
        assert_eq!(service.fetches(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_dropped_when_refetch_fails() {
        let service = StaticConfigService::serving(GuildConfig::new(1));
        let cache = ConfigCache::new(service.clone());
        cache.get(1).await;

        *service.config.lock().expect("config lock") = None;
        tokio::time::advance(CONFIG_TTL).await;

        assert!(cache.get(1).await.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out() {
        let cache = ConfigCache::new(Arc::new(HangingConfigService))
            .with_fetch_timeout(Duration::from_millis(250));

        assert!(cache.get(1).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn absent_policy_per_check() {
        let cache = ConfigCache::new(StaticConfigService::failing());
        let ping = CommandSpec::new("ping", CommandCategory::Utility);
        let roles = vec!["R1".to_owned()];

        assert!(cache.is_command_enabled(1, &ping).await);
        assert!(cache.has_command_permission(1, "ping", &roles).await);
        assert!(!cache.is_moderator(1, &roles).await);
        assert!(!cache.is_admin(1, &roles).await);
        assert_eq!(cache.cooldown(1, &ping).await, 0);
    }
}
