mod redis_store;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use redis_store::RedisCacheStore;

/// How long a guild config stays in Redis. Shared by every bot process, so it
/// matches the in-process TTL of the gate's config cache.
pub const GUILD_CONFIG_CACHE_TTL: Duration = Duration::from_secs(60);

/// Without Redis every read misses and every write is dropped.
#[derive(Clone, Debug)]
enum CacheBackend {
    Disabled,
    Redis(RedisCacheStore),
}

/// Optional Redis read-through layer in front of Postgres.
#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    backend: CacheBackend,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Disabled,
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Redis(RedisCacheStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, CacheBackend::Redis(_))
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.ping().await,
        }
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    pub fn guild_config_key(&self, guild_id: u64) -> String {
        self.key(format!("guild_config:{guild_id}"))
    }

    pub async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let bytes = match &self.backend {
            CacheBackend::Disabled => return Ok(None),
            CacheBackend::Redis(store) => store.get(key).await?,
        };

        bytes
            .map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    anyhow::anyhow!("failed to deserialize cache value for `{key}`: {e}")
                })
            })
            .transpose()
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let ttl_seconds = ttl.as_secs().max(1);
        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow::anyhow!("failed to serialize cache value for `{key}`: {e}"))?;

        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.set(key, payload, ttl_seconds).await,
        }
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.del(key).await,
        }
    }

    /// Serve `key` from Redis, or run `loader` and store its result.
    ///
    /// Redis failures are logged and never fail the read.
    pub async fn get_or_load_json<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self.get_json::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!(?e, cache_key = key, "cache get failed; falling back to database"),
        }

        let loaded = loader().await?;

        if let Err(e) = self.set_json(key, &loaded, ttl).await {
            warn!(?e, cache_key = key, "cache set failed; returning database value");
        }

        Ok(loaded)
    }

    /// Drop a key, logging instead of failing when Redis is unreachable.
    pub async fn evict(&self, key: &str) {
        if let Err(e) = self.del(key).await {
            warn!(?e, cache_key = key, "cache delete failed; entry will expire on its own");
        }
    }
}
