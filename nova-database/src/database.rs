use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::cache::CacheService;

/// Migrations embedded from `nova-database/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!();

const MAX_CONNECTIONS: u32 = 5;

/// Postgres pool plus the Redis read-through layer for guild configs.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
    cache: CacheService,
}

impl Database {
    pub async fn connect(database_url: &str, cache: CacheService) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        info!(max_connections = MAX_CONNECTIONS, "PostgreSQL connection established.");

        Ok(Self::with_cache(pool, cache))
    }

    pub fn with_cache(pool: PgPool, cache: CacheService) -> Self {
        Self { pool, cache }
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }
}
