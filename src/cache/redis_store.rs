use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use tracing::debug;

use super::CacheBackend;
use crate::error::{Error, Result};

/// Cache backend on a shared Redis server.
///
/// Entries are written with `SET .. PX`, so Redis itself enforces the TTL at
/// millisecond precision.
/// Unlike a best-effort cache, connection and command errors are returned to
/// the caller.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool for `url`, e.g. `redis://127.0.0.1:6379/0`.
    pub fn from_url(url: &str) -> Result<Self> {
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::Config(format!("invalid redis configuration: {e}")))?;
        Ok(Self::new(pool))
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::Cache(e.to_string()))
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| Error::Cache(e.to_string()))?;

        debug!(key = %key, hit = value.is_some(), "redis get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let ttl_ms = ttl_millis(ttl);
        let mut conn = self.connection().await?;
        conn.pset_ex::<_, _, ()>(key, value, ttl_ms)
            .await
            .map_err(|e| Error::Cache(e.to_string()))?;

        debug!(key = %key, ttl_ms, "redis set");
        Ok(())
    }
}

// PX 0 is rejected by redis, so sub-millisecond TTLs round up to 1 ms.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}
