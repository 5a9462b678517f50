//! Read-through caching for listing queries.
//!
//! [`QueryCache`] sits in front of any [`ListingQuery`] and stores its
//! MessagePack-encoded result under a [`CacheKey`] for a fixed TTL. Where the
//! bytes live is up to the [`CacheBackend`]:
//!
//! - [`MemoryCache`]: per-process map, good for a single instance and tests
//! - [`DatabaseCache`]: a `cache_entries` table in the main database
//! - `RedisCache` (feature `redis`): a shared Redis server
//!
//! Entries are never invalidated by writes; they live until their TTL runs
//! out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

mod database;
mod key;
mod memory;
mod query;
#[cfg(feature = "redis")]
mod redis_store;

pub use database::DatabaseCache;
pub use key::CacheKey;
pub use memory::MemoryCache;
pub use query::{ListingQuery, QueryCache, DEFAULT_TTL};
#[cfg(feature = "redis")]
pub use redis_store::RedisCache;

/// Byte-level storage behind [`QueryCache`].
///
/// An entry read after its TTL has elapsed must be reported as absent, never
/// as stale data. Failures are returned, not swallowed, so a broken backend
/// fails the request instead of silently hammering the database.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}

#[async_trait]
impl<T> CacheBackend for Arc<T>
where
    T: CacheBackend + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        (**self).set(key, value, ttl).await
    }
}
