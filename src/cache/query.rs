use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DbErr;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{CacheBackend, CacheKey};
use crate::error::{Error, Result};

/// How long a populated listing is served from the cache.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

const DEFAULT_PREFIX: &str = "bookstore";

/// A listing read that can be served through [`QueryCache`].
///
/// The implementing value is the query descriptor: it is serialized into the
/// [`CacheKey`], so it must carry every parameter that affects the result and
/// nothing else. `S` is the store the query runs against, usually a Sea-ORM
/// `DatabaseConnection`.
#[async_trait]
pub trait ListingQuery<S>: Serialize + Send + Sync
where
    S: ?Sized + Sync,
{
    type Item: Serialize + DeserializeOwned + Send;

    /// Stable, human-readable name of the query, e.g. `books.by_isbn`.
    fn operation(&self) -> &'static str;

    /// Runs the query. Results come back in the store's order.
    async fn fetch(&self, store: &S) -> Result<Vec<Self::Item>, DbErr>;
}

/// Get-or-populate cache for listing queries.
///
/// A hit is decoded and returned without touching the store. A miss runs the
/// query, stores the MessagePack-encoded rows with a fixed TTL and returns
/// them. Entries are never updated in place or invalidated by writes, so a
/// listing can lag behind the store by up to one TTL.
///
/// Two concurrent misses on the same key both query the store and the last
/// write wins; both callers still get a correct result.
#[derive(Debug, Clone)]
pub struct QueryCache<B> {
    backend: B,
    ttl: Duration,
    prefix: String,
}

impl<B> QueryCache<B>
where
    B: CacheBackend,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            ttl: DEFAULT_TTL,
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Namespace for every key this cache writes, so several applications
    /// can share one backend.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serves `query` from the cache, running it against `store` on a miss.
    ///
    /// A "no rows" error from the store becomes an empty list, which is cached
    /// like any other result. Any other store error, and any encode or decode
    /// failure, fails the call; nothing partial is returned or cached.
    pub async fn list_cached<S, Q>(&self, store: &S, query: &Q) -> Result<Vec<Q::Item>>
    where
        S: ?Sized + Sync,
        Q: ListingQuery<S>,
    {
        let key = CacheKey::new(&self.prefix, query.operation(), query)?;

        if let Some(data) = self.backend.get(key.as_str()).await? {
            debug!(key = %key, "listing cache hit");
            return rmp_serde::from_slice(&data).map_err(|e| Error::Decode(e.to_string()));
        }

        debug!(key = %key, "listing cache miss");
        let items = match query.fetch(store).await {
            Ok(items) => items,
            Err(DbErr::RecordNotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let data = rmp_serde::to_vec(&items).map_err(|e| Error::Encode(e.to_string()))?;
        self.backend.set(key.as_str(), data, self.ttl).await?;

        debug!(key = %key, rows = items.len(), "listing cached");
        Ok(items)
    }
}
