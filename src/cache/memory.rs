use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::CacheBackend;
use crate::error::Result;

#[derive(Clone, Debug)]
struct CachedEntry {
    data: Vec<u8>,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CachedEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// In-process cache backend on a concurrent map.
///
/// Clones share the same map. Expired entries are dropped lazily on read and
/// in bulk by [`MemoryCache::purge_expired`].
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CachedEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.data.clone()));
            }
        } else {
            return Ok(None);
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let entry = CachedEntry {
            data: value,
            expires_at: Instant::now().checked_add(ttl),
        };
        self.entries.insert(key.to_owned(), entry);
        Ok(())
    }
}
