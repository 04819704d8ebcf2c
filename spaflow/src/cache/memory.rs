//! In-memory page cache.

use super::{CacheKey, CachedPage, PageCache};
use crate::config::SpaConfig;
use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-local [`PageCache`] backed by a concurrent hash map.
#[derive(Debug, Default)]
pub struct InMemoryPageCache {
    entries: DashMap<String, CachedPage>,
    ttl: Option<Duration>,
    writes: AtomicUsize,
}

impl InMemoryPageCache {
    /// Creates a cache whose entries never expire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache applying `ttl` to entries written without an expiry.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Creates a cache using the configured lifetime.
    #[must_use]
    pub fn from_config(config: &SpaConfig) -> Self {
        Self {
            ttl: config.cache_ttl(),
            ..Self::default()
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `set` calls served so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
    async fn try_get(&self, key: &CacheKey) -> anyhow::Result<Option<CachedPage>> {
        if let Some(entry) = self.entries.get(key.as_str()) {
            if !entry.is_expired() {
                return Ok(Some(entry.clone()));
            }
        } else {
            return Ok(None);
        }

        // A concurrent writer may have replaced the entry since the read.
        self.entries.remove_if(key.as_str(), |_, entry| entry.is_expired());
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, mut page: CachedPage) -> anyhow::Result<()> {
        if page.expires_at.is_none() {
            if let Some(ttl) = self.ttl {
                page = page.with_ttl(ttl);
            }
        }
        self.entries.insert(key.as_str().to_string(), page);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> anyhow::Result<()> {
        self.entries.remove(key.as_str());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.entries.clear();
        Ok(())
    }
}
