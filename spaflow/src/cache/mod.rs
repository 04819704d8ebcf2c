//! Page cache port and key derivation.
//!
//! The `setup` action group reads through this port and the `finalize` group
//! writes fresh builds back. Expiry belongs to the store. The pipeline does
//! not lock or coalesce: two concurrent misses for the same key both rebuild
//! and both write, and the last write wins.

mod memory;

pub use memory::InMemoryPageCache;

use crate::context::{SpaParts, SpaRequest};
use crate::core::SpaDataModel;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Composite identity of a cached page.
///
/// Equality and hashing follow the store digest, so keys that differ only in
/// culture casing are the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheKey {
    /// Matched domain id.
    pub domain_id: i64,
    /// Normalized request path.
    pub path: String,
    /// Resolved culture.
    pub culture: String,
    /// Preview flag.
    pub preview: bool,
    /// Canonical requested parts.
    pub parts: String,
    digest: String,
}

impl CacheKey {
    /// Creates a key from its components. `path` is normalized.
    #[must_use]
    pub fn new(
        domain_id: i64,
        path: &str,
        culture: impl Into<String>,
        preview: bool,
        parts: &SpaParts,
    ) -> Self {
        let path = normalize_path(path);
        let culture = culture.into();
        let parts = parts.canonical();

        let combined = format!("{domain_id}|{path}|{}|{preview}|{parts}", culture.to_ascii_lowercase());
        let mut hasher = Sha256::new();
        hasher.update(combined.as_bytes());
        let digest = format!("spa:{}", hex::encode(&hasher.finalize()[..16]));

        Self {
            domain_id,
            path,
            culture,
            preview,
            parts,
            digest,
        }
    }

    /// Derives the key of a request. Returns `None` until a domain has been
    /// resolved.
    #[must_use]
    pub fn for_request(request: &SpaRequest) -> Option<Self> {
        let domain = request.domain()?;
        let culture = request.culture().unwrap_or(&domain.culture);
        Some(Self::new(
            domain.domain_id,
            request.path(),
            culture,
            request.is_preview(),
            request.parts(),
        ))
    }

    /// The hashed key string used by stores.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}

/// Normalizes a URL path for cache identity: query stripped, lowercased,
/// trailing separators removed, `/` for the root.
#[must_use]
pub fn normalize_path(url: &str) -> String {
    let path = url.split('?').next().unwrap_or_default().trim();
    let trimmed = path.trim_end_matches('/').to_lowercase();
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed
    } else {
        format!("/{trimmed}")
    }
}

/// A cached data model with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPage {
    /// The model as it was built.
    pub model: SpaDataModel,
    /// When the entry was written.
    pub cached_at: DateTime<Utc>,
    /// When the entry stops being served.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedPage {
    /// Wraps a freshly built model.
    #[must_use]
    pub fn new(model: SpaDataModel) -> Self {
        Self {
            model,
            cached_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Sets the expiry relative to `cached_at`.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.expires_at = Some(self.cached_at + ttl);
        self
    }

    /// Returns true if the entry has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

/// Read/write access to previously built pages.
///
/// Implementations must be safe for concurrent use by independent runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Looks up a page. `Ok(None)` is a miss.
    async fn try_get(&self, key: &CacheKey) -> anyhow::Result<Option<CachedPage>>;

    /// Stores a page, replacing any existing entry.
    async fn set(&self, key: &CacheKey, page: CachedPage) -> anyhow::Result<()>;

    /// Removes a single entry.
    async fn remove(&self, key: &CacheKey) -> anyhow::Result<()>;

    /// Removes every entry.
    async fn clear(&self) -> anyhow::Result<()>;
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}
