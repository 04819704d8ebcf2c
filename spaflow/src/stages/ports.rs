//! Ports - the external collaborators injected into the standard stages.
//!
//! Stages receive the ports they need when they are constructed; the request
//! itself is passed to every call. Nothing is looked up from ambient state.

use crate::cache::PageCache;
use crate::context::SpaRequest;
use crate::core::{ContentNode, DomainMatch, RedirectTarget};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Matches a request against the configured domains.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainResolver: Send + Sync {
    /// Resolves the domain and culture for `host` + `url`. `Ok(None)` when no
    /// domain matches.
    async fn resolve(&self, host: &str, url: &str) -> anyhow::Result<Option<DomainMatch>>;
}

/// Looks up pages in the content tree.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Finds the page at `path` for `culture`.
    async fn lookup(&self, path: &str, culture: &str) -> anyhow::Result<Option<ContentNode>>;

    /// Finds a page by id, used for preview requests.
    async fn get_by_id(&self, id: i64, culture: &str) -> anyhow::Result<Option<ContentNode>>;
}

/// Looks up outbound redirects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedirectLookup: Send + Sync {
    /// Returns the redirect configured for `url`, if any.
    async fn match_outbound(&self, url: &str) -> anyhow::Result<Option<RedirectTarget>>;
}

/// Builds one section of the data model.
pub trait ModelBuilder: Send + Sync {
    /// Builds the section for `node` in the context of `request`.
    fn build(&self, node: &ContentNode, request: &SpaRequest) -> anyhow::Result<serde_json::Value>;
}

impl<F> ModelBuilder for F
where
    F: Fn(&ContentNode, &SpaRequest) -> anyhow::Result<serde_json::Value> + Send + Sync,
{
    fn build(&self, node: &ContentNode, request: &SpaRequest) -> anyhow::Result<serde_json::Value> {
        self(node, request)
    }
}

/// Content-change token stamped on every data model.
///
/// Rotate it after publishing so frontends know to reload.
#[derive(Debug)]
pub struct ContentToken {
    current: RwLock<Uuid>,
}

impl Default for ContentToken {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentToken {
    /// Creates a token with a random initial value.
    #[must_use]
    pub fn new() -> Self {
        Self::fixed(Uuid::new_v4())
    }

    /// Creates a token with a known value.
    #[must_use]
    pub fn fixed(value: Uuid) -> Self {
        Self {
            current: RwLock::new(value),
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn current(&self) -> Uuid {
        *self.current.read()
    }

    /// Replaces the value with a new random one and returns it.
    pub fn rotate(&self) -> Uuid {
        let next = Uuid::new_v4();
        *self.current.write() = next;
        next
    }
}

/// Every collaborator the standard stages need.
#[derive(Clone)]
pub struct SpaServices {
    /// Domain and culture resolution.
    pub domains: Arc<dyn DomainResolver>,
    /// Content tree lookup.
    pub content: Arc<dyn ContentResolver>,
    /// Outbound redirect table.
    pub redirects: Arc<dyn RedirectLookup>,
    /// Store of previously built models.
    pub cache: Arc<dyn PageCache>,
    /// Builder of the `site` section.
    pub site_model: Arc<dyn ModelBuilder>,
    /// Builder of the `navigation` section.
    pub navigation_model: Arc<dyn ModelBuilder>,
    /// Builder of the `content` section.
    pub content_model: Arc<dyn ModelBuilder>,
    /// Content-change token.
    pub content_token: Arc<ContentToken>,
}

impl std::fmt::Debug for SpaServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaServices")
            .field("content_token", &self.content_token.current())
            .finish_non_exhaustive()
    }
}
