//! Stage trait and implementations.
//!
//! A stage is a named unit of work over a [`SpaRequest`]. It may resolve
//! values onto the request, set a terminal response to end the pipeline, or
//! fail. Stages are stateless with respect to a single request and are shared
//! across requests.

mod ports;
mod standard;
mod url;

pub use ports::{
    ContentResolver, ContentToken, DomainResolver, ModelBuilder, RedirectLookup, SpaServices,
};
pub use standard::{
    ContentLookup, FindDomainAndCulture, InitModels, NotFound, OutboundRedirects, PushToCache,
    ReadFromCache,
};
pub use url::{AddTrailingSlash, RemoveTrailingSlash};

#[cfg(test)]
pub use ports::{MockContentResolver, MockDomainResolver, MockRedirectLookup};

use crate::context::SpaRequest;
use async_trait::async_trait;
use std::fmt::Debug;

/// A single named unit of pipeline work.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Executes the stage.
    ///
    /// Returning `Err` aborts the pipeline run. Intentional early exits
    /// (redirects, not found) are expressed with
    /// [`SpaRequest::set_response`] and `Ok(())`.
    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()>;
}

/// A stage backed by a synchronous closure.
pub struct FnStage<F>
where
    F: Fn(&mut SpaRequest) -> anyhow::Result<()> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&mut SpaRequest) -> anyhow::Result<()> + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(&mut SpaRequest) -> anyhow::Result<()> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(&mut SpaRequest) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        (self.func)(request)
    }
}

/// A stage that does nothing.
#[derive(Debug, Clone)]
pub struct NoOpStage {
    name: String,
}

impl NoOpStage {
    /// Creates a new no-op stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Stage for NoOpStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _request: &mut SpaRequest) -> anyhow::Result<()> {
        Ok(())
    }
}
