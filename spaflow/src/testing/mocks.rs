//! Mock stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;

use crate::context::SpaRequest;
use crate::core::SpaResponse;
use crate::stages::Stage;

/// A stage that does nothing but record the URLs it was called with.
#[derive(Debug)]
pub struct SpyStage {
    name: String,
    calls: Mutex<Vec<String>>,
}

impl SpyStage {
    /// Creates a new spy stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the request URLs from each call.
    #[must_use]
    pub fn recorded_urls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl Stage for SpyStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        self.calls.lock().push(request.url().to_string());
        Ok(())
    }
}

/// A stage that always fails.
pub struct FailingStage {
    name: String,
    error: Box<dyn Fn() -> anyhow::Error + Send + Sync>,
}

impl FailingStage {
    /// Creates a stage failing with a plain message.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::with_error(name, move || anyhow::anyhow!(message.clone()))
    }

    /// Creates a stage failing with the error produced by `error`.
    #[must_use]
    pub fn with_error<F>(name: impl Into<String>, error: F) -> Self
    where
        F: Fn() -> anyhow::Error + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            error: Box::new(error),
        }
    }
}

impl fmt::Debug for FailingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailingStage").field("name", &self.name).finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _request: &mut SpaRequest) -> anyhow::Result<()> {
        Err((self.error)())
    }
}

/// A stage that panics.
#[derive(Debug)]
pub struct PanickingStage {
    name: String,
    message: String,
}

impl PanickingStage {
    /// Creates a new panicking stage.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Stage for PanickingStage {
    fn name(&self) -> &str {
        &self.name
    }

    #[allow(clippy::panic)]
    async fn execute(&self, _request: &mut SpaRequest) -> anyhow::Result<()> {
        panic!("{}", self.message)
    }
}

/// A stage that sets a fixed terminal response.
#[derive(Debug)]
pub struct RespondingStage {
    name: String,
    response: SpaResponse,
}

impl RespondingStage {
    /// Creates a stage that responds with `response`.
    #[must_use]
    pub fn new(name: impl Into<String>, response: SpaResponse) -> Self {
        Self {
            name: name.into(),
            response,
        }
    }
}

#[async_trait]
impl Stage for RespondingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        request.set_response(self.response.clone())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spy_stage_records_calls() {
        let spy = SpyStage::new("spy");
        spy.execute(&mut SpaRequest::new("/a/")).await.unwrap();
        spy.execute(&mut SpaRequest::new("/b/")).await.unwrap();

        assert_eq!(spy.call_count(), 2);
        assert_eq!(spy.recorded_urls(), vec!["/a/", "/b/"]);

        spy.reset();
        assert_eq!(spy.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_stage() {
        let stage = FailingStage::new("broken", "database unavailable");
        let err = stage.execute(&mut SpaRequest::new("/")).await.unwrap_err();
        assert_eq!(err.to_string(), "database unavailable");
    }

    #[tokio::test]
    async fn test_responding_stage() {
        let stage = RespondingStage::new("gone", SpaResponse::not_found("gone"));
        let mut request = SpaRequest::new("/");
        stage.execute(&mut request).await.unwrap();
        assert!(request.response().unwrap().is_not_found());
    }
}
