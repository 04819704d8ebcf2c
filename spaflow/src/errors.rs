//! Error types for the spaflow pipeline.
//!
//! Resolution failures (unknown domain, missing page, redirects) are not
//! errors: stages express them as terminal responses on the request. The
//! types here cover genuine failures only.

use std::collections::HashMap;
use thiserror::Error;

/// A stage failed while the pipeline was running.
///
/// Carries the provenance of the failure (group and stage) together with the
/// original cause, which is kept as-is so callers can downcast it.
#[derive(Debug, Error)]
#[error("Stage '{stage}' in action group '{group}' failed: {cause}")]
pub struct PipelineError {
    /// Name of the action group that was executing.
    pub group: String,
    /// Name of the stage that failed.
    pub stage: String,
    /// The underlying cause.
    #[source]
    pub cause: anyhow::Error,
}

impl PipelineError {
    /// Creates a new pipeline error.
    #[must_use]
    pub fn new(group: impl Into<String>, stage: impl Into<String>, cause: anyhow::Error) -> Self {
        Self {
            group: group.into(),
            stage: stage.into(),
            cause,
        }
    }

    /// Returns the cause chain rendered as one message per line.
    #[must_use]
    pub fn cause_chain(&self) -> Vec<String> {
        self.cause.chain().map(ToString::to_string).collect()
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("group".to_string(), serde_json::json!(self.group));
        map.insert("stage".to_string(), serde_json::json!(self.stage));
        map.insert("message".to_string(), serde_json::json!(self.cause.to_string()));
        map.insert("chain".to_string(), serde_json::json!(self.cause_chain()));
        map
    }
}

/// Raised by a stage that panicked instead of returning an error.
#[derive(Debug, Clone, Error)]
#[error("Stage panicked: {message}")]
pub struct StagePanic {
    /// The panic payload, when it was a string.
    pub message: String,
}

impl StagePanic {
    /// Builds a panic error from a `catch_unwind` payload.
    #[must_use]
    pub fn from_payload(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self { message }
    }
}

/// Invariant violations on a [`SpaRequest`](crate::context::SpaRequest).
///
/// These are programming errors in a stage. They surface through the stage's
/// `Result` and are wrapped into a [`PipelineError`] like any other failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// A resolution field was written after a terminal response was set.
    #[error("Cannot update '{field}': the request already has a terminal response")]
    ResolutionLocked {
        /// The field that was being written.
        field: &'static str,
    },

    /// A second terminal response was set.
    #[error("The request already has a terminal response")]
    ResponseAlreadySet,

    /// A data model was set after a terminal response.
    #[error("Cannot set the data model: the request already has a terminal response")]
    DataModelAfterResponse,

    /// The data model is immutable once built.
    #[error("The data model has already been built")]
    DataModelAlreadySet,
}

/// Error raised when a pipeline definition is invalid.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// Error code (e.g. `PIPELINE-EMPTY`).
    pub code: String,
    /// The error message.
    pub message: String,
    /// The groups involved in the error.
    pub groups: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            groups: Vec::new(),
        }
    }

    /// Sets the groups involved.
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path of the config file.
        path: String,
        /// The IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`SpaConfig`](crate::config::SpaConfig).
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// An environment override had an invalid value.
    #[error("Invalid value '{value}' for {key}")]
    InvalidEnv {
        /// The environment variable name.
        key: String,
        /// The rejected value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Error)]
    #[error("boom {0}")]
    struct Boom(u32);

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::new("build", "content_lookup", anyhow::anyhow!("db down"));
        let msg = err.to_string();
        assert!(msg.contains("build"));
        assert!(msg.contains("content_lookup"));
        assert!(msg.contains("db down"));
    }

    #[test]
    fn test_pipeline_error_keeps_cause() {
        let err = PipelineError::new("setup", "read_from_cache", anyhow::Error::new(Boom(7)));
        assert_eq!(err.cause.downcast_ref::<Boom>(), Some(&Boom(7)));
    }

    #[test]
    fn test_pipeline_error_to_dict() {
        let cause = anyhow::anyhow!("inner").context("outer");
        let err = PipelineError::new("g", "s", cause);
        let dict = err.to_dict();

        assert_eq!(dict.get("group").unwrap(), "g");
        assert_eq!(dict.get("chain").unwrap(), &serde_json::json!(["outer", "inner"]));
    }

    #[test]
    fn test_stage_panic_payloads() {
        let p = StagePanic::from_payload(&"static message");
        assert_eq!(p.message, "static message");

        let p = StagePanic::from_payload(&String::from("owned"));
        assert_eq!(p.message, "owned");

        let p = StagePanic::from_payload(&42_u8);
        assert_eq!(p.message, "unknown panic payload");
    }

    #[test]
    fn test_context_error_messages() {
        let err = ContextError::ResolutionLocked { field: "culture" };
        assert!(err.to_string().contains("culture"));
    }
}
