//! Mapping between HTTP-ish requests and the pipeline.
//!
//! The frontend calls the API with the page URL in the `url` query parameter,
//! optionally narrowing the result with `parts` and asking for unpublished
//! content with `preview`.

use crate::config::SpaConfig;
use crate::context::{SpaParts, SpaRequest};
use crate::core::SpaResponse;
use crate::errors::{PipelineError, PipelineValidationError};
use crate::events::EventSink;
use crate::pipeline::SpaPipeline;
use crate::stages::SpaServices;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderValue, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info_span, warn, Instrument};

/// An API request as received from the web layer.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    /// Host the API was called on.
    pub host: String,
    /// `http` or `https`.
    pub scheme: String,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Accepted media types.
    pub accept: Vec<String>,
}

impl InboundRequest {
    /// Creates a request for `host` with no parameters.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            scheme: "https".to_string(),
            ..Self::default()
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds an accepted media type.
    #[must_use]
    pub fn with_accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept.push(media_type.into());
        self
    }

    /// Adds every media type listed in a raw `Accept` header.
    #[must_use]
    pub fn with_accept_header(mut self, header: &str) -> Self {
        self.accept.extend(
            header
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ToString::to_string),
        );
        self
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The page URL. Defaults to `/`.
    #[must_use]
    pub fn page_url(&self) -> String {
        match self.param("url").map(str::trim) {
            None | Some("") => "/".to_string(),
            Some(url) if url.starts_with('/') => url.to_string(),
            Some(url) => format!("/{url}"),
        }
    }

    /// Whether preview was requested via `preview` or `umbpreview`.
    #[must_use]
    pub fn is_preview(&self) -> bool {
        ["preview", "umbpreview"]
            .iter()
            .filter_map(|key| self.param(key))
            .any(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
    }

    /// Builds the pipeline request.
    #[must_use]
    pub fn to_spa_request(&self) -> SpaRequest {
        let scheme: &str = if self.scheme.is_empty() { "https" } else { &self.scheme };
        SpaRequest::new(self.page_url())
            .with_host(self.host.clone())
            .with_scheme(scheme)
            .with_accept(self.accept.iter().cloned())
            .with_preview(self.is_preview())
            .with_parts(SpaParts::parse(self.param("parts")))
    }
}

/// A response ready to be written by the web layer.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    /// Status code.
    pub status: StatusCode,
    /// Headers (`Content-Type`, and `Location` for real redirects).
    pub headers: HeaderMap,
    /// Serialized body.
    pub body: String,
}

impl OutboundResponse {
    /// Converts a pipeline response.
    ///
    /// With `overwrite_status_codes`, redirects and not-found responses are
    /// sent as 200 without a `Location` header so the frontend can handle
    /// them from the body.
    #[must_use]
    pub fn from_response(response: &SpaResponse, overwrite_status_codes: bool) -> Self {
        let overwrite = overwrite_status_codes && (response.is_redirect() || response.is_not_found());
        let status = if overwrite { StatusCode::OK } else { response.status() };

        let (status, body, content_type) = match response.body().render() {
            Ok(body) => (status, body, response.body().content_type()),
            Err(err) => {
                warn!(error = %err, "Failed to serialize response body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    r#"{"meta":{"code":500,"error":"Failed to serialize response"}}"#.to_string(),
                    "application/json; charset=utf-8",
                )
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        if !overwrite {
            if let Some(location) = response.location() {
                match HeaderValue::from_str(location) {
                    Ok(value) => {
                        headers.insert(LOCATION, value);
                    }
                    Err(_) => warn!(location, "Dropping invalid Location header"),
                }
            }
        }

        Self {
            status,
            headers,
            body,
        }
    }

    /// The response for a failure the error reporter did not handle.
    ///
    /// The body carries a generic message; the failure details stay in the
    /// logs.
    #[must_use]
    pub fn from_error(error: &PipelineError) -> Self {
        error!(group = %error.group, stage = %error.stage, error = %error, "Request failed");
        Self::from_response(&SpaResponse::error("An error occurred while handling the request"), false)
    }

    /// The `Location` header, if set.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Serves API requests through a pipeline.
#[derive(Debug, Clone)]
pub struct SpaHandler {
    pipeline: Arc<SpaPipeline>,
    config: SpaConfig,
}

impl SpaHandler {
    /// Creates a handler around an existing pipeline.
    #[must_use]
    pub fn new(pipeline: Arc<SpaPipeline>, config: SpaConfig) -> Self {
        Self { pipeline, config }
    }

    /// Creates a handler with the standard pipeline.
    pub fn standard(
        services: &SpaServices,
        config: SpaConfig,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, PipelineValidationError> {
        let pipeline = SpaPipeline::standard(services, &config, events)?;
        Ok(Self::new(Arc::new(pipeline), config))
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SpaConfig {
        &self.config
    }

    /// Handles one API request.
    pub async fn handle(&self, inbound: &InboundRequest) -> Result<OutboundResponse, PipelineError> {
        let mut request = inbound.to_spa_request();
        let span = info_span!(
            "spa_request",
            host = %request.host(),
            url = %request.url(),
            preview = request.is_preview(),
        );

        let response = self.pipeline.run(&mut request).instrument(span).await?;
        Ok(OutboundResponse::from_response(&response, self.config.overwrite_status_codes))
    }

    /// Handles one API request, answering unhandled failures with a 500.
    pub async fn respond(&self, inbound: &InboundRequest) -> OutboundResponse {
        match self.handle(inbound).await {
            Ok(response) => response,
            Err(err) => OutboundResponse::from_error(&err),
        }
    }
}
