//! Per-request state shared by the stages of one pipeline run.

use super::{SpaApiPart, SpaParts};
use crate::cache::CacheKey;
use crate::core::{ContentNode, DomainMatch, SpaDataModel, SpaResponse};
use crate::errors::ContextError;
use std::sync::Arc;
use std::time::Instant;

/// Mutable state of a single SPA request.
///
/// Created by the transport layer, owned by exactly one pipeline run and
/// handed to every stage by `&mut`. Once a terminal response is set the
/// resolution fields are locked, and the data model can only be set once.
#[derive(Debug, Clone)]
pub struct SpaRequest {
    url: String,
    host: String,
    scheme: String,
    accept: Vec<String>,
    is_preview: bool,
    parts: SpaParts,
    domain: Option<DomainMatch>,
    content: Option<ContentNode>,
    culture: Option<String>,
    cache_key: Option<CacheKey>,
    response: Option<SpaResponse>,
    data_model: Option<Arc<SpaDataModel>>,
    started_at: Instant,
}

impl SpaRequest {
    /// Creates a request for the given URL (path plus optional query string).
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            host: String::new(),
            scheme: "https".to_string(),
            accept: Vec::new(),
            is_preview: false,
            parts: SpaParts::all(),
            domain: None,
            content: None,
            culture: None,
            cache_key: None,
            response: None,
            data_model: None,
            started_at: Instant::now(),
        }
    }

    /// Sets the host the request was made against.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the scheme (`http` / `https`).
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the media types accepted by the caller.
    #[must_use]
    pub fn with_accept(mut self, accept: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.accept = accept.into_iter().map(Into::into).collect();
        self
    }

    /// Flags the request as a preview request.
    #[must_use]
    pub fn with_preview(mut self, is_preview: bool) -> Self {
        self.is_preview = is_preview;
        self
    }

    /// Sets the requested parts.
    #[must_use]
    pub fn with_parts(mut self, parts: SpaParts) -> Self {
        self.parts = parts;
        self
    }

    /// Raw requested URL, including the query string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path portion of the URL (everything before `?`).
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    /// Host of the request.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Scheme of the request.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Media types accepted by the caller.
    #[must_use]
    pub fn accept(&self) -> &[String] {
        &self.accept
    }

    /// Returns true if the caller accepts `media_type`.
    ///
    /// Entries may be raw `Accept` header values listing several
    /// comma-separated types with parameters.
    #[must_use]
    pub fn accepts(&self, media_type: &str) -> bool {
        self.accept
            .iter()
            .flat_map(|header| header.split(','))
            .filter_map(|entry| entry.split(';').next())
            .any(|t| t.trim().eq_ignore_ascii_case(media_type))
    }

    /// Whether this is a preview request.
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.is_preview
    }

    /// The requested parts.
    #[must_use]
    pub fn parts(&self) -> &SpaParts {
        &self.parts
    }

    /// Returns true if `part` was requested.
    #[must_use]
    pub fn is_part_requested(&self, part: SpaApiPart) -> bool {
        self.parts.contains(part)
    }

    /// The resolved domain, if any.
    #[must_use]
    pub fn domain(&self) -> Option<&DomainMatch> {
        self.domain.as_ref()
    }

    /// The resolved site id, if any.
    #[must_use]
    pub fn site_id(&self) -> Option<i64> {
        self.domain.as_ref().map(|d| d.site_id)
    }

    /// The resolved content node, if any.
    #[must_use]
    pub fn content(&self) -> Option<&ContentNode> {
        self.content.as_ref()
    }

    /// The resolved content id, if any.
    #[must_use]
    pub fn content_id(&self) -> Option<i64> {
        self.content.as_ref().map(|c| c.id)
    }

    /// The resolved culture, if any.
    #[must_use]
    pub fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    /// The cache key derived for this request, if any.
    #[must_use]
    pub fn cache_key(&self) -> Option<&CacheKey> {
        self.cache_key.as_ref()
    }

    /// The terminal response, if any.
    #[must_use]
    pub fn response(&self) -> Option<&SpaResponse> {
        self.response.as_ref()
    }

    /// Returns true once a terminal response has been set.
    #[must_use]
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// The built data model, if any.
    #[must_use]
    pub fn data_model(&self) -> Option<&Arc<SpaDataModel>> {
        self.data_model.as_ref()
    }

    /// Sets the resolved domain. The domain's culture becomes the request
    /// culture unless one was already resolved.
    pub fn set_domain(&mut self, domain: DomainMatch) -> Result<(), ContextError> {
        self.ensure_unlocked("domain")?;
        if self.culture.is_none() {
            self.culture = Some(domain.culture.clone());
        }
        self.domain = Some(domain);
        Ok(())
    }

    /// Sets the resolved content node.
    pub fn set_content(&mut self, content: ContentNode) -> Result<(), ContextError> {
        self.ensure_unlocked("content")?;
        self.content = Some(content);
        Ok(())
    }

    /// Overrides the resolved culture.
    pub fn set_culture(&mut self, culture: impl Into<String>) -> Result<(), ContextError> {
        self.ensure_unlocked("culture")?;
        self.culture = Some(culture.into());
        Ok(())
    }

    /// Stores the derived cache key.
    pub fn set_cache_key(&mut self, key: CacheKey) -> Result<(), ContextError> {
        self.ensure_unlocked("cache_key")?;
        self.cache_key = Some(key);
        Ok(())
    }

    /// Sets the terminal response. Only one terminal response is allowed.
    pub fn set_response(&mut self, response: SpaResponse) -> Result<(), ContextError> {
        if self.response.is_some() {
            return Err(ContextError::ResponseAlreadySet);
        }
        self.response = Some(response);
        Ok(())
    }

    /// Sets the built data model.
    pub fn set_data_model(&mut self, model: impl Into<Arc<SpaDataModel>>) -> Result<(), ContextError> {
        if self.response.is_some() {
            return Err(ContextError::DataModelAfterResponse);
        }
        if self.data_model.is_some() {
            return Err(ContextError::DataModelAlreadySet);
        }
        self.data_model = Some(model.into());
        Ok(())
    }

    /// Resets the execution timer. Called on pipeline entry.
    pub fn mark_started(&mut self) {
        self.started_at = Instant::now();
    }

    /// Milliseconds since pipeline entry.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        i64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    fn ensure_unlocked(&self, field: &'static str) -> Result<(), ContextError> {
        if self.response.is_some() {
            Err(ContextError::ResolutionLocked { field })
        } else {
            Ok(())
        }
    }
}
