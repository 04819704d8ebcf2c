//! The SPA data model returned by a successful request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Main object of a page data response.
///
/// Identity and timing fields come first; the `site`, `navigation` and
/// `content` sections are only present when the caller requested them and
/// are omitted from the JSON otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaDataModel {
    /// Id of the current page, or `-1`.
    pub page_id: i64,
    /// Id of the current site, or `-1`.
    pub site_id: i64,
    /// Content-change token. The frontend reloads when it changes.
    pub content_guid: Uuid,
    /// Time spent building the response, `-1` until filled in.
    pub execute_time_ms: i64,
    /// Whether the model was served from the cache.
    #[serde(rename = "cached", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_cached: bool,
    /// Site section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<serde_json::Value>,
    /// Navigation section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<serde_json::Value>,
    /// Content section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

impl SpaDataModel {
    /// Creates an empty model for a page.
    #[must_use]
    pub fn new(page_id: i64, site_id: i64, content_guid: Uuid) -> Self {
        Self {
            page_id,
            site_id,
            content_guid,
            execute_time_ms: -1,
            is_cached: false,
            site: None,
            navigation: None,
            content: None,
        }
    }

    /// Sets the site section.
    #[must_use]
    pub fn with_site(mut self, site: serde_json::Value) -> Self {
        self.site = Some(site);
        self
    }

    /// Sets the navigation section.
    #[must_use]
    pub fn with_navigation(mut self, navigation: serde_json::Value) -> Self {
        self.navigation = Some(navigation);
        self
    }

    /// Sets the content section.
    #[must_use]
    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = Some(content);
        self
    }

    /// Returns a copy flagged as served from the cache.
    #[must_use]
    pub fn as_cached(&self) -> Self {
        Self {
            is_cached: true,
            ..self.clone()
        }
    }

    /// Returns a copy carrying the given execution time.
    #[must_use]
    pub fn with_execute_time(&self, execute_time_ms: i64) -> Self {
        Self {
            execute_time_ms,
            ..self.clone()
        }
    }
}
