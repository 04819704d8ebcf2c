//! Values produced by the external resolvers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resolved page (or site root) from the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Numeric id of the node.
    pub id: i64,
    /// Stable key of the node.
    pub key: Uuid,
    /// Display name.
    pub name: String,
    /// Depth in the content tree (site roots are level 1).
    pub level: u32,
    /// Relative URL of the node.
    pub url: String,
    /// Alias of the document type.
    pub content_type: String,
    /// Raw property values.
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl ContentNode {
    /// Creates a node with no properties.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            key: Uuid::new_v4(),
            name: name.into(),
            level: 1,
            url: url.into(),
            content_type: String::new(),
            properties: serde_json::Map::new(),
        }
    }

    /// Sets the key.
    #[must_use]
    pub fn with_key(mut self, key: Uuid) -> Self {
        self.key = key;
        self
    }

    /// Sets the level.
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Sets the document type alias.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Adds a property value.
    #[must_use]
    pub fn with_property(mut self, alias: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(alias.into(), value);
        self
    }

    /// Returns a property as a string, if present and a string.
    #[must_use]
    pub fn string_property(&self, alias: &str) -> Option<&str> {
        self.properties.get(alias).and_then(serde_json::Value::as_str)
    }
}

/// Result of matching a request against the configured domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainMatch {
    /// Id of the matched domain record.
    pub domain_id: i64,
    /// Id of the site root the domain points to.
    pub site_id: i64,
    /// Culture bound to the domain, e.g. `en-US`.
    pub culture: String,
}

impl DomainMatch {
    /// Creates a new domain match.
    #[must_use]
    pub fn new(domain_id: i64, site_id: i64, culture: impl Into<String>) -> Self {
        Self {
            domain_id,
            site_id,
            culture: culture.into(),
        }
    }
}

/// Destination of an outbound redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    /// URL to redirect to.
    pub url: String,
    /// Permanent (301) or temporary (307).
    pub permanent: bool,
}

impl RedirectTarget {
    /// A permanent redirect.
    #[must_use]
    pub fn permanent(url: impl Into<String>) -> Self {
        Self { url: url.into(), permanent: true }
    }

    /// A temporary redirect.
    #[must_use]
    pub fn temporary(url: impl Into<String>) -> Self {
        Self { url: url.into(), permanent: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_node_serializes_identity_first() {
        let node = ContentNode::new(1234, "About", "/about/")
            .with_key(Uuid::nil())
            .with_level(2)
            .with_content_type("textPage");

        let json = serde_json::to_string(&node).unwrap();
        assert!(json.starts_with(r#"{"id":1234,"key":"00000000-0000-0000-0000-000000000000","name":"About","level":2,"url":"/about/""#));
        assert!(json.contains(r#""contentType":"textPage""#));
    }

    #[test]
    fn test_string_property() {
        let node = ContentNode::new(1, "Home", "/")
            .with_property("title", serde_json::json!("Welcome"))
            .with_property("count", serde_json::json!(3));

        assert_eq!(node.string_property("title"), Some("Welcome"));
        assert_eq!(node.string_property("count"), None);
        assert_eq!(node.string_property("missing"), None);
    }
}
