//! Page metadata for content models.
//!
//! [`SpaMetaData`] serializes to the shape vue-meta expects:
//!
//! ```json
//! {
//!   "title": "About",
//!   "meta": [{ "name": "description", "content": "..." }, { "property": "og:title", "content": "About" }],
//!   "link": [{ "rel": "canonical", "href": "https://example.com/about/" }],
//!   "script": [],
//!   "__dangerouslyDisableSanitizers": []
//! }
//! ```

mod memo;
mod open_graph;
mod twitter;

pub use memo::Memo;
pub use open_graph::{OpenGraphImage, OpenGraphProperties};
pub use twitter::{TwitterCardKind, TwitterSummaryCard};

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// A `<meta name content>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaContent {
    /// The `name` attribute.
    pub name: String,
    /// The `content` attribute.
    pub content: String,
}

impl MetaContent {
    /// Creates an entry.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub(crate) fn push(meta: &mut Vec<Self>, name: &str, content: Option<&str>) {
        if let Some(content) = content.filter(|c| !c.is_empty()) {
            meta.push(Self::new(name, content));
        }
    }
}

/// A `<meta property content>` entry, as used by Open Graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaProperty {
    /// The `property` attribute.
    pub property: String,
    /// The `content` attribute.
    pub content: String,
}

impl MetaProperty {
    pub(crate) fn push(meta: &mut Vec<Self>, property: &str, content: Option<&str>) {
        if let Some(content) = content.filter(|c| !c.is_empty()) {
            meta.push(Self {
                property: property.to_string(),
                content: content.to_string(),
            });
        }
    }
}

/// A `<link>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetaLink {
    /// `rel`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    /// `href`.
    pub href: String,
    /// `type`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// `media`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    /// `sizes`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
}

impl MetaLink {
    /// Creates a link with a `rel` and an `href`.
    #[must_use]
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: Some(rel.into()),
            href: href.into(),
            ..Self::default()
        }
    }
}

/// A `<script>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaScript {
    /// `src`.
    pub src: String,
    /// `type`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub script_type: Option<String>,
}

/// Metadata of a page.
///
/// Open Graph and Twitter card data are produced on first access.
#[derive(Debug, Default)]
pub struct SpaMetaData {
    /// Page title.
    pub title: String,
    /// Meta description.
    pub description: Option<String>,
    /// Robots directive.
    pub robots: Option<String>,
    /// Canonical URL, rendered as the first link.
    pub canonical: Option<String>,
    /// Additional `<link>` elements.
    pub links: Vec<MetaLink>,
    /// `<script>` elements.
    pub scripts: Vec<MetaScript>,
    open_graph: Memo<Option<OpenGraphProperties>>,
    twitter: Memo<Option<TwitterSummaryCard>>,
}

impl SpaMetaData {
    /// Creates metadata with a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the robots directive.
    #[must_use]
    pub fn with_robots(mut self, robots: impl Into<String>) -> Self {
        self.robots = Some(robots.into());
        self
    }

    /// Sets the canonical URL.
    #[must_use]
    pub fn with_canonical(mut self, href: impl Into<String>) -> Self {
        self.canonical = Some(href.into());
        self
    }

    /// Appends a link.
    #[must_use]
    pub fn with_link(mut self, link: MetaLink) -> Self {
        self.links.push(link);
        self
    }

    /// Appends a script.
    #[must_use]
    pub fn with_script(mut self, src: impl Into<String>, script_type: Option<String>) -> Self {
        self.scripts.push(MetaScript {
            src: src.into(),
            script_type,
        });
        self
    }

    /// Uses fixed Open Graph properties.
    #[must_use]
    pub fn with_open_graph(self, open_graph: OpenGraphProperties) -> Self {
        self.with_open_graph_from(move || Some(open_graph.clone()))
    }

    /// Derives the Open Graph properties with `f` on first access.
    #[must_use]
    pub fn with_open_graph_from<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Option<OpenGraphProperties> + Send + Sync + 'static,
    {
        self.open_graph = Memo::new(f);
        self
    }

    /// Uses a fixed Twitter card.
    #[must_use]
    pub fn with_twitter_card(self, card: TwitterSummaryCard) -> Self {
        self.with_twitter_card_from(move || Some(card.clone()))
    }

    /// Derives the Twitter card with `f` on first access.
    #[must_use]
    pub fn with_twitter_card_from<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Option<TwitterSummaryCard> + Send + Sync + 'static,
    {
        self.twitter = Memo::new(f);
        self
    }

    /// The Open Graph properties, if any.
    pub fn open_graph(&self) -> Option<&OpenGraphProperties> {
        self.open_graph.get().as_ref()
    }

    /// The Twitter card, if any.
    pub fn twitter_card(&self) -> Option<&TwitterSummaryCard> {
        self.twitter.get().as_ref()
    }

    /// Whether the page has a Twitter card.
    pub fn has_twitter_card(&self) -> bool {
        self.twitter_card().is_some()
    }

    /// Element types vue-meta must not sanitize.
    #[must_use]
    pub fn dangerously_disable_sanitizers(&self) -> Vec<&'static str> {
        if self.scripts.is_empty() {
            Vec::new()
        } else {
            vec!["script"]
        }
    }

    /// Renders the vue-meta JSON object.
    pub fn to_json(&self) -> Value {
        let mut meta: Vec<Value> = Vec::new();
        let mut named = Vec::new();
        MetaContent::push(&mut named, "description", self.description.as_deref());
        MetaContent::push(&mut named, "robots", self.robots.as_deref());
        meta.extend(named.into_iter().map(|m| json!(m)));

        if let Some(og) = self.open_graph() {
            meta.extend(og.to_meta().into_iter().map(|m| json!(m)));
        }
        if let Some(card) = self.twitter_card() {
            meta.extend(card.to_meta().into_iter().map(|m| json!(m)));
        }

        let mut links = Vec::with_capacity(self.links.len() + 1);
        if let Some(canonical) = &self.canonical {
            links.push(MetaLink::new("canonical", canonical.clone()));
        }
        links.extend(self.links.iter().cloned());

        json!({
            "title": self.title,
            "meta": meta,
            "link": links,
            "script": self.scripts,
            "__dangerouslyDisableSanitizers": self.dangerously_disable_sanitizers(),
        })
    }
}

impl Serialize for SpaMetaData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
