//! An in-memory site for pipeline tests and benchmarks.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::{normalize_path, InMemoryPageCache};
use crate::context::SpaRequest;
use crate::core::{ContentNode, DomainMatch, RedirectTarget};
use crate::meta::{OpenGraphProperties, SpaMetaData};
use crate::stages::{
    ContentResolver, ContentToken, DomainResolver, ModelBuilder, RedirectLookup, SpaServices,
};

/// Host the default site answers on.
pub const TEST_HOST: &str = "example.com";

/// Resolves domains from a host table. A `*` entry matches any host.
#[derive(Debug, Default)]
pub struct StaticDomainResolver {
    hosts: HashMap<String, DomainMatch>,
}

impl StaticDomainResolver {
    /// Adds a host.
    #[must_use]
    pub fn with_host(mut self, host: &str, domain: DomainMatch) -> Self {
        self.hosts.insert(host.to_ascii_lowercase(), domain);
        self
    }
}

#[async_trait]
impl DomainResolver for StaticDomainResolver {
    async fn resolve(&self, host: &str, _url: &str) -> anyhow::Result<Option<DomainMatch>> {
        Ok(self
            .hosts
            .get(&host.to_ascii_lowercase())
            .or_else(|| self.hosts.get("*"))
            .cloned())
    }
}

/// Serves pages from a path table. Culture is ignored.
#[derive(Debug, Default)]
pub struct StaticContentResolver {
    pages: HashMap<String, ContentNode>,
}

impl StaticContentResolver {
    /// Adds a page under its own URL.
    #[must_use]
    pub fn with_page(mut self, node: ContentNode) -> Self {
        self.pages.insert(normalize_path(&node.url), node);
        self
    }
}

#[async_trait]
impl ContentResolver for StaticContentResolver {
    async fn lookup(&self, path: &str, _culture: &str) -> anyhow::Result<Option<ContentNode>> {
        Ok(self.pages.get(&normalize_path(path)).cloned())
    }

    async fn get_by_id(&self, id: i64, _culture: &str) -> anyhow::Result<Option<ContentNode>> {
        Ok(self.pages.values().find(|node| node.id == id).cloned())
    }
}

/// Redirects from a path table.
#[derive(Debug, Default)]
pub struct StaticRedirectLookup {
    redirects: HashMap<String, RedirectTarget>,
}

impl StaticRedirectLookup {
    /// Adds a redirect from `path`.
    #[must_use]
    pub fn with_redirect(mut self, path: &str, target: RedirectTarget) -> Self {
        self.redirects.insert(normalize_path(path), target);
        self
    }
}

#[async_trait]
impl RedirectLookup for StaticRedirectLookup {
    async fn match_outbound(&self, url: &str) -> anyhow::Result<Option<RedirectTarget>> {
        Ok(self.redirects.get(&normalize_path(url)).cloned())
    }
}

/// A small site on [`TEST_HOST`]: `/`, `/about/`, `/contact/` and a
/// permanent redirect from `/old-about/` to `/about/`.
///
/// The content token is fixed to the nil UUID so built models compare equal
/// across runs.
#[derive(Debug)]
pub struct TestSite {
    cache: Arc<InMemoryPageCache>,
    content_builds: Arc<AtomicUsize>,
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSite {
    /// Creates the site with a cache that never expires.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cache(InMemoryPageCache::new())
    }

    /// Creates the site around a specific cache.
    #[must_use]
    pub fn with_cache(cache: InMemoryPageCache) -> Self {
        Self {
            cache: Arc::new(cache),
            content_builds: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The shared cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<InMemoryPageCache> {
        &self.cache
    }

    /// How many times the content model has been built.
    #[must_use]
    pub fn content_builds(&self) -> usize {
        self.content_builds.load(Ordering::SeqCst)
    }

    /// A request for `url` on the test host, accepting JSON.
    #[must_use]
    pub fn request(url: &str) -> SpaRequest {
        SpaRequest::new(url)
            .with_host(TEST_HOST)
            .with_accept(["application/json"])
    }

    /// The pages of the site.
    #[must_use]
    pub fn pages() -> Vec<ContentNode> {
        vec![
            ContentNode::new(1001, "Home", "/")
                .with_key(Uuid::from_u128(1001))
                .with_content_type("home")
                .with_property("title", json!("Welcome")),
            ContentNode::new(1002, "About", "/about/")
                .with_key(Uuid::from_u128(1002))
                .with_level(2)
                .with_content_type("textPage")
                .with_property("title", json!("About us"))
                .with_property("image", json!("/media/about.jpg")),
            ContentNode::new(1003, "Contact", "/contact/")
                .with_key(Uuid::from_u128(1003))
                .with_level(2)
                .with_content_type("textPage"),
        ]
    }

    /// Services wired to the site.
    #[must_use]
    pub fn services(&self) -> SpaServices {
        let content = Self::pages()
            .into_iter()
            .fold(StaticContentResolver::default(), StaticContentResolver::with_page);

        SpaServices {
            domains: Arc::new(
                StaticDomainResolver::default().with_host(TEST_HOST, DomainMatch::new(1, 1000, "en-US")),
            ),
            content: Arc::new(content),
            redirects: Arc::new(
                StaticRedirectLookup::default()
                    .with_redirect("/old-about/", RedirectTarget::permanent("/about/")),
            ),
            cache: self.cache.clone(),
            site_model: Arc::new(site_model),
            navigation_model: Arc::new(navigation_model),
            content_model: Arc::new(CountingContentModel {
                builds: self.content_builds.clone(),
            }),
            content_token: Arc::new(ContentToken::fixed(Uuid::nil())),
        }
    }
}

fn site_model(_node: &ContentNode, request: &SpaRequest) -> anyhow::Result<serde_json::Value> {
    Ok(json!({
        "name": "Test Site",
        "siteId": request.site_id(),
        "culture": request.culture(),
    }))
}

fn navigation_model(node: &ContentNode, _request: &SpaRequest) -> anyhow::Result<serde_json::Value> {
    let items: Vec<_> = TestSite::pages()
        .into_iter()
        .map(|page| json!({ "id": page.id, "name": page.name, "url": page.url, "active": page.id == node.id }))
        .collect();
    Ok(json!({ "items": items }))
}

struct CountingContentModel {
    builds: Arc<AtomicUsize>,
}

impl ModelBuilder for CountingContentModel {
    fn build(&self, node: &ContentNode, request: &SpaRequest) -> anyhow::Result<serde_json::Value> {
        self.builds.fetch_add(1, Ordering::SeqCst);

        let title = node.string_property("title").unwrap_or(&node.name);
        let base = format!("{}://{}", request.scheme(), request.host());
        let mut og = OpenGraphProperties::new(&base).with_title(title).with_url(node.url.clone());
        if let Some(image) = node.string_property("image") {
            og = og.with_image(image);
        }
        let meta = SpaMetaData::new(title)
            .with_canonical(format!("{base}{}", node.url))
            .with_open_graph(og);

        Ok(json!({
            "id": node.id,
            "key": node.key,
            "name": node.name,
            "url": node.url,
            "contentType": node.content_type,
            "meta": meta,
            "properties": node.properties,
        }))
    }
}
