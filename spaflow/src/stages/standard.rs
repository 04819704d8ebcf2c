//! The stages wired into the standard pipeline.

use super::{ContentResolver, ContentToken, DomainResolver, ModelBuilder, RedirectLookup, Stage};
use crate::cache::{CacheKey, CachedPage, PageCache};
use crate::context::{SpaApiPart, SpaRequest};
use crate::core::{SpaDataModel, SpaResponse};
use crate::preview::try_get_preview_id;
use anyhow::Context;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

macro_rules! opaque_debug {
    ($($ty:ident),* $(,)?) => {
        $(
            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($ty)).finish_non_exhaustive()
                }
            }
        )*
    };
}

opaque_debug!(
    FindDomainAndCulture,
    ReadFromCache,
    ContentLookup,
    OutboundRedirects,
    InitModels,
    PushToCache,
);

/// Resolves the domain, site and culture. Ends the request with a 404 when
/// no domain matches.
pub struct FindDomainAndCulture {
    domains: Arc<dyn DomainResolver>,
}

impl FindDomainAndCulture {
    /// Creates the stage.
    #[must_use]
    pub fn new(domains: Arc<dyn DomainResolver>) -> Self {
        Self { domains }
    }
}

#[async_trait]
impl Stage for FindDomainAndCulture {
    fn name(&self) -> &str {
        "find_domain_and_culture"
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        match self.domains.resolve(request.host(), request.url()).await? {
            Some(domain) => {
                debug!(domain_id = domain.domain_id, culture = %domain.culture, "Resolved domain");
                request.set_domain(domain)?;
            }
            None => {
                request.set_response(SpaResponse::not_found("No domain matches the requested URL"))?;
            }
        }
        Ok(())
    }
}

/// Derives the cache key and, on a hit, installs the cached model.
pub struct ReadFromCache {
    cache: Arc<dyn PageCache>,
}

impl ReadFromCache {
    /// Creates the stage.
    #[must_use]
    pub fn new(cache: Arc<dyn PageCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Stage for ReadFromCache {
    fn name(&self) -> &str {
        "read_from_cache"
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        let Some(key) = CacheKey::for_request(request) else {
            return Ok(());
        };
        request.set_cache_key(key.clone())?;

        if let Some(page) = self.cache.try_get(&key).await? {
            debug!(key = %key, cached_at = %page.cached_at, "Cache hit");
            request.set_data_model(page.model.as_cached())?;
        }
        Ok(())
    }
}

/// Finds the content node for the request.
///
/// Preview requests addressing a page by id (`/1234.aspx`) are looked up by
/// that id.
pub struct ContentLookup {
    content: Arc<dyn ContentResolver>,
}

impl ContentLookup {
    /// Creates the stage.
    #[must_use]
    pub fn new(content: Arc<dyn ContentResolver>) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Stage for ContentLookup {
    fn name(&self) -> &str {
        "content_lookup"
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        let culture = request.culture().unwrap_or_default().to_string();
        let preview_id = if request.is_preview() {
            try_get_preview_id(request.url())
        } else {
            None
        };

        let node = match preview_id {
            Some(id) => self.content.get_by_id(id, &culture).await?,
            None => self.content.lookup(request.path(), &culture).await?,
        };

        if let Some(node) = node {
            debug!(content_id = node.id, "Resolved content");
            request.set_content(node)?;
        }
        Ok(())
    }
}

/// Ends the request with a redirect when the redirect table has a match.
pub struct OutboundRedirects {
    redirects: Arc<dyn RedirectLookup>,
}

impl OutboundRedirects {
    /// Creates the stage.
    #[must_use]
    pub fn new(redirects: Arc<dyn RedirectLookup>) -> Self {
        Self { redirects }
    }
}

#[async_trait]
impl Stage for OutboundRedirects {
    fn name(&self) -> &str {
        "outbound_redirects"
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        if let Some(target) = self.redirects.match_outbound(request.url()).await? {
            debug!(to = %target.url, permanent = target.permanent, "Outbound redirect");
            request.set_response(SpaResponse::redirect(target.url, target.permanent))?;
        }
        Ok(())
    }
}

/// Ends the request with a 404 when no content was resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

#[async_trait]
impl Stage for NotFound {
    fn name(&self) -> &str {
        "not_found"
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        if request.content().is_none() {
            request.set_response(SpaResponse::not_found("Page not found"))?;
        }
        Ok(())
    }
}

/// Builds the data model from the requested parts.
pub struct InitModels {
    site: Arc<dyn ModelBuilder>,
    navigation: Arc<dyn ModelBuilder>,
    content: Arc<dyn ModelBuilder>,
    token: Arc<ContentToken>,
}

impl InitModels {
    /// Creates the stage.
    #[must_use]
    pub fn new(
        site: Arc<dyn ModelBuilder>,
        navigation: Arc<dyn ModelBuilder>,
        content: Arc<dyn ModelBuilder>,
        token: Arc<ContentToken>,
    ) -> Self {
        Self {
            site,
            navigation,
            content,
            token,
        }
    }
}

#[async_trait]
impl Stage for InitModels {
    fn name(&self) -> &str {
        "init_models"
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        let node = request
            .content()
            .context("Content must be resolved before the models are built")?;

        let mut model = SpaDataModel::new(node.id, request.site_id().unwrap_or(-1), self.token.current());

        if request.is_part_requested(SpaApiPart::Site) {
            let site = self.site.build(node, request).context("Failed to build the site model")?;
            model = model.with_site(site);
        }
        if request.is_part_requested(SpaApiPart::Navigation) {
            let navigation = self
                .navigation
                .build(node, request)
                .context("Failed to build the navigation model")?;
            model = model.with_navigation(navigation);
        }
        if request.is_part_requested(SpaApiPart::Content) {
            let content = self
                .content
                .build(node, request)
                .context("Failed to build the content model")?;
            model = model.with_content(content);
        }

        request.set_data_model(model)?;
        Ok(())
    }
}

/// Writes a freshly built model back to the cache.
pub struct PushToCache {
    cache: Arc<dyn PageCache>,
}

impl PushToCache {
    /// Creates the stage.
    #[must_use]
    pub fn new(cache: Arc<dyn PageCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Stage for PushToCache {
    fn name(&self) -> &str {
        "push_to_cache"
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        let (Some(key), Some(model)) = (request.cache_key(), request.data_model()) else {
            return Ok(());
        };
        if model.is_cached {
            return Ok(());
        }

        self.cache.set(key, CachedPage::new(SpaDataModel::clone(model))).await?;
        debug!(key = %key, "Stored page in cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryPageCache;
    use crate::context::SpaParts;
    use crate::core::{ContentNode, DomainMatch, RedirectTarget};
    use crate::stages::{MockContentResolver, MockDomainResolver, MockRedirectLookup};
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn resolved_request(url: &str) -> SpaRequest {
        let mut request = SpaRequest::new(url).with_host("example.com");
        request.set_domain(DomainMatch::new(1, 1000, "en-US")).unwrap();
        request
    }

    fn echo_builder(section: &'static str) -> Arc<dyn ModelBuilder> {
        Arc::new(move |node: &ContentNode, _request: &SpaRequest| {
            Ok::<_, anyhow::Error>(serde_json::json!({ "section": section, "id": node.id }))
        })
    }

    fn init_models() -> InitModels {
        InitModels::new(
            echo_builder("site"),
            echo_builder("navigation"),
            echo_builder("content"),
            Arc::new(ContentToken::fixed(Uuid::nil())),
        )
    }

    #[tokio::test]
    async fn test_find_domain_sets_domain_and_culture() {
        let mut domains = MockDomainResolver::new();
        domains
            .expect_resolve()
            .with(eq("example.com"), eq("/about/"))
            .returning(|_, _| Ok(Some(DomainMatch::new(1, 1000, "da-DK"))));

        let stage = FindDomainAndCulture::new(Arc::new(domains));
        let mut request = SpaRequest::new("/about/").with_host("example.com");
        stage.execute(&mut request).await.unwrap();

        assert_eq!(request.site_id(), Some(1000));
        assert_eq!(request.culture(), Some("da-DK"));
        assert!(!request.has_response());
    }

    #[tokio::test]
    async fn test_find_domain_miss_is_not_found() {
        let mut domains = MockDomainResolver::new();
        domains.expect_resolve().returning(|_, _| Ok(None));

        let stage = FindDomainAndCulture::new(Arc::new(domains));
        let mut request = SpaRequest::new("/");
        stage.execute(&mut request).await.unwrap();

        assert!(request.response().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_read_from_cache_hit_marks_cached() {
        let cache = Arc::new(InMemoryPageCache::new());
        let mut request = resolved_request("/about/");
        let key = CacheKey::for_request(&request).unwrap();
        cache
            .set(&key, CachedPage::new(SpaDataModel::new(5, 1000, Uuid::nil())))
            .await
            .unwrap();

        ReadFromCache::new(cache).execute(&mut request).await.unwrap();

        let model = request.data_model().unwrap();
        assert!(model.is_cached);
        assert_eq!(model.page_id, 5);
        assert_eq!(request.cache_key(), Some(&key));
    }

    #[tokio::test]
    async fn test_read_from_cache_without_domain_is_noop() {
        let cache = Arc::new(InMemoryPageCache::new());
        let mut request = SpaRequest::new("/about/");

        ReadFromCache::new(cache).execute(&mut request).await.unwrap();
        assert!(request.cache_key().is_none());
        assert!(request.data_model().is_none());
    }

    #[tokio::test]
    async fn test_content_lookup_by_path() {
        let mut content = MockContentResolver::new();
        content
            .expect_lookup()
            .with(eq("/about/"), eq("en-US"))
            .returning(|_, _| Ok(Some(ContentNode::new(5, "About", "/about/"))));

        let mut request = resolved_request("/about/?utm=1");
        ContentLookup::new(Arc::new(content)).execute(&mut request).await.unwrap();

        assert_eq!(request.content_id(), Some(5));
    }

    #[tokio::test]
    async fn test_content_lookup_preview_by_id() {
        let mut content = MockContentResolver::new();
        content.expect_lookup().never();
        content
            .expect_get_by_id()
            .with(eq(1234), eq("en-US"))
            .returning(|id, _| Ok(Some(ContentNode::new(id, "Draft", "/draft/"))));

        let mut request = resolved_request("/1234.aspx").with_preview(true);
        ContentLookup::new(Arc::new(content)).execute(&mut request).await.unwrap();

        assert_eq!(request.content_id(), Some(1234));
    }

    #[tokio::test]
    async fn test_outbound_redirect() {
        let mut redirects = MockRedirectLookup::new();
        redirects
            .expect_match_outbound()
            .with(eq("/old/"))
            .returning(|_| Ok(Some(RedirectTarget::temporary("/new/"))));

        let mut request = resolved_request("/old/");
        OutboundRedirects::new(Arc::new(redirects)).execute(&mut request).await.unwrap();

        let response = request.response().unwrap();
        assert_eq!(response.location(), Some("/new/"));
        assert_eq!(response.status(), http::StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_not_found_only_without_content() {
        let mut request = resolved_request("/missing/");
        NotFound.execute(&mut request).await.unwrap();
        assert!(request.response().unwrap().is_not_found());

        let mut request = resolved_request("/about/");
        request.set_content(ContentNode::new(5, "About", "/about/")).unwrap();
        NotFound.execute(&mut request).await.unwrap();
        assert!(!request.has_response());
    }

    #[tokio::test]
    async fn test_init_models_only_requested_parts() {
        let mut request = resolved_request("/about/").with_parts(SpaParts::only([SpaApiPart::Content]));
        request.set_content(ContentNode::new(5, "About", "/about/")).unwrap();

        init_models().execute(&mut request).await.unwrap();

        let model = request.data_model().unwrap();
        assert_eq!(model.page_id, 5);
        assert_eq!(model.site_id, 1000);
        assert!(model.site.is_none());
        assert!(model.navigation.is_none());
        assert_eq!(model.content.as_ref().unwrap()["section"], "content");
    }

    #[tokio::test]
    async fn test_init_models_requires_content() {
        let mut request = resolved_request("/about/");
        let err = init_models().execute(&mut request).await.unwrap_err();
        assert!(err.to_string().contains("Content must be resolved"));
    }

    #[tokio::test]
    async fn test_init_models_builder_failure_has_context() {
        let failing: Arc<dyn ModelBuilder> = Arc::new(|_: &ContentNode, _: &SpaRequest| {
            Err::<serde_json::Value, _>(anyhow::anyhow!("navigation tree unavailable"))
        });
        let stage = InitModels::new(
            echo_builder("site"),
            failing,
            echo_builder("content"),
            Arc::new(ContentToken::new()),
        );

        let mut request = resolved_request("/about/");
        request.set_content(ContentNode::new(5, "About", "/about/")).unwrap();
        let err = stage.execute(&mut request).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to build the navigation model");
        assert_eq!(err.root_cause().to_string(), "navigation tree unavailable");
    }

    #[tokio::test]
    async fn test_push_to_cache_skips_cached_models() {
        let cache = Arc::new(InMemoryPageCache::new());
        let mut request = resolved_request("/about/");
        request.set_cache_key(CacheKey::for_request(&request).unwrap()).unwrap();
        request
            .set_data_model(SpaDataModel::new(5, 1000, Uuid::nil()).as_cached())
            .unwrap();

        PushToCache::new(cache.clone()).execute(&mut request).await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_push_to_cache_writes_fresh_models() {
        let cache = Arc::new(InMemoryPageCache::new());
        let mut request = resolved_request("/about/");
        let key = CacheKey::for_request(&request).unwrap();
        request.set_cache_key(key.clone()).unwrap();
        request.set_data_model(SpaDataModel::new(5, 1000, Uuid::nil())).unwrap();

        PushToCache::new(cache.clone()).execute(&mut request).await.unwrap();

        let stored = cache.try_get(&key).await.unwrap().unwrap();
        assert_eq!(stored.model.page_id, 5);
        assert!(!stored.model.is_cached);
    }
}
