//! Tests for the request context.

#[cfg(test)]
mod tests {
    use crate::cache::CacheKey;
    use crate::context::{SpaApiPart, SpaParts, SpaRequest};
    use crate::core::{ContentNode, DomainMatch, SpaDataModel, SpaResponse};
    use crate::errors::ContextError;
    use uuid::Uuid;

    fn domain() -> DomainMatch {
        DomainMatch::new(1, 1000, "en-US")
    }

    #[test]
    fn test_request_defaults() {
        let request = SpaRequest::new("/about/?x=1");
        assert_eq!(request.url(), "/about/?x=1");
        assert_eq!(request.path(), "/about/");
        assert_eq!(request.scheme(), "https");
        assert!(!request.is_preview());
        assert_eq!(request.parts(), &SpaParts::all());
        assert!(!request.has_response());
        assert!(request.data_model().is_none());
    }

    #[test]
    fn test_request_builders() {
        let request = SpaRequest::new("/")
            .with_host("example.com")
            .with_scheme("http")
            .with_accept(["text/html; q=0.9", "application/json"])
            .with_preview(true)
            .with_parts(SpaParts::only([SpaApiPart::Site]));

        assert_eq!(request.host(), "example.com");
        assert_eq!(request.scheme(), "http");
        assert!(request.accepts("TEXT/HTML"));
        assert!(request.accepts("application/json"));
        assert!(!request.accepts("application/xml"));
        assert!(request.is_preview());
        assert!(request.is_part_requested(SpaApiPart::Site));
        assert!(!request.is_part_requested(SpaApiPart::Content));
    }

    #[test]
    fn test_accepts_raw_header() {
        let request = SpaRequest::new("/").with_accept([
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ]);

        assert!(request.accepts("text/html"));
        assert!(request.accepts("application/xml"));
        assert!(request.accepts("*/*"));
        assert!(!request.accepts("application/json"));
    }

    #[test]
    fn test_domain_sets_culture_once() {
        let mut request = SpaRequest::new("/");
        request.set_culture("da-DK").unwrap();
        request.set_domain(domain()).unwrap();

        assert_eq!(request.culture(), Some("da-DK"));
        assert_eq!(request.site_id(), Some(1000));

        let mut request = SpaRequest::new("/");
        request.set_domain(domain()).unwrap();
        assert_eq!(request.culture(), Some("en-US"));
    }

    #[test]
    fn test_response_locks_resolution() {
        let mut request = SpaRequest::new("/");
        request.set_response(SpaResponse::not_found("gone")).unwrap();

        assert_eq!(
            request.set_domain(domain()),
            Err(ContextError::ResolutionLocked { field: "domain" })
        );
        assert_eq!(
            request.set_content(ContentNode::new(1, "Home", "/")),
            Err(ContextError::ResolutionLocked { field: "content" })
        );
        assert_eq!(
            request.set_culture("en-US"),
            Err(ContextError::ResolutionLocked { field: "culture" })
        );
        assert!(request.content().is_none());
    }

    #[test]
    fn test_single_terminal_response() {
        let mut request = SpaRequest::new("/");
        request.set_response(SpaResponse::redirect("/a/", true)).unwrap();

        let err = request.set_response(SpaResponse::redirect("/b/", true)).unwrap_err();
        assert_eq!(err, ContextError::ResponseAlreadySet);
        assert_eq!(request.response().unwrap().location(), Some("/a/"));
    }

    #[test]
    fn test_data_model_rules() {
        let mut request = SpaRequest::new("/");
        request.set_data_model(SpaDataModel::new(1, 1, Uuid::nil())).unwrap();
        assert_eq!(
            request.set_data_model(SpaDataModel::new(2, 1, Uuid::nil())),
            Err(ContextError::DataModelAlreadySet)
        );
        assert_eq!(request.data_model().unwrap().page_id, 1);

        let mut request = SpaRequest::new("/");
        request.set_response(SpaResponse::error("boom")).unwrap();
        assert_eq!(
            request.set_data_model(SpaDataModel::new(1, 1, Uuid::nil())),
            Err(ContextError::DataModelAfterResponse)
        );
    }

    #[test]
    fn test_cache_key_roundtrip() {
        let mut request = SpaRequest::new("/About/").with_host("example.com");
        assert!(CacheKey::for_request(&request).is_none());

        request.set_domain(domain()).unwrap();
        let key = CacheKey::for_request(&request).unwrap();
        request.set_cache_key(key.clone()).unwrap();

        assert_eq!(request.cache_key(), Some(&key));
        assert_eq!(key.path, "/about");
    }

    #[test]
    fn test_clone_is_independent() {
        let mut request = SpaRequest::new("/");
        let snapshot = request.clone();
        request.set_content(ContentNode::new(1, "Home", "/")).unwrap();

        assert_eq!(request.content_id(), Some(1));
        assert!(snapshot.content().is_none());
    }

    #[test]
    fn test_elapsed_is_non_negative() {
        let mut request = SpaRequest::new("/");
        request.mark_started();
        assert!(request.elapsed_ms() >= 0);
    }
}
