//! Error reporting for failed pipeline runs.

use crate::context::SpaRequest;
use crate::core::SpaResponse;
use crate::errors::PipelineError;
use http::StatusCode;
use tracing::error;

/// Decides what the caller sees when a pipeline run fails.
pub trait ErrorReporter: Send + Sync {
    /// Handles `error`. Returning `Some` turns the failure into that
    /// response; returning `None` lets the error propagate.
    fn handle(&self, request: &SpaRequest, error: &PipelineError) -> Option<SpaResponse>;
}

/// Logs every failure. In debug mode, callers asking for HTML get a
/// diagnostic page instead of the raw error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorReporter {
    debug: bool,
}

impl LoggingErrorReporter {
    /// Creates a reporter.
    #[must_use]
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Returns true if diagnostic pages are enabled.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug
    }
}

impl ErrorReporter for LoggingErrorReporter {
    fn handle(&self, request: &SpaRequest, error: &PipelineError) -> Option<SpaResponse> {
        error!(
            scheme = %request.scheme(),
            host = %request.host(),
            url = %request.url(),
            group = %error.group,
            stage = %error.stage,
            error = %error.cause,
            "SPA request failed"
        );

        if self.debug && request.accepts("text/html") {
            Some(SpaResponse::html(StatusCode::INTERNAL_SERVER_ERROR, render_diagnostics(request, error)))
        } else {
            None
        }
    }
}

fn render_diagnostics(request: &SpaRequest, error: &PipelineError) -> String {
    let chain: String = error
        .cause_chain()
        .iter()
        .map(|cause| format!("<li>{}</li>", escape_html(cause)))
        .collect();

    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>SPA request failed</title></head>\n<body>\n\
         <h1>{message}</h1>\n\
         <table>\n\
         <tr><th>URL</th><td>{scheme}://{host}{url}</td></tr>\n\
         <tr><th>Action group</th><td>{group}</td></tr>\n\
         <tr><th>Stage</th><td>{stage}</td></tr>\n\
         </table>\n\
         <h2>Causes</h2>\n<ol>{chain}</ol>\n</body>\n</html>\n",
        message = escape_html(&error.cause.to_string()),
        scheme = escape_html(request.scheme()),
        host = escape_html(request.host()),
        url = escape_html(request.url()),
        group = escape_html(&error.group),
        stage = escape_html(&error.stage),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResponseBody;

    fn failure() -> PipelineError {
        let cause = anyhow::anyhow!("<script>alert(1)</script>").context("Failed to build the content model");
        PipelineError::new("build", "init_models", cause)
    }

    #[test]
    fn test_propagates_without_debug() {
        let reporter = LoggingErrorReporter::new(false);
        let request = SpaRequest::new("/").with_accept(["text/html"]);
        assert!(reporter.handle(&request, &failure()).is_none());
    }

    #[test]
    fn test_propagates_for_json_callers() {
        let reporter = LoggingErrorReporter::new(true);
        let request = SpaRequest::new("/").with_accept(["application/json"]);
        assert!(reporter.handle(&request, &failure()).is_none());
    }

    #[test]
    fn test_diagnostic_page_is_escaped() {
        let reporter = LoggingErrorReporter::new(true);
        let request = SpaRequest::new("/about/?q=<b>")
            .with_host("example.com")
            .with_accept(["text/html; charset=utf-8", "*/*"]);

        let response = reporter.handle(&request, &failure()).unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let ResponseBody::Html(html) = response.body() else {
            panic!("expected an HTML body");
        };
        assert!(html.contains("init_models"));
        assert!(html.contains("Failed to build the content model"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("/about/?q=&lt;b&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_diagnostic_page_for_browser_accept_header() {
        let reporter = LoggingErrorReporter::new(true);
        let request = SpaRequest::new("/").with_accept([
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,*/*;q=0.8",
        ]);

        let response = reporter.handle(&request, &failure()).unwrap();
        assert!(matches!(response.body(), ResponseBody::Html(_)));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a & "b" <c> 'd'"#), "a &amp; &quot;b&quot; &lt;c&gt; &#39;d&#39;");
    }
}
