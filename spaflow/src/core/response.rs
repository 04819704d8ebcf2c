//! Terminal responses produced by stages and by the pipeline.

use super::SpaDataModel;
use http::StatusCode;
use serde_json::json;

/// Body of a [`SpaResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// A page data model.
    Model(SpaDataModel),
    /// Any other JSON payload (redirect, not found, error envelopes).
    Json(serde_json::Value),
    /// A rendered HTML page (diagnostics).
    Html(String),
}

impl ResponseBody {
    /// Media type of the body.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Model(_) | Self::Json(_) => "application/json; charset=utf-8",
            Self::Html(_) => "text/html; charset=utf-8",
        }
    }

    /// Serializes the body.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Model(model) => serde_json::to_string(model),
            Self::Json(value) => serde_json::to_string(value),
            Self::Html(html) => Ok(html.clone()),
        }
    }
}

/// A response ready to be handed to the transport layer.
///
/// Redirect and not-found responses are ordinary values here: a stage sets
/// one on the request to end the pipeline without failing it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaResponse {
    status: StatusCode,
    body: ResponseBody,
    location: Option<String>,
}

impl SpaResponse {
    /// A successful response wrapping `model`.
    #[must_use]
    pub fn ok(model: SpaDataModel) -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::Model(model),
            location: None,
        }
    }

    /// A redirect to `url`: 301 when permanent, 307 otherwise.
    #[must_use]
    pub fn redirect(url: impl Into<String>, permanent: bool) -> Self {
        let url = url.into();
        let status = if permanent {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::TEMPORARY_REDIRECT
        };
        Self {
            status,
            body: ResponseBody::Json(json!({
                "meta": { "code": status.as_u16() },
                "data": { "url": url, "permanent": permanent },
            })),
            location: Some(url),
        }
    }

    /// A 404 response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::json_error(StatusCode::NOT_FOUND, message)
    }

    /// A 500 response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// A JSON error envelope with an arbitrary status.
    #[must_use]
    pub fn json_error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Json(json!({
                "meta": { "code": status.as_u16(), "error": message.into() },
            })),
            location: None,
        }
    }

    /// An HTML page, used for diagnostics.
    #[must_use]
    pub fn html(status: StatusCode, html: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Html(html.into()),
            location: None,
        }
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The body.
    #[must_use]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// The redirect location, for redirects.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The data model, for successful responses.
    #[must_use]
    pub fn model(&self) -> Option<&SpaDataModel> {
        match &self.body {
            ResponseBody::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Returns true for 3xx responses.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    /// Returns true for 404 responses.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_redirect_statuses() {
        let permanent = SpaResponse::redirect("/foo/", true);
        assert_eq!(permanent.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(permanent.location(), Some("/foo/"));
        assert!(permanent.is_redirect());

        let temporary = SpaResponse::redirect("/bar", false);
        assert_eq!(temporary.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[test]
    fn test_redirect_body() {
        let response = SpaResponse::redirect("/foo/?x=1", true);
        let ResponseBody::Json(body) = response.body() else {
            panic!("expected JSON body");
        };
        assert_eq!(body["meta"]["code"], 301);
        assert_eq!(body["data"]["url"], "/foo/?x=1");
    }

    #[test]
    fn test_not_found_envelope() {
        let response = SpaResponse::not_found("Page not found");
        assert!(response.is_not_found());
        assert_eq!(
            response.body().render().unwrap(),
            r#"{"meta":{"code":404,"error":"Page not found"}}"#
        );
    }

    #[test]
    fn test_model_response() {
        let response = SpaResponse::ok(SpaDataModel::new(1, 2, Uuid::nil()));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.model().map(|m| m.page_id), Some(1));
        assert!(response.body().content_type().starts_with("application/json"));
    }

    #[test]
    fn test_html_content_type() {
        let response = SpaResponse::html(StatusCode::INTERNAL_SERVER_ERROR, "<p>oops</p>");
        assert!(response.body().content_type().starts_with("text/html"));
        assert_eq!(response.body().render().unwrap(), "<p>oops</p>");
    }
}
