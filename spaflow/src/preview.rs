//! Recognition of preview URLs.

use regex::Regex;
use std::sync::OnceLock;

static PREVIEW_PATH: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn preview_path() -> &'static Regex {
    PREVIEW_PATH.get_or_init(|| Regex::new(r"^/([0-9]+)\.aspx$").expect("valid preview regex"))
}

/// Returns the page id of a preview URL such as `/1234.aspx` or
/// `/umbraco/dialogs/preview.aspx?id=1234`, or `None` for ordinary URLs.
#[must_use]
pub fn try_get_preview_id(url: &str) -> Option<i64> {
    if url.contains("/umbraco/dialogs") {
        if let Some(id) = url.split('=').nth(1).and_then(|v| v.parse::<i64>().ok()) {
            return Some(id).filter(|id| *id > 0);
        }
    }

    let path = url.split('?').next().unwrap_or_default().trim_end_matches('/');
    preview_path()
        .captures(path)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspx_preview_url() {
        assert_eq!(try_get_preview_id("/1234.aspx"), Some(1234));
        assert_eq!(try_get_preview_id("/1234.aspx/"), Some(1234));
        assert_eq!(try_get_preview_id("/1234.aspx?culture=en"), Some(1234));
    }

    #[test]
    fn test_dialog_preview_url() {
        assert_eq!(try_get_preview_id("/umbraco/dialogs/preview.aspx?id=55"), Some(55));
    }

    #[test]
    fn test_ordinary_urls() {
        assert_eq!(try_get_preview_id("/about/"), None);
        assert_eq!(try_get_preview_id("/0.aspx"), None);
        assert_eq!(try_get_preview_id("/news/1234.aspx"), None);
        assert_eq!(try_get_preview_id(""), None);
    }
}
