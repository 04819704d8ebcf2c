//! Requested output parts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// A section of the SPA data model a caller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaApiPart {
    /// Site-wide data (header, footer, settings).
    Site,
    /// The navigation tree.
    Navigation,
    /// The current page.
    Content,
}

impl SpaApiPart {
    /// All parts, in canonical order.
    pub const ALL: [Self; 3] = [Self::Site, Self::Navigation, Self::Content];

    /// Parses a single part name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "site" => Some(Self::Site),
            "navigation" => Some(Self::Navigation),
            "content" => Some(Self::Content),
            _ => None,
        }
    }

    /// Returns the lowercase name of the part.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::Navigation => "navigation",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for SpaApiPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of parts requested for a single call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpaParts(BTreeSet<SpaApiPart>);

impl Default for SpaParts {
    fn default() -> Self {
        Self::all()
    }
}

impl SpaParts {
    /// All parts.
    #[must_use]
    pub fn all() -> Self {
        Self(SpaApiPart::ALL.into_iter().collect())
    }

    /// Only the given parts.
    #[must_use]
    pub fn only(parts: impl IntoIterator<Item = SpaApiPart>) -> Self {
        Self(parts.into_iter().collect())
    }

    /// Parses a comma separated list such as `site,content`.
    ///
    /// Unknown names are ignored. A missing or empty list (or one with only
    /// unknown names) requests every part.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::all();
        };

        let mut parts = BTreeSet::new();
        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match SpaApiPart::parse(token) {
                Some(part) => {
                    parts.insert(part);
                }
                None => warn!(part = %token, "Ignoring unknown SPA part"),
            }
        }

        if parts.is_empty() {
            Self::all()
        } else {
            Self(parts)
        }
    }

    /// Returns true if `part` was requested.
    #[must_use]
    pub fn contains(&self, part: SpaApiPart) -> bool {
        self.0.contains(&part)
    }

    /// Iterates the parts in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = SpaApiPart> + '_ {
        self.0.iter().copied()
    }

    /// Canonical comma separated form, used for cache keys.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_missing_means_all() {
        assert_eq!(SpaParts::parse(None), SpaParts::all());
        assert_eq!(SpaParts::parse(Some("")), SpaParts::all());
        assert_eq!(SpaParts::parse(Some(" , ")), SpaParts::all());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let parts = SpaParts::parse(Some("Content, NAVIGATION"));
        assert!(parts.contains(SpaApiPart::Content));
        assert!(parts.contains(SpaApiPart::Navigation));
        assert!(!parts.contains(SpaApiPart::Site));
    }

    #[test]
    fn test_parse_ignores_unknown() {
        let parts = SpaParts::parse(Some("content,footer"));
        assert_eq!(parts, SpaParts::only([SpaApiPart::Content]));

        assert_eq!(SpaParts::parse(Some("footer")), SpaParts::all());
    }

    #[test]
    fn test_canonical_order() {
        let parts = SpaParts::parse(Some("content,site"));
        assert_eq!(parts.canonical(), "site,content");
        assert_eq!(SpaParts::all().canonical(), "site,navigation,content");
    }
}
