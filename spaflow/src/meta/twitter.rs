//! Twitter cards.

use super::MetaContent;

/// Kind of Twitter card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TwitterCardKind {
    /// `summary`.
    #[default]
    Summary,
    /// `summary_large_image`.
    SummaryLargeImage,
}

impl TwitterCardKind {
    /// The value of the `twitter:card` tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::SummaryLargeImage => "summary_large_image",
        }
    }
}

/// A summary card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwitterSummaryCard {
    /// Card kind.
    pub kind: TwitterCardKind,
    /// Handle of the site.
    pub site: Option<String>,
    /// Handle of the author.
    pub creator: Option<String>,
    /// Title of the page.
    pub title: Option<String>,
    /// Short description of the page.
    pub description: Option<String>,
    /// URL of an image unique to the page.
    pub image: Option<String>,
    /// Alt text of the image.
    pub image_text: Option<String>,
}

impl TwitterSummaryCard {
    /// Creates an empty summary card.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty large image card.
    #[must_use]
    pub fn large_image() -> Self {
        Self {
            kind: TwitterCardKind::SummaryLargeImage,
            ..Self::default()
        }
    }

    /// Sets the site handle.
    #[must_use]
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Sets the creator handle.
    #[must_use]
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the image and its alt text.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>, text: Option<String>) -> Self {
        self.image = Some(image.into());
        self.image_text = text;
        self
    }

    /// Renders the card as `twitter:*` meta entries. Handles are prefixed
    /// with `@`; empty values are left out.
    #[must_use]
    pub fn to_meta(&self) -> Vec<MetaContent> {
        let mut meta = vec![MetaContent::new("twitter:card", self.kind.as_str())];

        let handles = [("twitter:site", &self.site), ("twitter:creator", &self.creator)];
        for (name, handle) in handles {
            if let Some(handle) = handle.as_deref().filter(|h| !h.is_empty()) {
                let handle = if handle.starts_with('@') {
                    handle.to_string()
                } else {
                    format!("@{handle}")
                };
                meta.push(MetaContent::new(name, handle));
            }
        }

        MetaContent::push(&mut meta, "twitter:title", self.title.as_deref());
        MetaContent::push(&mut meta, "twitter:description", self.description.as_deref());
        MetaContent::push(&mut meta, "twitter:image", self.image.as_deref());
        MetaContent::push(&mut meta, "twitter:image:alt", self.image_text.as_deref());
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(meta: &[MetaContent]) -> Vec<&str> {
        meta.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_handles_are_prefixed() {
        let card = TwitterSummaryCard::new().with_site("skybrud").with_creator("@author");
        let meta = card.to_meta();

        assert_eq!(meta[1].content, "@skybrud");
        assert_eq!(meta[2].content, "@author");
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let card = TwitterSummaryCard::new().with_title("About").with_site("");
        assert_eq!(names(&card.to_meta()), ["twitter:card", "twitter:title"]);
    }

    #[test]
    fn test_large_image_card() {
        let card = TwitterSummaryCard::large_image().with_image("https://example.com/a.jpg", Some("A".into()));
        let meta = card.to_meta();

        assert_eq!(meta[0].content, "summary_large_image");
        assert_eq!(names(&meta), ["twitter:card", "twitter:image", "twitter:image:alt"]);
    }
}
