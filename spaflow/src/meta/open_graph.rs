//! Open Graph properties.

use super::MetaProperty;

/// An Open Graph image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenGraphImage {
    /// Absolute image URL.
    pub url: String,
    /// Width in pixels, if known.
    pub width: Option<u32>,
    /// Height in pixels, if known.
    pub height: Option<u32>,
}

/// Open Graph data of a page.
///
/// Image URLs starting with `/` are resolved against the site base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenGraphProperties {
    base_url: String,
    /// `og:title`.
    pub title: Option<String>,
    /// `og:description`.
    pub description: Option<String>,
    /// `og:site_name`.
    pub site_name: Option<String>,
    /// `og:url`.
    pub url: Option<String>,
    /// `og:image` entries, in order.
    pub images: Vec<OpenGraphImage>,
}

impl OpenGraphProperties {
    /// Creates empty properties for a site at `base_url` (scheme and host).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// The base URL images are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
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

    /// Sets the site name.
    #[must_use]
    pub fn with_site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = Some(site_name.into());
        self
    }

    /// Sets the page URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Appends an image of unknown size. Blank URLs are ignored.
    #[must_use]
    pub fn with_image(mut self, url: &str) -> Self {
        self.append_image(url, None);
        self
    }

    /// Appends an image with known dimensions. Blank URLs are ignored.
    #[must_use]
    pub fn with_sized_image(mut self, url: &str, width: u32, height: u32) -> Self {
        self.append_image(url, Some((width, height)));
        self
    }

    /// Inserts images before the existing ones.
    #[must_use]
    pub fn with_leading_images<'a>(mut self, urls: impl IntoIterator<Item = &'a str>) -> Self {
        let mut leading = Self::new(&self.base_url);
        for url in urls {
            leading.append_image(url, None);
        }
        leading.images.append(&mut self.images);
        self.images = leading.images;
        self
    }

    fn append_image(&mut self, url: &str, size: Option<(u32, u32)>) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        self.images.push(OpenGraphImage {
            url: self.absolute(url),
            width: size.map(|(w, _)| w),
            height: size.map(|(_, h)| h),
        });
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{url}", self.base_url)
        } else {
            url.to_string()
        }
    }

    /// Renders the properties as `og:*` meta entries. Empty values are left
    /// out.
    #[must_use]
    pub fn to_meta(&self) -> Vec<MetaProperty> {
        let mut meta = Vec::new();
        MetaProperty::push(&mut meta, "og:title", self.title.as_deref());
        MetaProperty::push(&mut meta, "og:description", self.description.as_deref());
        MetaProperty::push(&mut meta, "og:site_name", self.site_name.as_deref());
        MetaProperty::push(&mut meta, "og:url", self.url.as_deref());

        for image in &self.images {
            MetaProperty::push(&mut meta, "og:image", Some(&image.url));
            if let Some(width) = image.width.filter(|w| *w > 0) {
                MetaProperty::push(&mut meta, "og:image:width", Some(&width.to_string()));
            }
            if let Some(height) = image.height.filter(|h| *h > 0) {
                MetaProperty::push(&mut meta, "og:image:height", Some(&height.to_string()));
            }
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relative_images_become_absolute() {
        let og = OpenGraphProperties::new("https://example.com/")
            .with_image("/media/a.jpg")
            .with_image("https://cdn.example.com/b.jpg")
            .with_image("   ");

        let urls: Vec<_> = og.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, ["https://example.com/media/a.jpg", "https://cdn.example.com/b.jpg"]);
    }

    #[test]
    fn test_leading_images() {
        let og = OpenGraphProperties::new("https://example.com")
            .with_image("/second.jpg")
            .with_leading_images(["/first.jpg"]);

        assert_eq!(og.images[0].url, "https://example.com/first.jpg");
        assert_eq!(og.images[1].url, "https://example.com/second.jpg");
    }

    #[test]
    fn test_to_meta() {
        let og = OpenGraphProperties::new("https://example.com")
            .with_title("About")
            .with_sized_image("/a.jpg", 1200, 630);

        let rendered: Vec<_> = og
            .to_meta()
            .into_iter()
            .map(|m| (m.property, m.content))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("og:title".to_string(), "About".to_string()),
                ("og:image".to_string(), "https://example.com/a.jpg".to_string()),
                ("og:image:width".to_string(), "1200".to_string()),
                ("og:image:height".to_string(), "630".to_string()),
            ]
        );
    }
}
