// ABOUTME: Normalized content model produced by every source extractor.
// ABOUTME: Defines Link, the Media variants, and the top-level Content record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A URL with optional display text.
///
/// `text` being `None` means the renderer falls back to displaying the URL
/// itself. Extractors never construct an empty-string text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: Option<String>,
}

impl Link {
    /// A link rendered as its raw URL.
    pub fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: None,
        }
    }

    /// A link with explicit display text.
    pub fn titled(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: Some(text.into()),
        }
    }
}

/// An attached media item. Closed set; the renderer matches on `kind()`
/// to pick labels and upload strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    Photo {
        resource_url: String,
        #[serde(default)]
        thumbnail_url: Option<String>,
        #[serde(default)]
        caption: Option<String>,
    },
    Video {
        resource_url: String,
        mime_type: String,
        thumbnail_url: String,
    },
    Gif {
        resource_url: String,
        mime_type: String,
        thumbnail_url: String,
    },
}

impl Media {
    /// Discriminator string for the renderer.
    pub fn kind(&self) -> &'static str {
        match self {
            Media::Photo { .. } => "photo",
            Media::Video { .. } => "video",
            Media::Gif { .. } => "gif",
        }
    }

    pub fn resource_url(&self) -> &str {
        match self {
            Media::Photo { resource_url, .. }
            | Media::Video { resource_url, .. }
            | Media::Gif { resource_url, .. } => resource_url,
        }
    }
}

/// The resolved entity handed to the renderer.
///
/// Built once per resolved URL by a single extractor invocation and never
/// mutated afterwards. `backlink.url` is always a fully-qualified, non-empty
/// URL; `media`, when present, holds at least one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub backlink: Link,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author: Option<Link>,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media: Option<Vec<Media>>,
}

impl Content {
    /// A content record carrying only a backlink; callers fill in the rest
    /// with struct update syntax.
    pub fn new(backlink: Link) -> Self {
        Self {
            backlink,
            text: None,
            author: None,
            metrics: None,
            created_at: None,
            media: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn media_kind_discriminators() {
        let photo = Media::Photo {
            resource_url: "https://example.com/p.jpg".into(),
            thumbnail_url: None,
            caption: None,
        };
        let video = Media::Video {
            resource_url: "https://example.com/v.mp4".into(),
            mime_type: "video/mp4".into(),
            thumbnail_url: "https://example.com/t.jpg".into(),
        };
        let gif = Media::Gif {
            resource_url: "https://example.com/g.mp4".into(),
            mime_type: "video/mp4".into(),
            thumbnail_url: "https://example.com/t.jpg".into(),
        };
        assert_eq!(photo.kind(), "photo");
        assert_eq!(video.kind(), "video");
        assert_eq!(gif.kind(), "gif");
    }

    #[test]
    fn link_text_defaults_to_absent() {
        let link = Link::bare("https://example.com/");
        assert_eq!(link.text, None);
        let titled = Link::titled("https://example.com/", "Example");
        assert_eq!(titled.text.as_deref(), Some("Example"));
    }
}
