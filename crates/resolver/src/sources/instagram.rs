// ABOUTME: Extractor for Instagram reel URLs.
// ABOUTME: Reads og meta from a configured meta page and maps through a storage template.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{fill_template, get_text, http_client};
use crate::entity::{Content, Link, Media};
use crate::error::ResolveError;
use crate::meta::extract_meta_tags;
use crate::resolve::Extractor;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?instagram\.com/(?P<kind>reels?)/(?P<id>[\w-]+)").unwrap()
});

#[derive(Debug, Clone)]
pub struct InstagramConfig {
    /// Template for the page carrying the og meta, `{}` = kind, `{}` = id.
    pub video_meta_url: String,
    /// Template wrapping the og:video value, `{}` = resource URL.
    pub video_storage_url: String,
    pub thumbnail_url: String,
    pub user_agent: String,
}

pub struct Instagram {
    cfg: InstagramConfig,
    http: reqwest::Client,
}

impl Instagram {
    pub fn new(cfg: InstagramConfig) -> Self {
        let http = http_client(&cfg.user_agent);
        Self { cfg, http }
    }
}

#[async_trait]
impl Extractor for Instagram {
    fn supports(&self, url: &str) -> bool {
        URL_RE.is_match(url)
    }

    async fn parse(&self, url: &str) -> Result<Content, ResolveError> {
        let caps = URL_RE
            .captures(url)
            .ok_or_else(|| ResolveError::InvalidUrl(url.to_string()))?;
        let kind = &caps["kind"];
        let id = &caps["id"];

        let meta_url = fill_template(&self.cfg.video_meta_url, &[kind, id]);
        let html = get_text(&self.http, &meta_url).await?;
        let meta = extract_meta_tags(&html);

        let video = meta
            .get("og:video")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ResolveError::malformed("missing og:video"))?;
        let backlink = meta
            .get("og:url")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ResolveError::malformed("missing og:url"))?;

        Ok(Content {
            media: Some(vec![Media::Video {
                resource_url: fill_template(&self.cfg.video_storage_url, &[video]),
                mime_type: "video/mp4".to_string(),
                thumbnail_url: self.cfg.thumbnail_url.clone(),
            }]),
            ..Content::new(Link::bare(backlink.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_reel_urls() {
        let i = Instagram::new(InstagramConfig {
            video_meta_url: "https://meta.example.com/{}/{}".into(),
            video_storage_url: "https://store.example.com/?u={}".into(),
            thumbnail_url: "https://cdn.example.com/ig-thumb.jpg".into(),
            user_agent: "unfurl-test/0.1".into(),
        });
        assert!(i.supports("https://www.instagram.com/reel/Cabc123_xy/"));
        assert!(i.supports("https://instagram.com/reels/Cabc123_xy/?igsh=1"));
        assert!(!i.supports("https://www.instagram.com/p/Cabc123_xy/"));
    }
}
