// ABOUTME: Extractor for TikTok video URLs, including vm.tiktok.com short links.
// ABOUTME: Short links are resolved by reading the redirect Location without following it.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::fill_template;
use crate::entity::{Content, Link, Media};
use crate::error::ResolveError;
use crate::resolve::Extractor;

static SHORT_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://vm\.tiktok\.com/(?P<video_id>\w+)/?(?:\?.*)?$").unwrap());
static FULL_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https://(?:www\.|m\.)?tiktok\.com/(?:@[^/]*/video/|v/)(?P<video_id>\d+)(?:\.html)?/?(?:\?.*)?$",
    )
    .unwrap()
});

#[derive(Debug, Clone)]
pub struct TiktokConfig {
    /// Template for the playable resource, `{}` = video id.
    pub video_resource_url: String,
    /// Template for the thumbnail, `{}` = video id.
    pub thumbnail_resource_url: String,
    pub user_agent: String,
    /// Override for the `https://vm.tiktok.com` short-link origin, used in tests.
    pub short_link_origin: Option<String>,
}

pub struct Tiktok {
    cfg: TiktokConfig,
    http: reqwest::Client,
}

impl Tiktok {
    pub fn new(cfg: TiktokConfig) -> Self {
        // Redirects must not be followed: the Location header of a short
        // link is the answer, not a hop.
        let http = reqwest::Client::builder()
            .user_agent(&cfg.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to build HTTP client");
        Self { cfg, http }
    }

    async fn resolve_short(&self, url: &str) -> Result<String, ResolveError> {
        let resp = self
            .http
            .head(url)
            .send()
            .await
            .map_err(ResolveError::transport)?;
        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ResolveError::malformed("short link returned no redirect"))?;
        Ok(location.to_string())
    }
}

#[async_trait]
impl Extractor for Tiktok {
    fn supports(&self, url: &str) -> bool {
        SHORT_URL_RE.is_match(url) || FULL_URL_RE.is_match(url)
    }

    async fn parse(&self, url: &str) -> Result<Content, ResolveError> {
        let target = match SHORT_URL_RE.captures(url) {
            Some(caps) => {
                let short_url = match &self.cfg.short_link_origin {
                    Some(origin) => format!("{origin}/{}/", &caps["video_id"]),
                    None => url.to_string(),
                };
                self.resolve_short(&short_url).await?
            }
            None => url.to_string(),
        };

        let video_id = FULL_URL_RE
            .captures(&target)
            .map(|caps| caps["video_id"].to_string())
            .ok_or_else(|| ResolveError::InvalidUrl(target.clone()))?;

        Ok(Content {
            media: Some(vec![Media::Video {
                resource_url: fill_template(&self.cfg.video_resource_url, &[&video_id]),
                mime_type: "video/mp4".to_string(),
                thumbnail_url: fill_template(&self.cfg.thumbnail_resource_url, &[&video_id]),
            }]),
            ..Content::new(Link::bare(format!("https://tiktok.com/@/video/{video_id}")))
        })
    }
}
