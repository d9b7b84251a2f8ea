// ABOUTME: Extractor for YouTube comment permalinks via the Data API.
// ABOUTME: Resolves watch URLs carrying an lc= comment identifier.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{get_json, http_client};
use crate::entity::{Content, Link};
use crate::error::ResolveError;
use crate::resolve::Extractor;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?(?:youtu\.be|youtube\.com)/watch\?(?:[^#]*&)?v=(?P<video_id>[a-zA-Z0-9_-]+)(?:[^#]*&)?lc=(?P<comment_id>[a-zA-Z0-9_-]+)",
    )
    .unwrap()
});

#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    pub api_key: String,
    pub user_agent: String,
    pub api_base: String,
}

impl YoutubeConfig {
    pub fn new(api_key: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            user_agent: user_agent.into(),
            api_base: "https://youtube.googleapis.com".to_string(),
        }
    }
}

pub struct Youtube {
    cfg: YoutubeConfig,
    http: reqwest::Client,
}

impl Youtube {
    pub fn new(cfg: YoutubeConfig) -> Self {
        let http = http_client(&cfg.user_agent);
        Self { cfg, http }
    }
}

#[async_trait]
impl Extractor for Youtube {
    fn supports(&self, url: &str) -> bool {
        URL_RE.is_match(url)
    }

    async fn parse(&self, url: &str) -> Result<Content, ResolveError> {
        let caps = URL_RE
            .captures(url)
            .ok_or_else(|| ResolveError::InvalidUrl(url.to_string()))?;
        let video_id = &caps["video_id"];
        let comment_id = &caps["comment_id"];

        let api_url = format!(
            "{}/youtube/v3/comments?id={}&part=snippet&key={}",
            self.cfg.api_base, comment_id, self.cfg.api_key
        );
        let listing: CommentListing = get_json(&self.http, &api_url).await?;
        let snippet = listing
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet)
            .ok_or_else(|| ResolveError::malformed("no comment data in response"))?;

        let created_at = DateTime::parse_from_rfc3339(&snippet.published_at)
            .map_err(ResolveError::malformed)?
            .with_timezone(&Utc);

        Ok(Content {
            backlink: Link::bare(format!(
                "https://www.youtube.com/watch?v={video_id}&lc={comment_id}"
            )),
            text: Some(snippet.text_display),
            author: Some(Link::titled(
                snippet.author_channel_url,
                snippet.author_display_name,
            )),
            metrics: snippet.like_count.map(|n| vec![format!("👍 {n}")]),
            created_at: Some(created_at),
            media: None,
        })
    }
}

#[derive(Deserialize)]
struct CommentListing {
    #[serde(default)]
    items: Vec<CommentItem>,
}

#[derive(Deserialize)]
struct CommentItem {
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
struct CommentSnippet {
    #[serde(rename = "authorDisplayName")]
    author_display_name: String,
    #[serde(rename = "authorChannelUrl")]
    author_channel_url: String,
    #[serde(rename = "textDisplay")]
    text_display: String,
    #[serde(rename = "publishedAt")]
    published_at: String,
    #[serde(rename = "likeCount", default)]
    like_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_watch_urls_with_comment_id() {
        let y = Youtube::new(YoutubeConfig::new("key", "unfurl-test/0.1"));
        assert!(y.supports("https://www.youtube.com/watch?v=dQw4w9WgXcQ&lc=Ugx123abc"));
        assert!(y.supports("https://youtube.com/watch?v=dQw4w9WgXcQ&t=1s&lc=Ugx123abc"));
        assert!(!y.supports("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!y.supports("https://www.youtube.com/shorts/dQw4w9WgXcQ"));
    }
}
