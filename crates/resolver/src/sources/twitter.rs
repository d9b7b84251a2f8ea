// ABOUTME: Extractor for tweet status URLs via the fxtwitter mirror API.
// ABOUTME: Maps engagement counters, timestamps, and attached media variants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{get_json, http_client};
use crate::entity::{Content, Link, Media};
use crate::error::ResolveError;
use crate::resolve::Extractor;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:x\.com|twitter\.com|fxtwitter\.com|fixupx\.com)/(?P<username>[^/]+)/status/(?P<status_id>\d+)",
    )
    .unwrap()
});
// Display names often carry a redundant "(@handle)" suffix.
static NAME_HANDLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(@[^)]+\)").unwrap());

const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub user_agent: String,
    pub api_base: String,
}

impl TwitterConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            api_base: "https://api.fxtwitter.com".to_string(),
        }
    }
}

pub struct Twitter {
    cfg: TwitterConfig,
    http: reqwest::Client,
}

impl Twitter {
    pub fn new(cfg: TwitterConfig) -> Self {
        let http = http_client(&cfg.user_agent);
        Self { cfg, http }
    }
}

/// Compact a counter the way the origin displays it ("12", "3K", "1M").
fn format_counter(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.0}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.0}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

#[async_trait]
impl Extractor for Twitter {
    fn supports(&self, url: &str) -> bool {
        URL_RE.is_match(url)
    }

    async fn parse(&self, url: &str) -> Result<Content, ResolveError> {
        let caps = URL_RE
            .captures(url)
            .ok_or_else(|| ResolveError::InvalidUrl(url.to_string()))?;
        let status_id = &caps["status_id"];

        let api_url = format!("{}/status/{}", self.cfg.api_base, status_id);
        let payload: FxResponse = get_json(&self.http, &api_url).await?;
        if payload.code != 200 {
            return Err(ResolveError::malformed(format!(
                "embedded status code {}",
                payload.code
            )));
        }
        let tweet = payload
            .tweet
            .ok_or_else(|| ResolveError::malformed("missing tweet object"))?;

        let created_at = DateTime::parse_from_str(&tweet.created_at, CREATED_AT_FORMAT)
            .map_err(ResolveError::malformed)?
            .with_timezone(&Utc);

        let author_name = NAME_HANDLE_RE.replace_all(&tweet.author.name, "").to_string();

        let metrics = vec![
            format!("💬 {}", format_counter(tweet.replies)),
            format!("🔁 {}", format_counter(tweet.retweets)),
            format!("❤️ {}", format_counter(tweet.likes)),
            format!("📊 {}", format_counter(tweet.views)),
        ];

        let mut media = Vec::new();
        if let Some(all) = tweet.media.map(|m| m.all) {
            for item in all {
                match item.kind.as_str() {
                    "photo" => media.push(Media::Photo {
                        resource_url: item.url,
                        thumbnail_url: None,
                        caption: None,
                    }),
                    "video" => media.push(Media::Video {
                        resource_url: item.url,
                        mime_type: "video/mp4".to_string(),
                        thumbnail_url: item
                            .thumbnail_url
                            .ok_or_else(|| ResolveError::malformed("video without thumbnail"))?,
                    }),
                    "gif" => media.push(Media::Gif {
                        resource_url: item.url,
                        mime_type: "video/mp4".to_string(),
                        thumbnail_url: item
                            .thumbnail_url
                            .ok_or_else(|| ResolveError::malformed("gif without thumbnail"))?,
                    }),
                    _ => {}
                }
            }
        }

        Ok(Content {
            backlink: Link::bare(format!(
                "https://x.com/{}/status/{}",
                tweet.author.screen_name, status_id
            )),
            text: tweet.text.filter(|t| !t.is_empty()),
            author: Some(Link::titled(
                format!("https://x.com/{}", tweet.author.screen_name),
                author_name,
            )),
            metrics: Some(metrics),
            created_at: Some(created_at),
            media: if media.is_empty() { None } else { Some(media) },
        })
    }
}

#[derive(Deserialize)]
struct FxResponse {
    code: i64,
    #[serde(default)]
    tweet: Option<FxTweet>,
}

#[derive(Deserialize)]
struct FxTweet {
    author: FxAuthor,
    #[serde(default)]
    text: Option<String>,
    replies: u64,
    retweets: u64,
    likes: u64,
    views: u64,
    created_at: String,
    #[serde(default)]
    media: Option<FxMedia>,
}

#[derive(Deserialize)]
struct FxAuthor {
    screen_name: String,
    name: String,
}

#[derive(Deserialize)]
struct FxMedia {
    #[serde(default)]
    all: Vec<FxMediaItem>,
}

#[derive(Deserialize)]
struct FxMediaItem {
    #[serde(rename = "type")]
    kind: String,
    url: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
}
