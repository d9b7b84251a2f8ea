// ABOUTME: Extractor for dtf.ru and vc.ru comment permalinks.
// ABOUTME: Locates the comment in the shared comments API and maps reaction counters.

use async_trait::async_trait;
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{get_json, http_client};
use crate::entity::{Content, Link};
use crate::error::ResolveError;
use crate::markup::rewrite_tree;
use crate::resolve::Extractor;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(?P<domain>dtf\.ru|vc\.ru)/[^?]+\?comment=(?P<comment_id>\d+)").unwrap()
});

/// Reaction id to emoji, as the origin's web client renders them.
fn reaction_emoji(id: u64) -> Option<&'static str> {
    match id {
        1 => Some("❤️"),
        2 => Some("🔥"),
        3 => Some("🥲"),
        4 => Some("😂"),
        5 => Some("😡"),
        7 => Some("😱"),
        9 => Some("🍿"),
        10 => Some("💸"),
        22 => Some("😎"),
        23 => Some("😍"),
        24 => Some("👀"),
        41 => Some("💊"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct CmttConfig {
    pub user_agent: String,
    /// Override for the per-domain `https://api.{domain}` origin, used in tests.
    pub api_origin: Option<String>,
}

impl CmttConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            api_origin: None,
        }
    }
}

pub struct Cmtt {
    cfg: CmttConfig,
    http: reqwest::Client,
}

impl Cmtt {
    pub fn new(cfg: CmttConfig) -> Self {
        let http = http_client(&cfg.user_agent);
        Self { cfg, http }
    }

    fn api_url(&self, domain: &str, comment_id: u64) -> String {
        match &self.cfg.api_origin {
            Some(origin) => format!("{origin}/v2.5/comments?commentId={comment_id}"),
            None => format!("https://api.{domain}/v2.5/comments?commentId={comment_id}"),
        }
    }
}

#[async_trait]
impl Extractor for Cmtt {
    fn supports(&self, url: &str) -> bool {
        URL_RE.is_match(url)
    }

    async fn parse(&self, url: &str) -> Result<Content, ResolveError> {
        let caps = URL_RE
            .captures(url)
            .ok_or_else(|| ResolveError::InvalidUrl(url.to_string()))?;
        let domain = caps.name("domain").map(|m| m.as_str()).unwrap_or_default();
        let comment_id: u64 = caps["comment_id"]
            .parse()
            .map_err(|_| ResolveError::InvalidUrl(url.to_string()))?;

        let listing: CommentsResponse =
            get_json(&self.http, &self.api_url(domain, comment_id)).await?;
        let comment = listing
            .result
            .items
            .into_iter()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| ResolveError::malformed("comment not found in response"))?;

        let mut reactions = Vec::new();
        for counter in &comment.reactions.counters {
            if counter.count > 0 {
                if let Some(emoji) = reaction_emoji(counter.id) {
                    reactions.push(format!("{emoji} {}", counter.count));
                }
            }
        }

        Ok(Content {
            backlink: Link::titled(
                format!("https://{domain}/{}?comment={comment_id}", comment.entry.id),
                comment.entry.title,
            ),
            // Bodies are usually plain text, for which the rewrite is a
            // no-op beyond escaping; some comments embed simple markup.
            text: Some(rewrite_tree(&comment.text)),
            author: Some(Link::titled(
                format!("https://{domain}/u/{}/", comment.author.id),
                comment.author.name,
            )),
            metrics: if reactions.is_empty() {
                None
            } else {
                Some(reactions)
            },
            created_at: DateTime::from_timestamp(comment.date, 0),
            media: None,
        })
    }
}

#[derive(Deserialize)]
struct CommentsResponse {
    result: CommentsResult,
}

#[derive(Deserialize)]
struct CommentsResult {
    #[serde(default)]
    items: Vec<Comment>,
}

#[derive(Deserialize)]
struct Comment {
    id: u64,
    author: Author,
    entry: Entry,
    date: i64,
    text: String,
    reactions: Reactions,
}

#[derive(Deserialize)]
struct Author {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
struct Entry {
    id: u64,
    title: String,
}

#[derive(Deserialize)]
struct Reactions {
    #[serde(default)]
    counters: Vec<ReactionCounter>,
}

#[derive(Deserialize)]
struct ReactionCounter {
    id: u64,
    count: u64,
}
