// ABOUTME: Extractor for habr.com article comment permalinks.
// ABOUTME: Fetches article metadata and the comment map concurrently and joins them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{get_json, http_client};
use crate::entity::{Content, Link};
use crate::error::ResolveError;
use crate::markup::rewrite_stream;
use crate::resolve::Extractor;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://habr\.com/[^/]+/[^/]+/(\d+)/#comment_(\d+)").unwrap());

#[derive(Debug, Clone)]
pub struct HabrConfig {
    pub user_agent: String,
    pub api_base: String,
}

impl HabrConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            api_base: "https://habr.com".to_string(),
        }
    }
}

pub struct Habr {
    cfg: HabrConfig,
    http: reqwest::Client,
}

impl Habr {
    pub fn new(cfg: HabrConfig) -> Self {
        let http = http_client(&cfg.user_agent);
        Self { cfg, http }
    }
}

#[async_trait]
impl Extractor for Habr {
    fn supports(&self, url: &str) -> bool {
        URL_RE.is_match(url)
    }

    async fn parse(&self, url: &str) -> Result<Content, ResolveError> {
        let caps = URL_RE
            .captures(url)
            .ok_or_else(|| ResolveError::InvalidUrl(url.to_string()))?;
        let article_id = &caps[1];
        let comment_id = &caps[2];

        let article_url = format!("{}/kek/v2/articles/{}/", self.cfg.api_base, article_id);
        let comments_url = format!(
            "{}/kek/v2/articles/{}/comments/split/guest/",
            self.cfg.api_base, article_id
        );

        // Independent fetches; serializing them would just add latency.
        // Either failure fails the whole extraction.
        let (article, comments): (HabrArticle, HabrComments) = tokio::try_join!(
            get_json(&self.http, &article_url),
            get_json(&self.http, &comments_url),
        )?;

        let comment = comments
            .comment_refs
            .get(comment_id)
            .ok_or_else(|| ResolveError::malformed(format!("comment {comment_id} not present")))?;

        let created_at = DateTime::parse_from_rfc3339(&comment.time_published)
            .map_err(ResolveError::malformed)?
            .with_timezone(&Utc);

        Ok(Content {
            backlink: Link::titled(
                format!("https://habr.com/ru/articles/{article_id}/#comment_{comment_id}"),
                article.title_html,
            ),
            text: Some(rewrite_stream(&comment.message)?),
            author: Some(Link::titled(
                format!("https://habr.com/ru/users/{}/", comment.author.alias),
                comment.author.alias.clone(),
            )),
            metrics: None,
            created_at: Some(created_at),
            media: None,
        })
    }
}

#[derive(Deserialize)]
struct HabrArticle {
    #[serde(rename = "titleHtml")]
    title_html: String,
}

#[derive(Deserialize)]
struct HabrComments {
    #[serde(rename = "commentRefs", default)]
    comment_refs: HashMap<String, HabrComment>,
}

#[derive(Deserialize)]
struct HabrComment {
    author: HabrAuthor,
    #[serde(rename = "timePublished")]
    time_published: String,
    message: String,
}

#[derive(Deserialize)]
struct HabrAuthor {
    alias: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_comment_anchors_only() {
        let h = Habr::new(HabrConfig::new("unfurl-test/0.1"));
        assert!(h.supports("https://habr.com/ru/articles/812345/#comment_26000001"));
        assert!(!h.supports("https://habr.com/ru/articles/812345/"));
        assert!(!h.supports("https://example.com/#comment_1"));
    }
}
