// ABOUTME: Extractor for trashbox.ru topic comment anchors.
// ABOUTME: Joins the topic XML and the comments JSON fetched concurrently.

use async_trait::async_trait;
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::{get_text, http_client};
use crate::entity::{Content, Link};
use crate::error::ResolveError;
use crate::markup::decode_entities;
use crate::resolve::Extractor;

static TOPIC_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<trashTopicId>([0-9]*)</trashTopicId>").unwrap());
static CDATA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());
static IMG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]*src=["']([^"']*)["'][^>]*>"#).unwrap());

#[derive(Debug, Clone)]
pub struct TrashboxConfig {
    pub user_agent: String,
    pub api_base: String,
}

impl TrashboxConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            api_base: "https://trashbox.ru".to_string(),
        }
    }
}

pub struct Trashbox {
    cfg: TrashboxConfig,
    http: reqwest::Client,
}

impl Trashbox {
    pub fn new(cfg: TrashboxConfig) -> Self {
        let http = http_client(&cfg.user_agent);
        Self { cfg, http }
    }
}

/// The comment anchor carries the id as the third `_`-separated part.
fn parse_anchor(url: &Url) -> Option<String> {
    let fragment = url.fragment()?;
    let mut parts = fragment.split('_');
    let id = parts.nth(2)?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Bodies arrive as loose HTML; flatten the few tags the origin emits.
fn format_content(content: &str) -> String {
    let content = IMG_RE.replace_all(content, |caps: &regex::Captures<'_>| {
        format!(
            "<a href=\"https://trashbox.ru/{}\">🖼 Image</a>",
            caps[1].trim_start_matches('/')
        )
    });
    let content = content
        .replace("<br/>", "\n")
        .replace("<li>", "- ")
        .replace("</li>", "\n");
    decode_entities(&content)
}

#[async_trait]
impl Extractor for Trashbox {
    fn supports(&self, url: &str) -> bool {
        url.contains("trashbox.ru") && url.contains("#div_comment_")
    }

    async fn parse(&self, url: &str) -> Result<Content, ResolveError> {
        let parsed = Url::parse(url).map_err(|_| ResolveError::InvalidUrl(url.to_string()))?;
        let topic_id = parsed
            .path_segments()
            .and_then(|mut segments| segments.nth(1))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ResolveError::InvalidUrl(url.to_string()))?;
        let comment_id =
            parse_anchor(&parsed).ok_or_else(|| ResolveError::InvalidUrl(url.to_string()))?;

        let topic_url = format!("{}/api_topics/{}", self.cfg.api_base, topic_id);
        let comments_url = format!(
            "{}/api_noauth.php?action=comments&topic_id={}",
            self.cfg.api_base, topic_id
        );

        // Both endpoints key off the topic id from the URL; fetch them
        // concurrently and fail the extraction if either side fails.
        let (topic_xml, comments_json) = tokio::try_join!(
            get_text(&self.http, &topic_url),
            get_text(&self.http, &comments_url),
        )?;

        if !TOPIC_ID_RE.is_match(&topic_xml) {
            return Err(ResolveError::malformed("topic id missing from topic feed"));
        }
        let title = CDATA_RE
            .captures_iter(&topic_xml)
            .nth(1)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| ResolveError::malformed("topic title missing from topic feed"))?;

        let listing: CommentsResponse =
            serde_json::from_str(&comments_json).map_err(ResolveError::malformed)?;
        let comment = listing
            .comments
            .into_iter()
            .find(|c| c.comm_id == comment_id)
            .ok_or_else(|| ResolveError::malformed("comment not found in response"))?;

        let posted: i64 = comment
            .posted
            .parse()
            .map_err(|_| ResolveError::malformed("unparsable posted timestamp"))?;

        Ok(Content {
            backlink: Link::titled(url, title),
            text: Some(format_content(&comment.content)),
            author: Some(Link::titled(
                format!("https://trashbox.ru/users/{}/", comment.login),
                comment.login.clone(),
            )),
            metrics: Some(vec![
                format!("👍 {}", comment.votes1),
                format!("👎 {}", comment.votes0.trim_start_matches('-')),
            ]),
            created_at: DateTime::from_timestamp(posted, 0),
            media: None,
        })
    }
}

#[derive(Deserialize)]
struct CommentsResponse {
    #[serde(default)]
    comments: Vec<TrashboxComment>,
}

#[derive(Deserialize)]
struct TrashboxComment {
    comm_id: String,
    login: String,
    posted: String,
    content: String,
    votes1: String,
    votes0: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn supports_comment_anchors_only() {
        let t = Trashbox::new(TrashboxConfig::new("unfurl-test/0.1"));
        assert!(t.supports("https://trashbox.ru/topics/170452/app#div_comment_900100"));
        assert!(!t.supports("https://trashbox.ru/topics/170452/app"));
        assert!(!t.supports("https://example.com/#div_comment_1"));
    }

    #[test]
    fn anchor_yields_comment_id() {
        let url = Url::parse("https://trashbox.ru/topics/170452/app#div_comment_900100").unwrap();
        assert_eq!(parse_anchor(&url), Some("900100".to_string()));
        let bad = Url::parse("https://trashbox.ru/topics/170452/app#comments").unwrap();
        assert_eq!(parse_anchor(&bad), None);
    }

    #[test]
    fn content_images_become_placeholder_links() {
        let got = format_content(r#"see <img class="pic" src="/files/x.png"> here"#);
        assert_eq!(
            got,
            "see <a href=\"https://trashbox.ru/files/x.png\">🖼 Image</a> here"
        );
    }

    #[test]
    fn content_lists_and_breaks_flatten() {
        let got = format_content("a<br/><li>one</li><li>two</li>");
        assert_eq!(got, "a\n- one\n- two\n");
    }

    #[test]
    fn content_entities_are_decoded() {
        assert_eq!(format_content("a &amp; b"), "a & b");
    }
}
