// ABOUTME: Extractor for reddit comment permalinks and share short-links.
// ABOUTME: Holds the OAuth client-credentials token cache with double-checked refresh.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::http_client;
use crate::entity::{Content, Link};
use crate::error::ResolveError;
use crate::markup::{decode_entities, rewrite_tree};
use crate::resolve::Extractor;

static SHORT_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?reddit\.com/r/[a-zA-Z0-9_]+/s/[a-zA-Z0-9]+").unwrap()
});
static COMMENT_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https://www\.reddit\.com/r/([a-zA-Z0-9_]+)/comments/([a-zA-Z0-9_]+)(?:/[a-zA-Z0-9_%]+)?(?:/([a-zA-Z0-9_%]+))?/?(?:\?.*)?$",
    )
    .unwrap()
});
static PERMALINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/r/[^/]+?)/comments/[^/]+?/([^/]+?)/.*$").unwrap());

/// Refresh the cached token this long before the server-reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub token_url: String,
    pub api_base: String,
}

impl RedditConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            user_agent: user_agent.into(),
            token_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            api_base: "https://www.reddit.com".to_string(),
        }
    }
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

pub struct Reddit {
    cfg: RedditConfig,
    http: reqwest::Client,
    // Instance-local cache; concurrent parses share it through the lock.
    token: RwLock<Option<CachedToken>>,
}

impl Reddit {
    pub fn new(cfg: RedditConfig) -> Self {
        let http = http_client(&cfg.user_agent);
        Self {
            cfg,
            http,
            token: RwLock::new(None),
        }
    }

    /// Return a valid bearer token, re-authenticating when the cached one is
    /// within the expiry margin. Double-checked under the write lock so a
    /// burst of concurrent parses triggers exactly one re-authentication.
    async fn auth_token(&self) -> Result<String, ResolveError> {
        {
            let cached = self.token.read().await;
            if let Some(t) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
                return Ok(t.token.clone());
            }
        }

        let mut slot = self.token.write().await;
        if let Some(t) = slot.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(t.token.clone());
        }

        let fresh = self.authenticate().await?;
        let token = fresh.token.clone();
        *slot = Some(fresh);
        Ok(token)
    }

    async fn authenticate(&self) -> Result<CachedToken, ResolveError> {
        let resp = self
            .http
            .post(&self.cfg.token_url)
            .basic_auth(&self.cfg.client_id, Some(&self.cfg.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(ResolveError::transport)?;
        if !resp.status().is_success() {
            return Err(ResolveError::status(&self.cfg.token_url, resp.status()));
        }
        let token: TokenResponse = resp.json().await.map_err(ResolveError::malformed)?;
        let lifetime = Duration::from_secs(token.expires_in)
            .saturating_sub(TOKEN_EXPIRY_MARGIN)
            .max(Duration::from_secs(1));
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    async fn fetch_comment(
        &self,
        comment_id: &str,
        token: &str,
    ) -> Result<RedditComment, ResolveError> {
        let url = format!("{}/api/info.json?id=t1_{}", self.cfg.api_base, comment_id);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ResolveError::transport)?;
        if !resp.status().is_success() {
            return Err(ResolveError::status(&url, resp.status()));
        }
        let info: InfoResponse = resp.json().await.map_err(ResolveError::malformed)?;
        let child = info
            .data
            .children
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::malformed("no comments in response"))?;
        Ok(child.data)
    }

    /// Display text for the backlink, in the `/r/sub/title/` shape.
    fn permalink_text(permalink: &str) -> Option<String> {
        let caps = PERMALINK_RE.captures(permalink)?;
        Some(format!("{}/{}/", &caps[1], &caps[2]))
    }
}

#[async_trait]
impl Extractor for Reddit {
    fn supports(&self, url: &str) -> bool {
        SHORT_URL_RE.is_match(url) || COMMENT_URL_RE.is_match(url)
    }

    async fn parse(&self, url: &str) -> Result<Content, ResolveError> {
        let token = self.auth_token().await?;

        // Share short-links redirect to the full comment permalink.
        let target = if SHORT_URL_RE.is_match(url) {
            let resp = self
                .http
                .get(url)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(ResolveError::transport)?;
            resp.url().to_string()
        } else {
            url.to_string()
        };

        let comment_id = COMMENT_URL_RE
            .captures(&target)
            .and_then(|caps| caps.get(3))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ResolveError::InvalidUrl(target.clone()))?;

        let comment = self.fetch_comment(&comment_id, &token).await?;

        // body_html is the comment's HTML escaped one level inside the JSON
        // payload; decode before handing it to the rewriter.
        let body = decode_entities(&comment.body_html.replace("\\n", "\n"));
        let text = rewrite_tree(&body);

        let created_at = DateTime::from_timestamp(comment.created_utc as i64, 0);

        Ok(Content {
            backlink: Link {
                url: format!("https://www.reddit.com{}", comment.permalink),
                text: Self::permalink_text(&comment.permalink),
            },
            text: Some(text),
            author: Some(Link::titled(
                format!("https://www.reddit.com/user/{}/", comment.author),
                comment.author.clone(),
            )),
            metrics: Some(vec![
                format!("⬆️ {}", comment.ups),
                format!("⬇️ {}", comment.downs),
            ]),
            created_at,
            media: None,
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct InfoResponse {
    data: InfoListing,
}

#[derive(Deserialize)]
struct InfoListing {
    #[serde(default)]
    children: Vec<InfoChild>,
}

#[derive(Deserialize)]
struct InfoChild {
    data: RedditComment,
}

#[derive(Deserialize)]
struct RedditComment {
    author: String,
    created_utc: f64,
    body_html: String,
    ups: i64,
    downs: i64,
    permalink: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Reddit {
        Reddit::new(RedditConfig::new("id", "secret", "unfurl-test/0.1"))
    }

    #[test]
    fn supports_comment_and_short_urls() {
        let r = extractor();
        assert!(r.supports("https://www.reddit.com/r/rust/comments/abc123/some_title/def456/"));
        assert!(r.supports("https://www.reddit.com/r/rust/s/XyZ123"));
        assert!(!r.supports("https://www.reddit.com/r/rust/"));
        assert!(!r.supports("https://example.com/"));
    }

    #[test]
    fn permalink_text_is_sub_and_title() {
        assert_eq!(
            Reddit::permalink_text("/r/rust/comments/abc123/some_title/def456/"),
            Some("/r/rust/some_title/".to_string())
        );
        assert_eq!(Reddit::permalink_text("/r/rust/"), None);
    }
}
