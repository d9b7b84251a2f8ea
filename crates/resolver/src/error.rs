// ABOUTME: Error types for URL resolution.
// ABOUTME: Provides the ResolveError enum covering dispatch, fetch, and markup failures.

use thiserror::Error;

/// Errors surfaced by the resolver and its extractors.
///
/// Failures propagate to the caller untouched: no retry, no default
/// substitution. The only local recovery anywhere in the core is the
/// token-cache refresh on expiry, which is not a failure path.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The URL does not match the extractor's expected shape even though a
    /// coarse `supports` check passed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// No registered extractor supports the URL.
    #[error("no extractor found for: {0}")]
    ParserNotFound(String),

    /// A remote fetch failed or returned a payload missing a required field.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The streaming markup reader hit input it could not process.
    #[error("markup error: {0}")]
    Markup(String),
}

impl ResolveError {
    /// Upstream failure from a non-success HTTP status.
    pub fn status(url: &str, status: reqwest::StatusCode) -> Self {
        ResolveError::Upstream(format!("{url} returned status {status}"))
    }

    /// Upstream failure from a transport-level error.
    pub fn transport(err: reqwest::Error) -> Self {
        ResolveError::Upstream(err.to_string())
    }

    /// Upstream payload was parsed but is missing a required field.
    pub fn malformed(what: impl std::fmt::Display) -> Self {
        ResolveError::Upstream(format!("malformed response: {what}"))
    }
}
