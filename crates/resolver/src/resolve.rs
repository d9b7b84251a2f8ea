// ABOUTME: The Extractor contract and the dispatching Resolver.
// ABOUTME: Picks the first registered extractor whose supports() matches a URL.

use async_trait::async_trait;

use crate::entity::Content;
use crate::error::ResolveError;

/// One source-specific extractor: turns one class of URL into a Content value.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Pure predicate, no I/O, never fails.
    fn supports(&self, url: &str) -> bool;

    /// Fetch and map the URL onto the content model. May perform I/O.
    async fn parse(&self, url: &str) -> Result<Content, ResolveError>;
}

/// Dispatches a URL to the first supporting extractor, in registration order.
///
/// Registration order is load-bearing: support predicates may overlap, so
/// maximally specific patterns must be registered ahead of permissive ones.
/// The first match is used exclusively; its failure is returned as-is with
/// no fallback to later extractors.
pub struct Resolver {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Resolver {
    pub fn new(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { extractors }
    }

    /// True iff at least one registered extractor supports the URL.
    pub fn supports(&self, url: &str) -> bool {
        self.extractors.iter().any(|e| e.supports(url))
    }

    /// Resolve a URL through the first supporting extractor.
    pub async fn parse(&self, url: &str) -> Result<Content, ResolveError> {
        for extractor in &self.extractors {
            if extractor.supports(url) {
                return extractor.parse(url).await;
            }
        }
        Err(ResolveError::ParserNotFound(url.to_string()))
    }
}
