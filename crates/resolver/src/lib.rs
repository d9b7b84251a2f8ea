// ABOUTME: Main library entry point for the unfurl content resolver.
// ABOUTME: Re-exports the content model, ResolveError, Extractor trait, and Resolver.

//! unfurl-resolver - resolves a pasted URL into a normalized content record.
//!
//! A [`Resolver`] holds an ordered list of source extractors. The first
//! extractor whose `supports` predicate matches a URL fetches the remote
//! data and maps it onto the [`Content`] model; rich-text comment bodies
//! are rewritten into the target chat markup on the way.
//!
//! # Example
//!
//! ```no_run
//! use unfurl_resolver::sources::habr::{Habr, HabrConfig};
//! use unfurl_resolver::Resolver;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), unfurl_resolver::ResolveError> {
//!     let resolver = Resolver::new(vec![Box::new(Habr::new(HabrConfig::new("unfurl/0.1")))]);
//!     let content = resolver
//!         .parse("https://habr.com/ru/articles/812345/#comment_26000001")
//!         .await?;
//!     println!("{:?}", content.backlink);
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;
pub mod markup;
pub mod meta;
pub mod resolve;
pub mod sources;

pub use crate::entity::{Content, Link, Media};
pub use crate::error::ResolveError;
pub use crate::resolve::{Extractor, Resolver};
