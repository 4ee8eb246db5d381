//! Relevance search across per-collection Elasticsearch aliases.
//!
//! A [`search::DocumentSearch`] resolves collection handles to index aliases,
//! composes one boosted `bool` query, and runs it as a single multi-index
//! `_search`. Backend failures degrade to an empty result set.

pub mod config;
pub mod elastic;
pub mod markdown;
pub mod search;

pub const USER_AGENT: &str = concat!("docsearch/", env!("CARGO_PKG_VERSION"));
