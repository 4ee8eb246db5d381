//! Elasticsearch transport: the `_search` wire format and an HTTP backend.

pub mod client;
pub mod types;

pub use client::{BackendError, ElasticClient, SearchBackend};
pub use types::SearchResponse;
