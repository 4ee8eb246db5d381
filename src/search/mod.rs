//! Document search: index resolution, query composition, execution and results.

pub mod executor;
pub mod lang;
pub mod query;
pub mod request;
pub mod resolver;
pub mod results;

pub use lang::{Lang, UnknownLang};
pub use query::{MinMatchRatio, QueryDocument};
pub use request::{SearchRequest, SiteFilter};
pub use resolver::{IndexId, ResolvedIndexSet};
pub use results::{SearchResult, SearchResults};

use tracing::{debug, info};

use crate::elastic::SearchBackend;
use query::ComposeOptions;

/// Caller errors. Backend failures are not represented here: they degrade
/// to an empty result set inside the executor.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl From<UnknownLang> for SearchError {
    fn from(e: UnknownLang) -> Self {
        SearchError::InvalidRequest(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Prefix of every collection alias, e.g. `production-i14y-documents`.
    pub namespace: String,
    pub min_match: MinMatchRatio,
}

/// Searches document collections through a `SearchBackend`.
///
/// Holds no per-request state; clone it or share it across tasks.
#[derive(Debug, Clone)]
pub struct DocumentSearch<B> {
    backend: B,
    settings: SearchSettings,
}

impl<B: SearchBackend> DocumentSearch<B> {
    pub fn new(backend: B, settings: SearchSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Validation errors are returned before any backend call. Once the
    /// request is valid this always yields a result set.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults, SearchError> {
        request.validate_page()?;
        let indexes = resolver::resolve(&self.settings.namespace, request.handles())?;
        let options = ComposeOptions {
            size: request.size(),
            offset: request.offset(),
            site_filters: request.site_filters(),
            min_match: self.settings.min_match,
        };
        let body = query::compose(request.query(), request.language(), &options)?;

        info!(
            handles = ?request.handles(),
            language = %request.language(),
            query = %request.query(),
            "document search"
        );

        let results = executor::execute(&self.backend, &indexes, &body).await;
        debug!(
            total = results.total(),
            returned = results.len(),
            "document search complete"
        );
        Ok(results)
    }

    /// String-typed entry point for callers that have not parsed the language.
    pub async fn search_str<S: AsRef<str>>(
        &self,
        handles: &[S],
        language: &str,
        query: &str,
    ) -> Result<SearchResults, SearchError> {
        let language: Lang = language.parse()?;
        let request = SearchRequest::new(handles.iter().map(|h| h.as_ref()), language, query);
        self.search(&request).await
    }
}
