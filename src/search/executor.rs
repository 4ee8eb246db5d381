use tracing::{debug, warn};

use super::query::QueryDocument;
use super::resolver::ResolvedIndexSet;
use super::results::SearchResults;
use crate::elastic::{BackendError, SearchBackend};

/// Runs one multi-index search. Backend failures are logged and become
/// the empty result set; they never reach the caller.
pub async fn execute(
    backend: &impl SearchBackend,
    indexes: &ResolvedIndexSet,
    query: &QueryDocument,
) -> SearchResults {
    try_execute(backend, indexes, query)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, indexes = indexes.len(), "search failed, returning no results");
            SearchResults::empty()
        })
}

pub(crate) async fn try_execute(
    backend: &impl SearchBackend,
    indexes: &ResolvedIndexSet,
    query: &QueryDocument,
) -> Result<SearchResults, BackendError> {
    if query.matches_nothing() {
        debug!("query has no terms, skipping backend call");
        return Ok(SearchResults::empty());
    }

    let response = backend.search(indexes.as_slice(), query).await?;

    if response.timed_out {
        warn!("search timed out on some shards, results may be partial");
    }
    if let Some(shards) = &response.shards
        && shards.failed > 0
    {
        warn!(
            failed = shards.failed,
            total = shards.total,
            "search failed on some shards"
        );
    }

    Ok(SearchResults::from_response(response))
}
