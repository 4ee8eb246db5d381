use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ErrorResponse, SearchResponse};
use crate::config::{Config, Credentials};
use crate::search::query::QueryDocument;
use crate::search::resolver::IndexId;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("no indexes to search")]
    NoIndexes,

    #[error("search backend error ({code}): {message}")]
    Status { code: u16, message: String },

    #[error("undecodable search response: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Multi-index full-text search capability.
/// Implemented by `ElasticClient` for production; mock implementations used in tests.
pub trait SearchBackend {
    async fn search(
        &self,
        indexes: &[IndexId],
        body: &QueryDocument,
    ) -> Result<SearchResponse, BackendError>;
}

impl<T: SearchBackend> SearchBackend for &T {
    async fn search(
        &self,
        indexes: &[IndexId],
        body: &QueryDocument,
    ) -> Result<SearchResponse, BackendError> {
        (**self).search(indexes, body).await
    }
}

/// HTTP client for the Elasticsearch `_search` endpoint.
///
/// The wrapped `reqwest::Client` is pooled and cheap to clone, so one
/// `ElasticClient` serves concurrent searches.
#[derive(Clone, Debug)]
pub struct ElasticClient {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl ElasticClient {
    pub fn from_config(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.url.clone(),
            credentials: config.credentials.clone(),
            timeout: config.timeout,
        }
    }

    pub fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Index names are validated by the resolver, so they are safe to
    /// interpolate into the path. Missing aliases are skipped rather than
    /// failing the whole request.
    fn search_url(&self, indexes: &[IndexId]) -> String {
        let joined = indexes
            .iter()
            .map(IndexId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}/{joined}/_search?ignore_unavailable=true", self.base_url)
    }
}

impl SearchBackend for ElasticClient {
    async fn search(
        &self,
        indexes: &[IndexId],
        body: &QueryDocument,
    ) -> Result<SearchResponse, BackendError> {
        if indexes.is_empty() {
            return Err(BackendError::NoIndexes);
        }

        let url = self.search_url(indexes);
        let mut request = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT)
            .json(body)
            .timeout(self.timeout);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(
                &credentials.username,
                Some(credentials.password.expose()),
            );
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(&text);
            warn!(status = %status, %message, "search backend returned an error");
            return Err(BackendError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))?;
        debug!(
            indexes = indexes.len(),
            hits = parsed.hits.hits.len(),
            "search backend responded"
        );
        Ok(parsed)
    }
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message())
        .unwrap_or_else(|_| body.chars().take(200).collect())
}
