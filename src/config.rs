use std::env;
use std::fmt;
use std::time::Duration;

use crate::search::SearchSettings;
use crate::search::query::MinMatchRatio;

const DEFAULT_URL: &str = "http://localhost:9200";
const DEFAULT_NAMESPACE: &str = "i14y-documents";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid Elasticsearch URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// HTTP basic auth for the search cluster.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

/// Runtime configuration.
///
/// Read from the environment:
/// - `ELASTICSEARCH_URL`: cluster base URL (default `http://localhost:9200`)
/// - `ELASTICSEARCH_USERNAME` / `ELASTICSEARCH_PASSWORD`: basic auth (optional)
/// - `DOCSEARCH_NAMESPACE`: alias prefix (default `i14y-documents`)
/// - `DOCSEARCH_TIMEOUT_SECS`: per-request timeout (default 10)
/// - `DOCSEARCH_MIN_MATCH_RATIO`: share of query tokens a hit must contain (default 6/7)
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub credentials: Option<Credentials>,
    pub namespace: String,
    pub timeout: Duration,
    pub min_match: MinMatchRatio,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            credentials: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            min_match: MinMatchRatio::DEFAULT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Config::default();

        if let Some(url) = get("ELASTICSEARCH_URL") {
            config = config.with_url(&url)?;
        }

        if let Some(username) = get("ELASTICSEARCH_USERNAME") {
            config.credentials = Some(Credentials {
                username,
                password: Secret::new(get("ELASTICSEARCH_PASSWORD").unwrap_or_default()),
            });
        }

        if let Some(namespace) = get("DOCSEARCH_NAMESPACE") {
            config.namespace = namespace;
        }

        if let Some(raw) = get("DOCSEARCH_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "DOCSEARCH_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = get("DOCSEARCH_MIN_MATCH_RATIO") {
            config.min_match = raw
                .parse::<f64>()
                .ok()
                .and_then(MinMatchRatio::new)
                .ok_or(ConfigError::InvalidValue {
                    var: "DOCSEARCH_MIN_MATCH_RATIO",
                    value: raw.clone(),
                })?;
        }

        Ok(config)
    }

    /// Base URL must be HTTP(S); a trailing slash is dropped.
    pub fn with_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason,
        };
        let parsed = url::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{other}'"))),
        }
        self.url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            namespace: self.namespace.clone(),
            min_match: self.min_match,
        }
    }
}
