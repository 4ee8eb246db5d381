use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(rename = "_shards")]
    pub shards: Option<Shards>,
}

#[derive(Debug, Deserialize)]
pub struct Hits {
    pub total: Option<TotalHits>,
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// `hits.total` is a bare count before Elasticsearch 7 and an object after.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object {
        value: u64,
        relation: Option<String>,
    },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Count(n) => *n,
            TotalHits::Object { value, .. } => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Shards {
    pub total: u32,
    pub successful: u32,
    #[serde(default)]
    pub failed: u32,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub status: Option<u16>,
}

/// Older servers answer with a plain string, newer with a structured cause.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Cause {
        #[serde(rename = "type")]
        kind: Option<String>,
        reason: Option<String>,
        #[serde(default)]
        root_cause: Vec<ErrorCause>,
    },
}

#[derive(Debug, Deserialize)]
pub struct ErrorCause {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub reason: Option<String>,
}

impl ErrorDetail {
    pub fn message(&self) -> String {
        match self {
            ErrorDetail::Message(m) => m.clone(),
            ErrorDetail::Cause {
                kind,
                reason,
                root_cause,
            } => {
                let reason = reason
                    .clone()
                    .or_else(|| root_cause.iter().find_map(|c| c.reason.clone()))
                    .unwrap_or_else(|| "Unknown error".to_string());
                match kind {
                    Some(kind) => format!("{kind}: {reason}"),
                    None => reason,
                }
            }
        }
    }
}
