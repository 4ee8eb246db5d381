use serde::Serialize;
use serde_json::{Map, Value};

use crate::elastic::types::{Hit, SearchResponse};

/// One hit. Core fields are empty strings when the document lacks them;
/// every other `_source` field is kept in `extra`, which serializes as its
/// own object so source keys never shadow `id`, `score` or `index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    title: String,
    description: String,
    language: String,
    path: String,
    score: f64,
    index: String,
    id: String,
    extra: Map<String, Value>,
}

impl SearchResult {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Concrete index the hit came from (the alias target, not the alias).
    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Looks up a core or passthrough field by name.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "title" => Some(Value::from(self.title.as_str())),
            "description" => Some(Value::from(self.description.as_str())),
            "language" => Some(Value::from(self.language.as_str())),
            "path" => Some(Value::from(self.path.as_str())),
            "score" => Some(Value::from(self.score)),
            _ => self.extra.get(name).cloned(),
        }
    }

    fn from_hit(hit: Hit) -> Self {
        let mut source = hit.source;
        let language = take_string(&mut source, "language");
        let title = take_text(&mut source, "title", &language);
        let description = take_text(&mut source, "description", &language);
        let path = take_string(&mut source, "path");

        Self {
            title,
            description,
            language,
            path,
            score: hit.score.unwrap_or(0.0),
            index: hit.index,
            id: hit.id,
            extra: source,
        }
    }
}

fn take_string(source: &mut Map<String, Value>, key: &str) -> String {
    match source.remove(key) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Text fields may be stored only under their language-suffixed name.
fn take_text(source: &mut Map<String, Value>, key: &str, language: &str) -> String {
    if source.contains_key(key) || language.is_empty() {
        return take_string(source, key);
    }
    let suffixed = format!("{key}_{language}");
    take_string(source, &suffixed)
}

/// Hits of one search, best first.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchResults {
    total: u64,
    results: Vec<SearchResult>,
}

impl SearchResults {
    /// The degraded outcome when the backend cannot answer.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hits are stable-sorted by descending score, so equal scores keep
    /// backend order. `total` is the backend's count, or the hit count if it
    /// reported none.
    pub fn from_response(response: SearchResponse) -> Self {
        let reported = response.hits.total.as_ref().map(|t| t.value());
        let mut results: Vec<SearchResult> = response
            .hits
            .hits
            .into_iter()
            .map(SearchResult::from_hit)
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        Self {
            total: reported.unwrap_or(results.len() as u64),
            results,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
