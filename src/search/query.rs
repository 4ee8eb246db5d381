//! Builds the `_search` body for one request.
//!
//! Inclusion is decided by a term-centric recall clause: every distinct query
//! token is matched across the analyzed title, description and URL basename,
//! and a document must match `required` of them. Two further clauses only add
//! score: a phrase match on the analyzed fields and an all-terms match on the
//! unstemmed fields. Language is a hard filter.
//!
//! A token the field analyzer drops entirely (a stop-word such as "the")
//! counts as matched, so it never raises the bar a document has to clear.

use serde::Serialize;
use serde_json::{Value, json};

use super::SearchError;
use super::lang::Lang;
use super::request::SiteFilter;

pub const MAX_QUERY_CHARS: usize = 2048;
pub const PHRASE_BOOST: f64 = 4.0;
pub const EXACT_BOOST: f64 = 2.0;

const BASENAME_FIELD: &str = "basename";
const LANGUAGE_FIELD: &str = "language";
const DOMAIN_FIELD: &str = "domain_name";
const URL_PATH_FIELD: &str = "url_path";
const TEXT_FIELDS: [&str; 2] = ["title", "description"];

/// Share of distinct query tokens a document must contain, in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMatchRatio(f64);

impl MinMatchRatio {
    /// Six out of seven: a seven-word query may miss one word.
    pub const DEFAULT: MinMatchRatio = MinMatchRatio(6.0 / 7.0);

    pub fn new(ratio: f64) -> Option<Self> {
        (ratio > 0.0 && ratio <= 1.0).then_some(Self(ratio))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `max(1, floor(tokens * ratio))`, with a small tolerance so that
    /// `7 * (6/7)` lands on 6 rather than 5.999...
    pub fn required(self, tokens: usize) -> usize {
        let exact = tokens as f64 * self.0;
        ((exact + 1e-9).floor() as usize).clamp(1, tokens.max(1))
    }
}

impl Default for MinMatchRatio {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone)]
pub struct ComposeOptions<'a> {
    pub size: u32,
    pub offset: u32,
    pub site_filters: &'a [SiteFilter],
    pub min_match: MinMatchRatio,
}

impl Default for ComposeOptions<'_> {
    fn default() -> Self {
        Self {
            size: super::request::DEFAULT_PAGE_SIZE,
            offset: 0,
            site_filters: &[],
            min_match: MinMatchRatio::DEFAULT,
        }
    }
}

/// A `_search` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryDocument(Value);

impl QueryDocument {
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// True when the body can match nothing (empty or token-free query).
    pub fn matches_nothing(&self) -> bool {
        self.0["query"]["bool"]["must"][0].get("match_none").is_some()
    }
}

pub fn compose(
    query: &str,
    language: Lang,
    options: &ComposeOptions<'_>,
) -> Result<QueryDocument, SearchError> {
    validate_query(query)?;

    let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
    let tokens = distinct_tokens(&normalized);
    let filter = filters(language, options.site_filters);

    let bool_query = if tokens.is_empty() {
        json!({
            "must": [{ "match_none": {} }],
            "filter": filter,
        })
    } else {
        json!({
            "must": [recall_clause(&tokens, language, options.min_match)],
            "should": [
                phrase_clause(&normalized, language),
                exact_clause(&normalized),
            ],
            "filter": filter,
        })
    };

    Ok(QueryDocument(json!({
        "query": { "bool": bool_query },
        "size": options.size,
        "from": options.offset,
        "track_total_hits": true,
    })))
}

fn validate_query(query: &str) -> Result<(), SearchError> {
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(SearchError::InvalidQuery(format!(
            "query exceeds {MAX_QUERY_CHARS} characters"
        )));
    }
    if query
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
    {
        return Err(SearchError::InvalidQuery(
            "query contains control characters".into(),
        ));
    }
    Ok(())
}

/// Lowercased alphanumeric runs, first occurrence order, duplicates removed.
pub(crate) fn distinct_tokens(query: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
    {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

fn analyzed_fields(language: Lang) -> Vec<String> {
    TEXT_FIELDS
        .iter()
        .map(|f| language.analyzed_field(f))
        .collect()
}

fn recall_clause(tokens: &[String], language: Lang, ratio: MinMatchRatio) -> Value {
    let mut fields = analyzed_fields(language);
    fields.push(BASENAME_FIELD.to_string());

    let per_token: Vec<Value> = tokens
        .iter()
        .map(|token| {
            json!({
                "multi_match": {
                    "query": token,
                    "fields": fields,
                    "operator": "and",
                    "zero_terms_query": "all",
                }
            })
        })
        .collect();

    json!({
        "bool": {
            "should": per_token,
            "minimum_should_match": ratio.required(tokens.len()),
        }
    })
}

fn phrase_clause(query: &str, language: Lang) -> Value {
    json!({
        "multi_match": {
            "query": query,
            "type": "phrase",
            "fields": analyzed_fields(language),
            "boost": PHRASE_BOOST,
        }
    })
}

fn exact_clause(query: &str) -> Value {
    json!({
        "multi_match": {
            "query": query,
            "fields": TEXT_FIELDS,
            "operator": "and",
            "boost": EXACT_BOOST,
        }
    })
}

fn filters(language: Lang, sites: &[SiteFilter]) -> Vec<Value> {
    let mut filter = vec![json!({ "term": { LANGUAGE_FIELD: language.code() } })];

    if !sites.is_empty() {
        let per_site: Vec<Value> = sites.iter().map(site_clause).collect();
        filter.push(json!({
            "bool": {
                "should": per_site,
                "minimum_should_match": 1,
            }
        }));
    }

    filter
}

fn site_clause(site: &SiteFilter) -> Value {
    let domain = json!({ "term": { DOMAIN_FIELD: site.domain } });
    match &site.path {
        Some(prefix) => json!({
            "bool": {
                "filter": [domain, { "prefix": { URL_PATH_FIELD: prefix } }]
            }
        }),
        None => domain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose_default(query: &str, language: Lang) -> Value {
        compose(query, language, &ComposeOptions::default())
            .unwrap()
            .as_json()
            .clone()
    }

    fn recall(body: &Value) -> &Value {
        &body["query"]["bool"]["must"][0]["bool"]
    }

    #[test]
    fn required_tokens_follow_six_of_seven() {
        let ratio = MinMatchRatio::DEFAULT;
        assert_eq!(ratio.required(7), 6);
        assert_eq!(ratio.required(6), 5);
        assert_eq!(ratio.required(2), 1);
        assert_eq!(ratio.required(1), 1);
        assert_eq!(ratio.required(14), 12);
    }

    #[test]
    fn full_ratio_requires_every_token() {
        let ratio = MinMatchRatio::new(1.0).unwrap();
        assert_eq!(ratio.required(7), 7);
        assert_eq!(ratio.required(2), 2);
    }

    #[test]
    fn ratio_outside_unit_interval_is_rejected() {
        assert!(MinMatchRatio::new(0.0).is_none());
        assert!(MinMatchRatio::new(1.5).is_none());
        assert!(MinMatchRatio::new(f64::NAN).is_none());
    }

    #[test]
    fn seven_token_query_requires_six_matches() {
        let body = compose_default("one two three four five six MISSING", Lang::En);
        let recall = recall(&body);
        assert_eq!(recall["should"].as_array().unwrap().len(), 7);
        assert_eq!(recall["minimum_should_match"], 6);
        assert_eq!(recall["should"][6]["multi_match"]["query"], "missing");
    }

    #[test]
    fn stop_word_tokens_count_as_matched() {
        let body = compose_default("the president of the united states", Lang::En);
        let recall = recall(&body);
        let clauses = recall["should"].as_array().unwrap();
        let queries: Vec<&str> = clauses
            .iter()
            .map(|c| c["multi_match"]["query"].as_str().unwrap())
            .collect();
        assert_eq!(queries, ["the", "president", "of", "united", "states"]);
        assert_eq!(recall["minimum_should_match"], 4);
        for clause in clauses {
            assert_eq!(clause["multi_match"]["zero_terms_query"], "all");
        }
    }

    #[test]
    fn mixed_case_punctuated_seven_token_query() {
        let body = compose_default("Jefferson, the Memorial of NEWS and petitions!", Lang::En);
        let recall = recall(&body);
        let queries: Vec<&str> = recall["should"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["multi_match"]["query"].as_str().unwrap())
            .collect();
        assert_eq!(
            queries,
            ["jefferson", "the", "memorial", "of", "news", "and", "petitions"]
        );
        assert_eq!(recall["minimum_should_match"], 6);
        assert_eq!(recall["should"][1]["multi_match"]["zero_terms_query"], "all");
    }

    #[test]
    fn abbreviations_split_into_single_letter_tokens() {
        let body = compose_default("The Budget of the U.S. Treasury", Lang::En);
        let recall = recall(&body);
        assert_eq!(recall["should"].as_array().unwrap().len(), 6);
        assert_eq!(recall["should"][3]["multi_match"]["query"], "u");
        assert_eq!(recall["minimum_should_match"], 5);
    }

    #[test]
    fn recall_tokens_cover_url_basename() {
        let body = compose_default("obama hud", Lang::En);
        let fields = &recall(&body)["should"][0]["multi_match"]["fields"];
        assert_eq!(*fields, json!(["title_en", "description_en", "basename"]));
        assert_eq!(recall(&body)["minimum_should_match"], 1);
    }

    #[test]
    fn repeated_tokens_count_once() {
        let body = compose_default("news News news!", Lang::En);
        assert_eq!(recall(&body)["should"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn phrase_clause_is_boosted_over_analyzed_fields() {
        let body = compose_default("jefferson   Memorial", Lang::En);
        let phrase = &body["query"]["bool"]["should"][0]["multi_match"];
        assert_eq!(phrase["type"], "phrase");
        assert_eq!(phrase["query"], "jefferson Memorial");
        assert_eq!(phrase["fields"], json!(["title_en", "description_en"]));
        assert_eq!(phrase["boost"], PHRASE_BOOST);
    }

    #[test]
    fn exact_clause_targets_unstemmed_fields() {
        let body = compose_default("news memorials", Lang::En);
        let exact = &body["query"]["bool"]["should"][1]["multi_match"];
        assert_eq!(exact["fields"], json!(["title", "description"]));
        assert_eq!(exact["operator"], "and");
        assert_eq!(exact["boost"], EXACT_BOOST);
    }

    #[test]
    fn language_is_a_hard_filter() {
        let body = compose_default("america", Lang::Fr);
        assert_eq!(
            body["query"]["bool"]["filter"][0],
            json!({ "term": { "language": "fr" } })
        );
        assert_eq!(
            recall(&body)["should"][0]["multi_match"]["fields"][0],
            "title_fr"
        );
    }

    #[test]
    fn empty_query_matches_nothing() {
        for query in ["", "   ", "?!"] {
            let doc = compose(query, Lang::En, &ComposeOptions::default()).unwrap();
            assert!(doc.matches_nothing(), "query {query:?}");
            assert_eq!(
                doc.as_json()["query"]["bool"]["filter"][0]["term"]["language"],
                "en"
            );
        }
    }

    #[test]
    fn non_empty_query_is_not_match_none() {
        let doc = compose("common", Lang::En, &ComposeOptions::default()).unwrap();
        assert!(!doc.matches_nothing());
    }

    #[test]
    fn control_characters_are_invalid_query() {
        let err = compose("bad\u{0}query", Lang::En, &ComposeOptions::default()).unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));
    }

    #[test]
    fn overlong_query_is_invalid_query() {
        let long = "a".repeat(MAX_QUERY_CHARS + 1);
        assert!(compose(&long, Lang::En, &ComposeOptions::default()).is_err());
    }

    #[test]
    fn pagination_is_carried() {
        let options = ComposeOptions {
            size: 5,
            offset: 10,
            ..ComposeOptions::default()
        };
        let body = compose("common", Lang::En, &options).unwrap();
        assert_eq!(body.as_json()["size"], 5);
        assert_eq!(body.as_json()["from"], 10);
        assert_eq!(body.as_json()["track_total_hits"], true);
    }

    #[test]
    fn site_filters_are_or_ed() {
        let sites = vec![
            "www.agency.gov".parse::<SiteFilter>().unwrap(),
            "other.gov/news".parse::<SiteFilter>().unwrap(),
        ];
        let options = ComposeOptions {
            site_filters: &sites,
            ..ComposeOptions::default()
        };
        let body = compose("budget", Lang::En, &options).unwrap();
        let site_bool = &body.as_json()["query"]["bool"]["filter"][1]["bool"];
        assert_eq!(site_bool["minimum_should_match"], 1);
        assert_eq!(
            site_bool["should"][0],
            json!({ "term": { "domain_name": "www.agency.gov" } })
        );
        assert_eq!(
            site_bool["should"][1]["bool"]["filter"][1],
            json!({ "prefix": { "url_path": "/news" } })
        );
    }

    #[test]
    fn tokens_split_on_punctuation() {
        assert_eq!(
            distinct_tokens("obama-visits hud.html"),
            ["obama", "visits", "hud", "html"]
        );
    }
}
