use std::fmt;

use serde::Serialize;

use super::SearchError;

/// Characters Elasticsearch forbids in index names. `,` would also split
/// the multi-index request path.
const FORBIDDEN_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':'];

/// Opaque name of a searchable index alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IndexId(String);

impl IndexId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aliases to search, one per handle, in handle order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIndexSet(Vec<IndexId>);

impl ResolvedIndexSet {
    pub fn as_slice(&self) -> &[IndexId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Alias the indexing pipeline points at the current version of `handle`.
pub fn alias_name(namespace: &str, handle: &str) -> String {
    format!("{namespace}-{handle}")
}

/// Physical index behind an alias. Only the indexing pipeline addresses these.
pub fn versioned_index_name(namespace: &str, handle: &str, version: u32) -> String {
    format!("{}-v{version}", alias_name(namespace, handle))
}

pub fn resolve<S: AsRef<str>>(
    namespace: &str,
    handles: &[S],
) -> Result<ResolvedIndexSet, SearchError> {
    if handles.is_empty() {
        return Err(SearchError::InvalidRequest(
            "at least one handle is required".into(),
        ));
    }

    let indexes = handles
        .iter()
        .map(|h| {
            let handle = h.as_ref();
            validate_handle(handle)?;
            Ok(IndexId(alias_name(namespace, handle)))
        })
        .collect::<Result<Vec<_>, SearchError>>()?;

    Ok(ResolvedIndexSet(indexes))
}

fn validate_handle(handle: &str) -> Result<(), SearchError> {
    let invalid = |reason: &str| {
        Err(SearchError::InvalidRequest(format!(
            "invalid handle '{handle}': {reason}"
        )))
    };

    if handle.is_empty() {
        return invalid("must not be empty");
    }
    if handle.starts_with(['-', '_', '+']) {
        return invalid("must not start with '-', '_' or '+'");
    }
    if handle.chars().any(|c| c.is_uppercase()) {
        return invalid("must be lowercase");
    }
    if handle
        .chars()
        .any(|c| FORBIDDEN_CHARS.contains(&c) || c.is_control())
    {
        return invalid("contains a character not allowed in index names");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_one_alias_per_handle_in_order() {
        let set = resolve("test-i14y-documents", &["agency_blogs", "other_agency_blogs"]).unwrap();
        let names: Vec<&str> = set.as_slice().iter().map(IndexId::as_str).collect();
        assert_eq!(
            names,
            [
                "test-i14y-documents-agency_blogs",
                "test-i14y-documents-other_agency_blogs"
            ]
        );
    }

    #[test]
    fn empty_handles_is_invalid_request() {
        let handles: [&str; 0] = [];
        assert!(matches!(
            resolve("ns", &handles),
            Err(SearchError::InvalidRequest(_))
        ));
    }

    #[test]
    fn rejects_handle_that_would_split_the_index_path() {
        let err = resolve("ns", &["a,b"]).unwrap_err();
        assert!(err.to_string().contains("a,b"), "got: {err}");
    }

    #[test]
    fn rejects_uppercase_and_leading_underscore() {
        assert!(resolve("ns", &["Blogs"]).is_err());
        assert!(resolve("ns", &["_blogs"]).is_err());
        assert!(resolve("ns", &[""]).is_err());
    }

    #[test]
    fn versioned_name_extends_alias() {
        assert_eq!(
            versioned_index_name("ns", "agency_blogs", 1),
            "ns-agency_blogs-v1"
        );
    }
}
