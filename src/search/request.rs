use std::str::FromStr;

use super::SearchError;
use super::lang::Lang;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
/// Backend `index.max_result_window` default: `from + size` may not exceed it.
pub const MAX_RESULT_WINDOW: u32 = 10_000;

/// One search invocation: which collections, which language, what text.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    handles: Vec<String>,
    language: Lang,
    query: String,
    size: u32,
    offset: u32,
    site_filters: Vec<SiteFilter>,
}

impl SearchRequest {
    /// Duplicate handles are dropped, keeping the first occurrence.
    pub fn new<I, S>(handles: I, language: Lang, query: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for handle in handles {
            let handle = handle.into();
            if !unique.contains(&handle) {
                unique.push(handle);
            }
        }
        Self {
            handles: unique,
            language,
            query: query.into(),
            size: DEFAULT_PAGE_SIZE,
            offset: 0,
            site_filters: Vec::new(),
        }
    }

    pub fn with_page(mut self, size: u32, offset: u32) -> Self {
        self.size = size;
        self.offset = offset;
        self
    }

    pub fn with_site_filters(mut self, filters: Vec<SiteFilter>) -> Self {
        self.site_filters = filters;
        self
    }

    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    pub fn language(&self) -> Lang {
        self.language
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn site_filters(&self) -> &[SiteFilter] {
        &self.site_filters
    }

    pub(crate) fn validate_page(&self) -> Result<(), SearchError> {
        if self.size > MAX_PAGE_SIZE {
            return Err(SearchError::InvalidRequest(format!(
                "page size {} exceeds maximum of {MAX_PAGE_SIZE}",
                self.size
            )));
        }
        if u64::from(self.offset) + u64::from(self.size) > u64::from(MAX_RESULT_WINDOW) {
            return Err(SearchError::InvalidRequest(format!(
                "offset {} plus page size {} exceeds result window of {MAX_RESULT_WINDOW}",
                self.offset, self.size
            )));
        }
        Ok(())
    }
}

/// Restricts hits to one site, optionally below a path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFilter {
    pub domain: String,
    pub path: Option<String>,
}

impl FromStr for SiteFilter {
    type Err = SearchError;

    /// Parses `domain` or `domain/path/prefix`. A leading scheme is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);

        let (domain, path) = match without_scheme.find('/') {
            Some(i) => (&without_scheme[..i], Some(&without_scheme[i..])),
            None => (without_scheme, None),
        };

        if domain.is_empty() {
            return Err(SearchError::InvalidRequest(format!(
                "site filter '{s}' has no domain"
            )));
        }

        let path = path
            .map(|p| p.trim_end_matches('/'))
            .filter(|p| !p.is_empty())
            .map(String::from);

        Ok(Self {
            domain: domain.to_ascii_lowercase(),
            path,
        })
    }
}
