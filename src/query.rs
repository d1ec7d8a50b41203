use crate::types::ExtractedMetadata;

/// Default number of search strings tried per provider
pub const DEFAULT_MAX_QUERIES: usize = 3;

/// Hard upper bound on search strings per provider
pub const MAX_QUERIES_CAP: usize = 3;

/// One candidate search string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    /// Term as typed into the site's search box
    pub raw: String,
    /// URL-encoded term for query strings
    pub encoded: String,
}

impl QueryTerm {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let encoded = urlencoding::encode(&raw).into_owned();
        Self { raw, encoded }
    }
}

/// Derives ordered search strings from request metadata.
///
/// File names usually carry the original release title while the library name
/// may be localized, so file-name variants go first.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    max_queries: usize,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUERIES)
    }
}

impl QueryBuilder {
    /// `max_queries` is clamped to `1..=MAX_QUERIES_CAP`
    pub fn new(max_queries: usize) -> Self {
        Self {
            max_queries: max_queries.clamp(1, MAX_QUERIES_CAP),
        }
    }

    /// Build up to `max_queries` distinct terms in priority order
    #[must_use]
    pub fn build(&self, metadata: &ExtractedMetadata, display_name: &str) -> Vec<QueryTerm> {
        let mut candidates = Vec::with_capacity(4);

        if let Some(title) = metadata.file_title.as_deref() {
            Self::push_with_year(&mut candidates, title, metadata.year);
        }
        Self::push_with_year(&mut candidates, display_name, metadata.year);

        let mut terms: Vec<QueryTerm> = Vec::with_capacity(self.max_queries);
        for candidate in candidates {
            if terms.len() >= self.max_queries {
                break;
            }
            if terms.iter().any(|t| t.raw.eq_ignore_ascii_case(&candidate)) {
                continue;
            }
            terms.push(QueryTerm::new(candidate));
        }

        terms
    }

    fn push_with_year(candidates: &mut Vec<String>, title: &str, year: Option<i32>) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }

        candidates.push(title.to_string());
        if let Some(year) = year {
            candidates.push(format!("{title} {year}"));
        }
    }
}
