//! Search request model.

use serde::{Deserialize, Serialize};

/// Number of records returned when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Search query parameters
///
/// The query string itself uses the target database's own grammar (e.g.
/// `ox:sapiens` for Cellosaurus, `crispr[tiab]` for PubMed) and is passed
/// through opaquely. Pagination and field selection are interpreted by the
/// source adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Main search query string (database-specific grammar)
    pub query: String,

    /// Record offset into the full result set
    pub offset: usize,

    /// Maximum number of records to return
    pub limit: usize,

    /// Field-selection set; `None` returns all fields
    pub fields: Option<Vec<String>>,

    /// Publication date range start, `YYYY/MM/DD` (PubMed only)
    pub date_start: Option<String>,

    /// Publication date range end, `YYYY/MM/DD` (PubMed only)
    pub date_end: Option<String>,

    /// MeSH term filters, ANDed together (PubMed only)
    pub mesh_terms: Vec<String>,

    /// Restrict to open-access articles (PubMed only)
    pub open_access: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            offset: 0,
            limit: DEFAULT_LIMIT,
            fields: None,
            date_start: None,
            date_end: None,
            mesh_terms: Vec::new(),
            open_access: false,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the record offset
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the maximum number of records
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the field-selection set
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set the publication date range start (`YYYY/MM/DD`)
    pub fn date_start(mut self, date: impl Into<String>) -> Self {
        self.date_start = Some(date.into());
        self
    }

    /// Set the publication date range end (`YYYY/MM/DD`)
    pub fn date_end(mut self, date: impl Into<String>) -> Self {
        self.date_end = Some(date.into());
        self
    }

    /// Add a MeSH term filter
    pub fn mesh_term(mut self, term: impl Into<String>) -> Self {
        self.mesh_terms.push(term.into());
        self
    }

    /// Restrict results to open-access articles
    pub fn open_access(mut self, open_access: bool) -> Self {
        self.open_access = open_access;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let query = SearchQuery::new("name:HeLa");
        assert_eq!(query.query, "name:HeLa");
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert!(query.fields.is_none());
        assert!(!query.open_access);
    }

    #[test]
    fn test_builder_chaining() {
        let query = SearchQuery::new("crispr")
            .offset(20)
            .limit(50)
            .fields(["id", "ac"])
            .mesh_term("Humans")
            .open_access(true);

        assert_eq!(query.offset, 20);
        assert_eq!(query.limit, 50);
        assert_eq!(query.fields.as_deref(), Some(&["id".to_string(), "ac".to_string()][..]));
        assert_eq!(query.mesh_terms, vec!["Humans"]);
        assert!(query.open_access);
    }
}
