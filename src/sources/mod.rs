//! Database adapters with a trait-based plugin architecture.
//!
//! This module defines the [`Source`] trait that every database adapter
//! implements. Each adapter owns both halves of a request: translating a
//! validated query into an upstream URL, and mapping the upstream payload
//! into the typed [`Record`](crate::models::Record) schema. New databases are
//! added by implementing the trait and registering with [`SourceRegistry`].
//!
//! # Feature Flags
//!
//! Individual sources can be disabled at compile time using Cargo features:
//!
//! - `cellosaurus` - Cellosaurus cell-line registry (default: enabled)
//! - `pubmed` - PubMed via NCBI E-utilities (default: enabled)
//! - `pubtator3` - PubTator3 entity annotations (default: enabled)
//! - `pubchem` - PubChem PUG REST (default: enabled)
//! - `entrez` - NCBI Entrez ELink/EFetch (default: enabled)

#[cfg(feature = "source-cellosaurus")]
mod cellosaurus;
#[cfg(feature = "source-entrez")]
mod entrez;
#[cfg(feature = "source-pubchem")]
mod pubchem;
#[cfg(feature = "source-pubmed")]
mod pubmed;
#[cfg(feature = "source-pubtator3")]
mod pubtator3;
mod registry;

#[cfg(feature = "source-cellosaurus")]
pub use cellosaurus::CellosaurusSource;
#[cfg(feature = "source-entrez")]
pub use entrez::EntrezSource;
#[cfg(feature = "source-pubchem")]
pub use pubchem::PubChemSource;
#[cfg(feature = "source-pubmed")]
pub use pubmed::PubMedSource;
#[cfg(feature = "source-pubtator3")]
pub use pubtator3::PubTator3Source;
pub use registry::{SourceCapabilities, SourceRegistry};

use crate::models::{
    Concept, EntityMatch, EntrezDatabase, LinkSet, PaperAnnotations, Record, SearchQuery,
    SearchResult,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a database adapter
///
/// The taxonomy is deliberately small and caller-facing: invalid input never
/// leaves the process, a missing record is distinguishable from an empty
/// record, and a malformed upstream payload is distinguishable from an
/// unreachable upstream.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The requested operation is not implemented for this source
    #[error("Operation not implemented for this source")]
    NotImplemented,

    /// Invalid request parameters (malformed query, pagination, accession)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Valid request, but no matching record upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream payload did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Network-level failure reaching the upstream API
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream API answered with a failure status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Upstream API rejected the request for exceeding its rate limit
    #[error("Rate limit exceeded")]
    RateLimited,
}

impl SourceError {
    /// Stable machine-readable code for the tool surface
    pub fn code(&self) -> &'static str {
        match self {
            SourceError::NotImplemented => "not_implemented",
            SourceError::InvalidRequest(_) => "invalid_argument",
            SourceError::NotFound(_) => "not_found",
            SourceError::Parse(_) => "data_format",
            SourceError::Network(_) | SourceError::Api { .. } | SourceError::RateLimited => {
                "upstream"
            }
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

/// Validate a search query against a source's pagination bounds.
///
/// Rejecting (rather than clamping) out-of-range limits keeps pagination
/// behavior predictable for callers. Runs before any request is built, so an
/// invalid query never reaches the upstream API.
pub fn validate_query(query: &SearchQuery, max_page_size: usize) -> Result<(), SourceError> {
    if query.query.trim().is_empty() {
        return Err(SourceError::InvalidRequest(
            "query string must not be empty".to_string(),
        ));
    }

    if query.limit == 0 {
        return Err(SourceError::InvalidRequest(
            "limit must be at least 1".to_string(),
        ));
    }

    if query.limit > max_page_size {
        return Err(SourceError::InvalidRequest(format!(
            "limit {} exceeds the maximum page size {}",
            query.limit, max_page_size
        )));
    }

    Ok(())
}

/// Issue a GET request with retries and map the response to text.
///
/// Transient failures (connect errors, 429, 5xx) are retried with backoff;
/// everything else surfaces immediately. A 404 comes back as
/// `Api { status: 404, .. }` so lookup call sites can turn it into
/// [`SourceError::NotFound`] with the accession in hand.
pub(crate) async fn fetch_text(
    client: &crate::utils::HttpClient,
    source_name: &str,
    url: &str,
) -> Result<String, SourceError> {
    crate::utils::with_retry(crate::utils::api_retry_config(), || {
        let client = client.clone();
        let url = url.to_string();
        let source_name = source_name.to_string();
        async move {
            let response = client
                .get(&url)
                .await
                .map_err(|e| SourceError::Network(format!("{} request failed: {}", source_name, e)))?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::debug!("{} rate-limited", source_name);
                return Err(SourceError::RateLimited);
            }
            if !status.is_success() {
                return Err(SourceError::Api {
                    status: status.as_u16(),
                    message: format!("{} returned status {}", source_name, status),
                });
            }

            response
                .text()
                .await
                .map_err(|e| SourceError::Network(format!("{} response read failed: {}", source_name, e)))
        }
    })
    .await
}

/// The Source trait defines the interface for all database adapters.
///
/// `search` and `get_by_id` are the uniform surface; the remaining operations
/// are capability-gated extras that default to
/// [`SourceError::NotImplemented`]. Adapters are stateless between calls:
/// each invocation builds one request and maps one response.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (used in tool arguments, e.g. "pubmed")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// The operations this source supports
    fn capabilities(&self) -> SourceCapabilities;

    /// Largest page a single search may request
    fn max_page_size(&self) -> usize {
        100
    }

    /// Whether this source supports a specific capability
    fn supports(&self, capability: SourceCapabilities) -> bool {
        self.capabilities().contains(capability)
    }

    /// Search the database
    async fn search(&self, _query: &SearchQuery) -> Result<SearchResult, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Fetch a single record by its accession/identifier
    async fn get_by_id(
        &self,
        _id: &str,
        _fields: Option<&[String]>,
    ) -> Result<Record, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Annotate articles with normalized entities (PubTator3)
    async fn annotate(&self, _pmids: &[String]) -> Result<Vec<PaperAnnotations>, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Resolve a keyword to its best normalized entity term (PubTator3)
    async fn autocomplete(
        &self,
        _keyword: &str,
        _concept: Option<Concept>,
    ) -> Result<Option<EntityMatch>, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Discover links between records of two NCBI databases (Entrez)
    async fn links(
        &self,
        _ids: &[String],
        _db_from: EntrezDatabase,
        _db_to: EntrezDatabase,
    ) -> Result<LinkSet, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Fetch raw records in an upstream-native format (Entrez)
    async fn fetch_raw(
        &self,
        _ids: &[String],
        _db: EntrezDatabase,
        _retmode: &str,
        _rettype: Option<&str>,
    ) -> Result<String, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Fetch the plain-text body of an open-access article (PubMed via PMC)
    async fn fulltext(&self, _pmid: &str) -> Result<String, SourceError> {
        Err(SourceError::NotImplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query_rejects_empty() {
        let err = validate_query(&SearchQuery::new(""), 100).unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));

        let err = validate_query(&SearchQuery::new("   "), 100).unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));
    }

    #[test]
    fn test_validate_query_rejects_out_of_range_limit() {
        let err = validate_query(&SearchQuery::new("hela").limit(0), 100).unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));

        let err = validate_query(&SearchQuery::new("hela").limit(101), 100).unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));

        assert!(validate_query(&SearchQuery::new("hela").limit(100), 100).is_ok());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SourceError::InvalidRequest("x".to_string()).code(),
            "invalid_argument"
        );
        assert_eq!(SourceError::NotFound("x".to_string()).code(), "not_found");
        assert_eq!(SourceError::Parse("x".to_string()).code(), "data_format");
        assert_eq!(SourceError::RateLimited.code(), "upstream");
        assert_eq!(
            SourceError::Api {
                status: 502,
                message: "bad gateway".to_string()
            }
            .code(),
            "upstream"
        );
    }
}
