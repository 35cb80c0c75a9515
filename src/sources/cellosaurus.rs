//! Cellosaurus cell-line registry adapter.
//!
//! Uses the Cellosaurus REST API. Queries use the Cellosaurus search syntax
//! (`ox:sapiens`, `derived-from-site:liver`, `di:Hepatoblastoma`), criteria
//! combined with an implicit AND.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{CellLine, Record, SearchQuery, SearchResult};
use crate::sources::{fetch_text, validate_query, Source, SourceCapabilities, SourceError};
use crate::utils::{validate_cell_line_accession, HttpClient};

/// Cellosaurus REST API base URL
const CELLOSAURUS_API_URL: &str = "https://api.cellosaurus.org";

/// Cellosaurus cell-line registry source
#[derive(Debug, Clone)]
pub struct CellosaurusSource {
    client: HttpClient,
    base_url: String,
}

impl CellosaurusSource {
    /// Create a new Cellosaurus source
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::with_settings(config.http.timeout(), None)?,
            base_url: CELLOSAURUS_API_URL.to_string(),
        })
    }

    /// Create with a custom base URL (for testing against a local stub)
    pub fn with_base_url(config: &Config, base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::with_settings(config.http.timeout(), None)?,
            base_url: base_url.into(),
        })
    }

    /// Build the search URL. The upstream API pages from 1; the page number
    /// is derived from the record offset.
    fn build_search_url(&self, query: &SearchQuery) -> String {
        let page = query.offset / query.limit + 1;
        let mut params = vec![
            ("q".to_string(), query.query.clone()),
            ("format".to_string(), "json".to_string()),
            ("page".to_string(), page.to_string()),
            ("size".to_string(), query.limit.to_string()),
        ];

        if let Some(fields) = &query.fields {
            params.push(("fields".to_string(), fields.join(",")));
        }

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}/search/cell-line?{}", self.base_url, query_string)
    }

    /// Build the accession lookup URL
    fn build_lookup_url(&self, accession: &str, fields: Option<&[String]>) -> String {
        let mut url = format!("{}/cell-line/{}?format=json", self.base_url, accession);
        if let Some(fields) = fields {
            url.push_str("&fields=");
            url.push_str(&urlencoding::encode(&fields.join(",")).into_owned());
        }
        url
    }

    /// Parse the search response body into a total count and validated cell
    /// lines. Entries failing validation are skipped, not fatal.
    fn parse_search_response(json: &str) -> Result<(u64, Vec<CellLine>), SourceError> {
        #[derive(Debug, Deserialize)]
        struct SearchBody {
            #[serde(default)]
            total_count: u64,
            cell_lines: Vec<serde_json::Value>,
        }

        let body: SearchBody = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Cellosaurus JSON: {}", e)))?;

        let mut cell_lines = Vec::new();
        for value in body.cell_lines {
            match serde_json::from_value::<CellLine>(value) {
                Ok(cell_line) => cell_lines.push(cell_line),
                Err(e) => {
                    tracing::debug!("Skipping cell line failing validation: {}", e);
                }
            }
        }

        Ok((body.total_count, cell_lines))
    }

    /// Parse a single cell-line record
    fn parse_cell_line(json: &str) -> Result<CellLine, SourceError> {
        serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Cellosaurus record: {}", e)))
    }
}

#[async_trait]
impl Source for CellosaurusSource {
    fn id(&self) -> &str {
        "cellosaurus"
    }

    fn name(&self) -> &str {
        "Cellosaurus"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH | SourceCapabilities::LOOKUP
    }

    fn max_page_size(&self) -> usize {
        100
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SourceError> {
        validate_query(query, self.max_page_size())?;

        let url = self.build_search_url(query);
        let body = fetch_text(&self.client, self.name(), &url).await?;
        let (total_count, mut cell_lines) = Self::parse_search_response(&body)?;

        cell_lines.truncate(query.limit);
        let records = cell_lines.into_iter().map(Record::CellLine).collect();

        Ok(SearchResult::new(records)
            .total_count(total_count)
            .paginate(query.offset))
    }

    async fn get_by_id(
        &self,
        id: &str,
        fields: Option<&[String]>,
    ) -> Result<Record, SourceError> {
        validate_cell_line_accession(id)?;

        let url = self.build_lookup_url(id, fields);
        let body = match fetch_text(&self.client, self.name(), &url).await {
            Err(SourceError::Api { status: 404, .. }) => {
                return Err(SourceError::NotFound(format!(
                    "no cell line with accession '{}'",
                    id
                )));
            }
            other => other?,
        };

        Ok(Record::CellLine(Self::parse_cell_line(&body)?))
    }
}
