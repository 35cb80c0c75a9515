//! PubTator3 adapter.
//!
//! PubTator3 annotates PubMed articles with normalized biomedical entities
//! (genes, diseases, chemicals). Two endpoints are used: the BioC-JSON
//! export for per-article annotations, and entity autocomplete for resolving
//! free-text keywords to normalized terms.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::config::Config;
use crate::models::{
    Concept, EntityAnnotation, EntityMatch, PaperAnnotations, Record, SearchQuery, SearchResult,
    Section,
};
use crate::sources::{fetch_text, validate_query, Source, SourceCapabilities, SourceError};
use crate::utils::{validate_pmid, HttpClient};

/// PubTator3 API base URL
const PUBTATOR3_API_URL: &str = "https://www.ncbi.nlm.nih.gov/research/pubtator3-api";

static ARTICLE_ID_RE: OnceLock<Regex> = OnceLock::new();

/// Split a BioC document id of the form `PMID` or `PMID|PMCID` into its parts
fn split_article_id(text: &str) -> Result<(String, Option<String>), SourceError> {
    let re = ARTICLE_ID_RE
        .get_or_init(|| Regex::new(r"^(\d+)(?:\|(PMC\d+))?").expect("valid article id pattern"));

    let captures = re.captures(text).ok_or_else(|| {
        SourceError::Parse(format!("invalid article id '{}' in PubTator3 export", text))
    })?;

    let pmid = captures[1].to_string();
    let pmc_id = captures.get(2).map(|m| m.as_str().to_string());
    Ok((pmid, pmc_id))
}

/// PubTator3 source
#[derive(Debug, Clone)]
pub struct PubTator3Source {
    client: HttpClient,
    base_url: String,
}

impl PubTator3Source {
    /// Create a new PubTator3 source
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Self::with_base_url(config, PUBTATOR3_API_URL)
    }

    /// Create with a custom base URL (for testing against a local stub)
    pub fn with_base_url(config: &Config, base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::with_settings(
                config.http.timeout(),
                Some(config.ncbi_requests_per_second()),
            )?,
            base_url: base_url.into(),
        })
    }

    /// Build the BioC-JSON export URL
    fn build_export_url(&self, pmids: &[String]) -> String {
        format!(
            "{}/publications/export/biocjson?pmids={}&full=true",
            self.base_url,
            urlencoding::encode(&pmids.join(","))
        )
    }

    /// Build the entity autocomplete URL
    fn build_autocomplete_url(&self, keyword: &str, concept: Option<Concept>, limit: usize) -> String {
        let mut url = format!(
            "{}/entity/autocomplete/?query={}&limit={}",
            self.base_url,
            urlencoding::encode(keyword),
            limit
        );
        if let Some(concept) = concept {
            url.push_str("&concept=");
            url.push_str(concept.as_str());
        }
        url
    }

    /// Parse the BioC-JSON export body into per-article annotations.
    /// Annotations failing validation are skipped, not fatal.
    fn parse_export_response(json: &str) -> Result<Vec<PaperAnnotations>, SourceError> {
        #[derive(Debug, Deserialize)]
        struct ExportBody {
            #[serde(rename = "PubTator3")]
            documents: Vec<DocumentJson>,
        }

        #[derive(Debug, Deserialize)]
        struct DocumentJson {
            #[serde(rename = "_id")]
            id: String,
            #[serde(default)]
            passages: Vec<PassageJson>,
        }

        #[derive(Debug, Deserialize)]
        struct PassageJson {
            #[serde(default)]
            infons: PassageInfons,
            #[serde(default)]
            annotations: Vec<AnnotationJson>,
        }

        #[derive(Debug, Default, Deserialize)]
        struct PassageInfons {
            section_type: Option<String>,
            #[serde(rename = "type")]
            passage_type: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        struct AnnotationJson {
            infons: Option<serde_json::Value>,
        }

        let body: ExportBody = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Failed to parse PubTator3 JSON: {}", e)))?;

        let mut results = Vec::new();

        for document in body.documents {
            let (pmid, pmc_id) = split_article_id(&document.id)?;

            let mut sections = Vec::new();
            for passage in document.passages {
                let section_type = passage
                    .infons
                    .section_type
                    .or(passage.infons.passage_type)
                    .unwrap_or_else(|| "unknown".to_string());

                let mut annotations = Vec::new();
                for annotation in passage.annotations {
                    let Some(infons) = annotation.infons else {
                        continue;
                    };
                    match serde_json::from_value::<EntityAnnotation>(infons) {
                        Ok(entity) => annotations.push(entity),
                        Err(e) => {
                            tracing::debug!("Skipping annotation failing validation: {}", e);
                        }
                    }
                }

                sections.push(Section {
                    section_type,
                    annotations,
                });
            }

            results.push(PaperAnnotations {
                pmid,
                pmc_id,
                sections,
            });
        }

        Ok(results)
    }

    /// Parse the autocomplete body into normalized entity matches.
    /// Entries failing validation are skipped, not fatal.
    fn parse_autocomplete_response(json: &str) -> Result<Vec<EntityMatch>, SourceError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(json).map_err(|e| {
            SourceError::Parse(format!("Failed to parse PubTator3 autocomplete JSON: {}", e))
        })?;

        let mut matches = Vec::new();
        for entry in entries {
            match serde_json::from_value::<EntityMatch>(entry) {
                Ok(entity) => matches.push(entity),
                Err(e) => {
                    tracing::debug!("Skipping autocomplete entry failing validation: {}", e);
                }
            }
        }

        Ok(matches)
    }
}

#[async_trait]
impl Source for PubTator3Source {
    fn id(&self) -> &str {
        "pubtator3"
    }

    fn name(&self) -> &str {
        "PubTator3"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
            | SourceCapabilities::LOOKUP
            | SourceCapabilities::ANNOTATE
            | SourceCapabilities::AUTOCOMPLETE
    }

    fn max_page_size(&self) -> usize {
        50
    }

    /// Search resolves the query against the entity index. The autocomplete
    /// endpoint has no offset parameter, so the page is cut locally.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SourceError> {
        validate_query(query, self.max_page_size())?;

        let upstream_limit = query.offset + query.limit;
        let url = self.build_autocomplete_url(&query.query, None, upstream_limit);
        let body = fetch_text(&self.client, self.name(), &url).await?;
        let matches = Self::parse_autocomplete_response(&body)?;

        let records: Vec<Record> = matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(Record::Entity)
            .collect();

        Ok(SearchResult::new(records))
    }

    async fn get_by_id(
        &self,
        id: &str,
        _fields: Option<&[String]>,
    ) -> Result<Record, SourceError> {
        validate_pmid(id)?;

        let annotations = self.annotate(&[id.to_string()]).await?;
        annotations
            .into_iter()
            .find(|a| a.pmid == id)
            .map(Record::Annotations)
            .ok_or_else(|| SourceError::NotFound(format!("no annotations for PMID '{}'", id)))
    }

    async fn annotate(&self, pmids: &[String]) -> Result<Vec<PaperAnnotations>, SourceError> {
        if pmids.is_empty() {
            return Err(SourceError::InvalidRequest(
                "at least one PMID is required".to_string(),
            ));
        }
        for pmid in pmids {
            validate_pmid(pmid)?;
        }

        let url = self.build_export_url(pmids);
        let body = fetch_text(&self.client, self.name(), &url).await?;
        Self::parse_export_response(&body)
    }

    async fn autocomplete(
        &self,
        keyword: &str,
        concept: Option<Concept>,
    ) -> Result<Option<EntityMatch>, SourceError> {
        if keyword.trim().is_empty() {
            return Err(SourceError::InvalidRequest(
                "keyword must not be empty".to_string(),
            ));
        }

        let url = self.build_autocomplete_url(keyword, concept, 1);
        let body = fetch_text(&self.client, self.name(), &url).await?;
        Ok(Self::parse_autocomplete_response(&body)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT_FIXTURE: &str = r#"{
        "PubTator3": [
            {
                "_id": "31978945|PMC7092803",
                "passages": [
                    {
                        "infons": {"section_type": "TITLE", "type": "front"},
                        "annotations": [
                            {"infons": {"identifier": "MESH:D045169", "biotype": "disease", "name": "severe acute respiratory syndrome"}}
                        ]
                    },
                    {
                        "infons": {"type": "abstract"},
                        "annotations": [
                            {"infons": {"identifier": "9606", "biotype": "species"}},
                            {"infons": {"identifier": "MESH:D011024", "biotype": "disease", "name": "pneumonia"}}
                        ]
                    }
                ]
            }
        ]
    }"#;

    const AUTOCOMPLETE_FIXTURE: &str = r#"[
        {"_id": "@CHEMICAL_remdesivir", "biotype": "chemical", "name": "remdesivir", "match": "name"},
        {"_id": "@CHEMICAL_GS_441524", "biotype": "chemical", "name": "GS-441524"}
    ]"#;

    fn source() -> PubTator3Source {
        PubTator3Source::new(&Config::default()).unwrap()
    }

    fn offline_source() -> PubTator3Source {
        PubTator3Source::with_base_url(&Config::default(), "http://lifescience.invalid").unwrap()
    }

    #[test]
    fn test_split_article_id() {
        assert_eq!(
            split_article_id("31978945|PMC7092803").unwrap(),
            ("31978945".to_string(), Some("PMC7092803".to_string()))
        );
        assert_eq!(
            split_article_id("31978945").unwrap(),
            ("31978945".to_string(), None)
        );
        assert!(split_article_id("PMC7092803").is_err());
    }

    #[test]
    fn test_build_export_url() {
        let url = source().build_export_url(&["1".to_string(), "2".to_string()]);
        assert_eq!(
            url,
            "https://www.ncbi.nlm.nih.gov/research/pubtator3-api/publications/export/biocjson?pmids=1%2C2&full=true"
        );
    }

    #[test]
    fn test_build_autocomplete_url_with_concept() {
        let url = source().build_autocomplete_url("remdes", Some(Concept::Chemical), 5);
        assert!(url.contains("query=remdes"));
        assert!(url.contains("limit=5"));
        assert!(url.contains("concept=chemical"));
    }

    #[test]
    fn test_parse_export_response() {
        let results = PubTator3Source::parse_export_response(EXPORT_FIXTURE).unwrap();
        assert_eq!(results.len(), 1);

        let annotations = &results[0];
        assert_eq!(annotations.pmid, "31978945");
        assert_eq!(annotations.pmc_id.as_deref(), Some("PMC7092803"));
        assert_eq!(annotations.sections.len(), 2);

        assert_eq!(annotations.sections[0].section_type, "TITLE");
        assert_eq!(annotations.sections[0].annotations.len(), 1);

        // passage without section_type falls back to its type; the annotation
        // missing a name is skipped
        assert_eq!(annotations.sections[1].section_type, "abstract");
        assert_eq!(annotations.sections[1].annotations.len(), 1);
        assert_eq!(annotations.sections[1].annotations[0].name, "pneumonia");
    }

    #[test]
    fn test_parse_export_response_missing_key_is_data_format_error() {
        let err = PubTator3Source::parse_export_response(r#"{"documents": []}"#).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn test_parse_autocomplete_response() {
        let matches = PubTator3Source::parse_autocomplete_response(AUTOCOMPLETE_FIXTURE).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].identifier, "@CHEMICAL_remdesivir");
        assert_eq!(matches[0].matched.as_deref(), Some("name"));
        assert!(matches[1].matched.is_none());
    }

    #[tokio::test]
    async fn test_annotate_rejects_bad_pmids_without_request() {
        let err = offline_source()
            .annotate(&["not-a-pmid".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));

        let err = offline_source().annotate(&[]).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_autocomplete_rejects_empty_keyword_without_request() {
        let err = offline_source().autocomplete("", None).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));
    }
}
