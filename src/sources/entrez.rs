//! NCBI Entrez E-utilities adapter (ELink / EFetch).
//!
//! ELink discovers relationships between records of different NCBI databases
//! (e.g. the genes discussed in a PubMed article). EFetch returns raw records
//! in an upstream-native format and is passed through without mapping.

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{EntrezDatabase, Link, LinkSet};
use crate::sources::{fetch_text, Source, SourceCapabilities, SourceError};
use crate::utils::HttpClient;

/// NCBI E-utilities base URL
const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Formats EFetch may be asked to return
const FETCH_RETMODES: &[&str] = &["xml", "text", "json"];

/// NCBI Entrez source
#[derive(Debug, Clone)]
pub struct EntrezSource {
    client: HttpClient,
    base_url: String,
    tool: String,
    email: Option<String>,
    api_key: Option<String>,
}

impl EntrezSource {
    /// Create a new Entrez source
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Self::with_base_url(config, EUTILS_BASE_URL)
    }

    /// Create with a custom base URL (for testing against a local stub)
    pub fn with_base_url(config: &Config, base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::with_settings(
                config.http.timeout(),
                Some(config.ncbi_requests_per_second()),
            )?,
            base_url: base_url.into(),
            tool: config.ncbi.tool.clone(),
            email: config.ncbi.email.clone(),
            api_key: config.ncbi.api_key.clone(),
        })
    }

    fn identification_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("tool".to_string(), self.tool.clone())];
        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        if let Some(api_key) = &self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }
        params
    }

    fn encode_params(params: &[(String, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Build the eLink URL
    fn build_link_url(
        &self,
        ids: &[String],
        db_from: EntrezDatabase,
        db_to: EntrezDatabase,
    ) -> String {
        let mut params = vec![
            ("dbfrom".to_string(), db_from.as_str().to_string()),
            ("db".to_string(), db_to.as_str().to_string()),
            ("id".to_string(), ids.join(",")),
            ("retmode".to_string(), "xml".to_string()),
        ];
        params.extend(self.identification_params());

        format!("{}/elink.fcgi?{}", self.base_url, Self::encode_params(&params))
    }

    /// Build the eFetch URL
    fn build_fetch_url(
        &self,
        ids: &[String],
        db: EntrezDatabase,
        retmode: &str,
        rettype: Option<&str>,
    ) -> String {
        let mut params = vec![
            ("db".to_string(), db.as_str().to_string()),
            ("id".to_string(), ids.join(",")),
            ("retmode".to_string(), retmode.to_string()),
        ];
        if let Some(rettype) = rettype {
            params.push(("rettype".to_string(), rettype.to_string()));
        }
        params.extend(self.identification_params());

        format!("{}/efetch.fcgi?{}", self.base_url, Self::encode_params(&params))
    }

    /// Parse the eLink XML body. Each `<LinkSet>` pairs one set of source
    /// ids with the target-database links found for them.
    fn parse_link_response(
        xml: &str,
        db_from: EntrezDatabase,
        db_to: EntrezDatabase,
    ) -> Result<LinkSet, SourceError> {
        #[derive(Debug, Deserialize)]
        struct ELinkResult {
            #[serde(rename = "LinkSet", default)]
            link_sets: Vec<LinkSetXml>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct LinkSetXml {
            IdList: Option<IdList>,
            #[serde(rename = "LinkSetDb", default)]
            link_set_dbs: Vec<LinkSetDbXml>,
        }

        #[derive(Debug, Deserialize)]
        struct IdList {
            #[serde(rename = "Id", default)]
            ids: Vec<String>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct LinkSetDbXml {
            DbTo: Option<String>,
            #[serde(rename = "Link", default)]
            links: Vec<LinkXml>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct LinkXml {
            Id: Option<String>,
        }

        let parsed: ELinkResult = from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse eLink XML: {}", e)))?;

        let mut result = LinkSet {
            db_from: db_from.as_str().to_string(),
            db_to: db_to.as_str().to_string(),
            links: Vec::new(),
        };

        if parsed.link_sets.is_empty() {
            tracing::warn!("No LinkSet elements found in the eLink response");
            return Ok(result);
        }

        for link_set in parsed.link_sets {
            let linked_ids: Vec<String> = link_set
                .link_set_dbs
                .iter()
                .filter(|db| db.DbTo.as_deref() == Some(db_to.as_str()))
                .flat_map(|db| db.links.iter().filter_map(|l| l.Id.clone()))
                .collect();

            if linked_ids.is_empty() {
                continue;
            }

            let source_ids = link_set.IdList.map(|l| l.ids).unwrap_or_default();
            for source_id in source_ids {
                result.links.push(Link {
                    id: source_id,
                    db: db_from.as_str().to_string(),
                    linked_ids: linked_ids.clone(),
                });
            }
        }

        Ok(result)
    }

    fn validate_ids(ids: &[String]) -> Result<(), SourceError> {
        if ids.is_empty() {
            return Err(SourceError::InvalidRequest(
                "at least one record id is required".to_string(),
            ));
        }
        for id in ids {
            if id.trim().is_empty() {
                return Err(SourceError::InvalidRequest(
                    "record ids must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Source for EntrezSource {
    fn id(&self) -> &str {
        "entrez"
    }

    fn name(&self) -> &str {
        "NCBI Entrez"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::LINKS | SourceCapabilities::FETCH_RAW
    }

    async fn links(
        &self,
        ids: &[String],
        db_from: EntrezDatabase,
        db_to: EntrezDatabase,
    ) -> Result<LinkSet, SourceError> {
        Self::validate_ids(ids)?;

        let url = self.build_link_url(ids, db_from, db_to);
        let xml = fetch_text(&self.client, self.name(), &url).await?;
        Self::parse_link_response(&xml, db_from, db_to)
    }

    async fn fetch_raw(
        &self,
        ids: &[String],
        db: EntrezDatabase,
        retmode: &str,
        rettype: Option<&str>,
    ) -> Result<String, SourceError> {
        Self::validate_ids(ids)?;
        if !FETCH_RETMODES.contains(&retmode) {
            return Err(SourceError::InvalidRequest(format!(
                "invalid retmode '{}', expected one of: {}",
                retmode,
                FETCH_RETMODES.join(", ")
            )));
        }

        let url = self.build_fetch_url(ids, db, retmode, rettype);
        fetch_text(&self.client, self.name(), &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELINK_FIXTURE: &str = r#"<?xml version="1.0" ?>
<eLinkResult>
  <LinkSet>
    <DbFrom>pubmed</DbFrom>
    <IdList>
      <Id>31978945</Id>
    </IdList>
    <LinkSetDb>
      <DbTo>gene</DbTo>
      <LinkName>pubmed_gene</LinkName>
      <Link><Id>43740578</Id></Link>
      <Link><Id>43740568</Id></Link>
    </LinkSetDb>
    <LinkSetDb>
      <DbTo>protein</DbTo>
      <LinkName>pubmed_protein</LinkName>
      <Link><Id>1820526676</Id></Link>
    </LinkSetDb>
  </LinkSet>
</eLinkResult>"#;

    fn source() -> EntrezSource {
        EntrezSource::new(&Config::default()).unwrap()
    }

    fn offline_source() -> EntrezSource {
        EntrezSource::with_base_url(&Config::default(), "http://lifescience.invalid").unwrap()
    }

    #[test]
    fn test_build_link_url() {
        let url = source().build_link_url(
            &["31978945".to_string()],
            EntrezDatabase::Pubmed,
            EntrezDatabase::Gene,
        );

        assert!(url.contains("elink.fcgi?"));
        assert!(url.contains("dbfrom=pubmed"));
        assert!(url.contains("db=gene"));
        assert!(url.contains("id=31978945"));
        assert!(url.contains("retmode=xml"));
        assert!(url.contains("tool=lifescience-mcp"));
    }

    #[test]
    fn test_build_fetch_url_with_rettype() {
        let url = source().build_fetch_url(
            &["NM_000546".to_string()],
            EntrezDatabase::Nucleotide,
            "text",
            Some("fasta"),
        );

        assert!(url.contains("efetch.fcgi?"));
        assert!(url.contains("db=nucleotide"));
        assert!(url.contains("retmode=text"));
        assert!(url.contains("rettype=fasta"));
    }

    #[test]
    fn test_parse_link_response_filters_target_db() {
        let result = EntrezSource::parse_link_response(
            ELINK_FIXTURE,
            EntrezDatabase::Pubmed,
            EntrezDatabase::Gene,
        )
        .unwrap();

        assert_eq!(result.db_from, "pubmed");
        assert_eq!(result.db_to, "gene");
        assert_eq!(result.links.len(), 1);

        let link = &result.links[0];
        assert_eq!(link.id, "31978945");
        assert_eq!(link.linked_ids, vec!["43740578", "43740568"]);
    }

    #[test]
    fn test_parse_link_response_no_matching_target_is_empty() {
        let result = EntrezSource::parse_link_response(
            ELINK_FIXTURE,
            EntrezDatabase::Pubmed,
            EntrezDatabase::Taxonomy,
        )
        .unwrap();

        assert!(result.links.is_empty());
    }

    #[test]
    fn test_parse_link_response_malformed_xml_is_data_format_error() {
        let err = EntrezSource::parse_link_response(
            "<eLinkResult><LinkSet>",
            EntrezDatabase::Pubmed,
            EntrezDatabase::Gene,
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[tokio::test]
    async fn test_empty_ids_rejected_without_request() {
        let err = offline_source()
            .links(&[], EntrezDatabase::Pubmed, EntrezDatabase::Gene)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_invalid_retmode_rejected_without_request() {
        let err = offline_source()
            .fetch_raw(
                &["31978945".to_string()],
                EntrezDatabase::Pubmed,
                "html",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));
    }
}
