//! PubChem adapter using the PUG REST API.
//!
//! Name search resolves to CIDs first, then a batched property lookup fills
//! in the compound records. Synonyms require an extra request per compound
//! and are only fetched for single-record lookups.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{Compound, Record, SearchQuery, SearchResult};
use crate::sources::{fetch_text, validate_query, Source, SourceCapabilities, SourceError};
use crate::utils::{validate_cid, HttpClient};

/// PUG REST base URL
const PUBCHEM_API_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

/// Compound properties requested from the property table
const COMPOUND_PROPERTIES: &str =
    "IUPACName,MolecularFormula,MolecularWeight,CanonicalSMILES,InChIKey";

/// PubChem source
#[derive(Debug, Clone)]
pub struct PubChemSource {
    client: HttpClient,
    base_url: String,
}

impl PubChemSource {
    /// Create a new PubChem source
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Self::with_base_url(config, PUBCHEM_API_URL)
    }

    /// Create with a custom base URL (for testing against a local stub)
    pub fn with_base_url(config: &Config, base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::with_settings(
                config.http.timeout(),
                Some(config.rate_limits.pubchem_requests_per_second),
            )?,
            base_url: base_url.into(),
        })
    }

    /// Build the name-to-CID resolution URL
    fn build_cid_search_url(&self, name: &str) -> String {
        format!(
            "{}/compound/name/{}/cids/JSON",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    /// Build the batched property lookup URL
    fn build_property_url(&self, cids: &[u64]) -> String {
        let ids = cids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/compound/cid/{}/property/{}/JSON",
            self.base_url, ids, COMPOUND_PROPERTIES
        )
    }

    /// Build the synonym lookup URL
    fn build_synonyms_url(&self, cid: u64) -> String {
        format!("{}/compound/cid/{}/synonyms/JSON", self.base_url, cid)
    }

    /// Parse the CID list body
    fn parse_cid_response(json: &str) -> Result<Vec<u64>, SourceError> {
        #[derive(Debug, Deserialize)]
        struct CidBody {
            #[serde(rename = "IdentifierList")]
            identifier_list: IdentifierList,
        }

        #[derive(Debug, Deserialize)]
        struct IdentifierList {
            #[serde(rename = "CID", default)]
            cids: Vec<u64>,
        }

        let body: CidBody = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Failed to parse PubChem CID JSON: {}", e)))?;

        Ok(body.identifier_list.cids)
    }

    /// Parse the property table body into compound records
    fn parse_property_response(json: &str) -> Result<Vec<Compound>, SourceError> {
        #[derive(Debug, Deserialize)]
        struct PropertyBody {
            #[serde(rename = "PropertyTable")]
            property_table: PropertyTable,
        }

        #[derive(Debug, Deserialize)]
        struct PropertyTable {
            #[serde(rename = "Properties", default)]
            properties: Vec<PropertyJson>,
        }

        #[derive(Debug, Deserialize)]
        struct PropertyJson {
            #[serde(rename = "CID")]
            cid: u64,
            #[serde(rename = "IUPACName")]
            iupac_name: Option<String>,
            #[serde(rename = "MolecularFormula")]
            molecular_formula: Option<String>,
            // PUG REST serves the weight as a quoted decimal
            #[serde(rename = "MolecularWeight")]
            molecular_weight: Option<serde_json::Value>,
            #[serde(rename = "CanonicalSMILES")]
            canonical_smiles: Option<String>,
            #[serde(rename = "InChIKey")]
            inchikey: Option<String>,
        }

        let body: PropertyBody = serde_json::from_str(json).map_err(|e| {
            SourceError::Parse(format!("Failed to parse PubChem property JSON: {}", e))
        })?;

        let compounds = body
            .property_table
            .properties
            .into_iter()
            .map(|p| {
                let molecular_weight = p.molecular_weight.and_then(|w| match w {
                    serde_json::Value::String(s) => s.parse().ok(),
                    serde_json::Value::Number(n) => n.as_f64(),
                    _ => None,
                });

                Compound {
                    cid: p.cid,
                    iupac_name: p.iupac_name,
                    molecular_formula: p.molecular_formula,
                    molecular_weight,
                    canonical_smiles: p.canonical_smiles,
                    inchikey: p.inchikey,
                    synonyms: Vec::new(),
                }
            })
            .collect();

        Ok(compounds)
    }

    /// Parse the synonym list body
    fn parse_synonyms_response(json: &str) -> Result<Vec<String>, SourceError> {
        #[derive(Debug, Deserialize)]
        struct SynonymsBody {
            #[serde(rename = "InformationList")]
            information_list: InformationList,
        }

        #[derive(Debug, Deserialize)]
        struct InformationList {
            #[serde(rename = "Information", default)]
            information: Vec<Information>,
        }

        #[derive(Debug, Deserialize)]
        struct Information {
            #[serde(rename = "Synonym", default)]
            synonyms: Vec<String>,
        }

        let body: SynonymsBody = serde_json::from_str(json).map_err(|e| {
            SourceError::Parse(format!("Failed to parse PubChem synonyms JSON: {}", e))
        })?;

        Ok(body
            .information_list
            .information
            .into_iter()
            .next()
            .map(|i| i.synonyms)
            .unwrap_or_default())
    }

    async fn fetch_compounds(&self, cids: &[u64]) -> Result<Vec<Compound>, SourceError> {
        let url = self.build_property_url(cids);
        let body = fetch_text(&self.client, self.name(), &url).await?;
        Self::parse_property_response(&body)
    }
}

#[async_trait]
impl Source for PubChemSource {
    fn id(&self) -> &str {
        "pubchem"
    }

    fn name(&self) -> &str {
        "PubChem"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH | SourceCapabilities::LOOKUP
    }

    fn max_page_size(&self) -> usize {
        100
    }

    /// Name search. PUG REST has no offset parameter for CID lists, so the
    /// page is cut locally from the resolved CID list.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SourceError> {
        validate_query(query, self.max_page_size())?;

        let url = self.build_cid_search_url(&query.query);
        let cids = match fetch_text(&self.client, self.name(), &url).await {
            // PUG REST reports "no hits" as 404 on the name endpoint
            Err(SourceError::Api { status: 404, .. }) => Vec::new(),
            Err(e) => return Err(e),
            Ok(body) => Self::parse_cid_response(&body)?,
        };

        let total = cids.len() as u64;
        let page: Vec<u64> = cids
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();

        let records = if page.is_empty() {
            Vec::new()
        } else {
            self.fetch_compounds(&page)
                .await?
                .into_iter()
                .map(Record::Compound)
                .collect()
        };

        Ok(SearchResult::new(records)
            .total_count(total)
            .paginate(query.offset))
    }

    async fn get_by_id(
        &self,
        id: &str,
        _fields: Option<&[String]>,
    ) -> Result<Record, SourceError> {
        validate_cid(id)?;
        let cid: u64 = id
            .parse()
            .map_err(|_| SourceError::InvalidRequest(format!("CID '{}' out of range", id)))?;

        let mut compounds = match self.fetch_compounds(&[cid]).await {
            Err(SourceError::Api { status: 404, .. }) => {
                return Err(SourceError::NotFound(format!("no compound with CID '{}'", id)));
            }
            other => other?,
        };

        let mut compound = compounds
            .pop()
            .ok_or_else(|| SourceError::NotFound(format!("no compound with CID '{}'", id)))?;

        let synonyms_url = self.build_synonyms_url(cid);
        match fetch_text(&self.client, self.name(), &synonyms_url).await {
            Ok(body) => compound.synonyms = Self::parse_synonyms_response(&body)?,
            // a compound without synonyms is still a valid record
            Err(SourceError::Api { status: 404, .. }) => {}
            Err(e) => return Err(e),
        }

        Ok(Record::Compound(compound))
    }
}
