//! PubMed adapter using the NCBI E-utilities API.
//!
//! Searching is a two-step flow: `esearch.fcgi` resolves the query to PMIDs
//! (JSON), `efetch.fcgi` resolves PMIDs to article records (XML). Full text
//! comes from PubMed Central for articles deposited there.

use async_trait::async_trait;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{Article, Author, Journal, Record, SearchQuery, SearchResult};
use crate::sources::{fetch_text, validate_query, Source, SourceCapabilities, SourceError};
use crate::utils::{validate_date, validate_pmid, HttpClient};

/// NCBI E-utilities base URL
const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// PubMed source
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: HttpClient,
    base_url: String,
    tool: String,
    email: Option<String>,
    api_key: Option<String>,
}

impl PubMedSource {
    /// Create a new PubMed source
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

    /// NCBI client identification, appended to every E-utilities request
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

    /// Assemble the esearch term from the query string and its filters
    fn build_term(query: &SearchQuery) -> String {
        let mut term = query.query.clone();

        match (&query.date_start, &query.date_end) {
            (Some(start), Some(end)) => term = format!("{} AND {}:{}[dp]", term, start, end),
            (Some(start), None) => term = format!("{} AND {}[dp]", term, start),
            (None, Some(end)) => term = format!("{} AND {}[dp]", term, end),
            (None, None) => {}
        }

        if !query.mesh_terms.is_empty() {
            let mesh_query = query
                .mesh_terms
                .iter()
                .map(|t| format!("\"{}\"[mesh]", t))
                .collect::<Vec<_>>()
                .join(" AND ");
            term = format!("{} AND ({})", term, mesh_query);
        }

        if query.open_access {
            term = format!("{} AND \"pubmed pmc\"[sb]", term);
        }

        term
    }

    /// Build the esearch URL
    fn build_search_url(&self, query: &SearchQuery) -> String {
        let mut params = vec![
            ("db".to_string(), "pubmed".to_string()),
            ("term".to_string(), Self::build_term(query)),
            ("retmode".to_string(), "json".to_string()),
            ("retmax".to_string(), query.limit.to_string()),
            ("retstart".to_string(), query.offset.to_string()),
        ];
        params.extend(self.identification_params());

        format!("{}/esearch.fcgi?{}", self.base_url, Self::encode_params(&params))
    }

    /// Build the efetch URL for specific PMIDs
    fn build_fetch_url(&self, pmids: &[String]) -> String {
        let mut params = vec![
            ("db".to_string(), "pubmed".to_string()),
            ("id".to_string(), pmids.join(",")),
            ("retmode".to_string(), "xml".to_string()),
        ];
        params.extend(self.identification_params());

        format!("{}/efetch.fcgi?{}", self.base_url, Self::encode_params(&params))
    }

    /// Build the PMC efetch URL for full text
    fn build_fulltext_url(&self, pmc_id: &str) -> String {
        let mut params = vec![
            ("db".to_string(), "pmc".to_string()),
            ("id".to_string(), pmc_id.to_string()),
            ("retmode".to_string(), "xml".to_string()),
            ("rettype".to_string(), "full".to_string()),
        ];
        params.extend(self.identification_params());

        format!("{}/efetch.fcgi?{}", self.base_url, Self::encode_params(&params))
    }

    /// Parse the esearch JSON body
    fn parse_search_response(
        json: &str,
    ) -> Result<(Vec<String>, Option<u64>, Option<String>), SourceError> {
        #[derive(Debug, Deserialize)]
        struct ESearchBody {
            esearchresult: ESearchResult,
        }

        #[derive(Debug, Deserialize)]
        struct ESearchResult {
            #[serde(default)]
            idlist: Vec<String>,
            count: Option<String>,
            querytranslation: Option<String>,
        }

        let body: ESearchBody = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Failed to parse esearch JSON: {}", e)))?;

        let total = body.esearchresult.count.and_then(|c| c.parse().ok());
        Ok((
            body.esearchresult.idlist,
            total,
            body.esearchresult.querytranslation,
        ))
    }

    /// Parse the efetch XML body into article records
    fn parse_fetch_response(xml: &str) -> Result<Vec<Article>, SourceError> {
        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct PubmedArticleSet {
            #[serde(rename = "PubmedArticle", default)]
            articles: Vec<PubmedArticle>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct PubmedArticle {
            MedlineCitation: Option<MedlineCitation>,
            PubmedData: Option<PubmedData>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct MedlineCitation {
            PMID: Option<Pmid>,
            Article: Option<ArticleXml>,
        }

        #[derive(Debug, Deserialize)]
        struct Pmid {
            #[serde(rename = "$text")]
            id: String,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct ArticleXml {
            Journal: Option<JournalXml>,
            ArticleTitle: Option<ArticleTitle>,
            Abstract: Option<Abstract>,
            AuthorList: Option<AuthorList>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct JournalXml {
            Title: Option<String>,
            ISOAbbreviation: Option<String>,
            JournalIssue: Option<JournalIssue>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct JournalIssue {
            PubDate: Option<PubDate>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct PubDate {
            Year: Option<String>,
            Month: Option<String>,
            Day: Option<String>,
            MedlineDate: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        struct ArticleTitle {
            #[serde(rename = "$text")]
            title: String,
        }

        #[derive(Debug, Deserialize)]
        struct Abstract {
            #[serde(rename = "AbstractText", default)]
            abstract_texts: Vec<AbstractText>,
        }

        #[derive(Debug, Deserialize)]
        struct AbstractText {
            #[serde(rename = "$text")]
            text: String,
        }

        #[derive(Debug, Deserialize)]
        struct AuthorList {
            #[serde(rename = "Author", default)]
            authors: Vec<AuthorXml>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct AuthorXml {
            LastName: Option<String>,
            ForeName: Option<String>,
            Initials: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct PubmedData {
            ArticleIdList: Option<ArticleIdList>,
        }

        #[derive(Debug, Deserialize)]
        struct ArticleIdList {
            #[serde(rename = "ArticleId", default)]
            ids: Vec<ArticleId>,
        }

        #[derive(Debug, Deserialize)]
        struct ArticleId {
            #[serde(rename = "@IdType")]
            id_type: String,
            #[serde(rename = "$text")]
            value: String,
        }

        let result: PubmedArticleSet = from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse efetch XML: {}", e)))?;

        let mut articles = Vec::new();

        for entry in result.articles {
            let citation = entry.MedlineCitation;

            // PMID is the identity; skip entries without one
            let Some(pmid) = citation
                .as_ref()
                .and_then(|m| m.PMID.as_ref())
                .map(|p| p.id.clone())
            else {
                continue;
            };

            let article_xml = citation.as_ref().and_then(|m| m.Article.as_ref());

            let title = article_xml
                .and_then(|a| a.ArticleTitle.as_ref())
                .map(|t| t.title.clone());

            let abstract_text = article_xml.and_then(|a| {
                a.Abstract.as_ref().map(|ab| {
                    ab.abstract_texts
                        .iter()
                        .map(|at| at.text.clone())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
            });

            let journal = article_xml.and_then(|a| a.Journal.as_ref()).map(|j| {
                let pub_date = j
                    .JournalIssue
                    .as_ref()
                    .and_then(|issue| issue.PubDate.as_ref())
                    .and_then(|pd| {
                        let parts: Vec<String> = [&pd.Year, &pd.Month, &pd.Day]
                            .into_iter()
                            .filter_map(|p| p.clone())
                            .collect();
                        if parts.is_empty() {
                            pd.MedlineDate.clone()
                        } else {
                            Some(parts.join(" "))
                        }
                    });

                Journal {
                    title: j.Title.clone(),
                    iso_abbreviation: j.ISOAbbreviation.clone(),
                    pub_date,
                }
            });

            let authors = article_xml
                .and_then(|a| a.AuthorList.as_ref())
                .map(|list| {
                    list.authors
                        .iter()
                        .filter(|a| {
                            a.LastName.is_some() || a.ForeName.is_some() || a.Initials.is_some()
                        })
                        .map(|a| Author {
                            last_name: a.LastName.clone(),
                            fore_name: a.ForeName.clone(),
                            initials: a.Initials.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            let article_ids = entry
                .PubmedData
                .as_ref()
                .and_then(|pd| pd.ArticleIdList.as_ref())
                .map(|list| list.ids.as_slice())
                .unwrap_or_default();

            let pmc_id = article_ids
                .iter()
                .find(|id| id.id_type == "pmc")
                .map(|id| id.value.clone());
            let doi = article_ids
                .iter()
                .find(|id| id.id_type == "doi")
                .map(|id| id.value.clone());

            articles.push(Article {
                pmid,
                pmc_id,
                doi,
                title,
                abstract_text,
                journal,
                authors,
            });
        }

        Ok(articles)
    }

    /// Extract plain text (title, abstract, body paragraphs) from PMC
    /// full-text XML
    fn parse_fulltext_xml(xml: &str) -> Result<String, SourceError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut path: Vec<String> = Vec::new();
        let mut sections: Vec<String> = Vec::new();
        let mut current = String::new();

        fn in_scope(path: &[String]) -> bool {
            let in_title = path.iter().any(|t| t == "article-title");
            let in_paragraph = path.iter().any(|t| t == "p")
                && path.iter().any(|t| t == "abstract" || t == "body");
            in_title || in_paragraph
        }

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    path.push(String::from_utf8_lossy(start.name().as_ref()).into_owned());
                }
                Ok(Event::End(_)) => {
                    let Some(tag) = path.pop() else { continue };
                    if (tag == "article-title" || tag == "p") && !current.trim().is_empty() {
                        sections.push(current.trim().to_string());
                    }
                    if tag == "article-title" || tag == "p" {
                        current.clear();
                    }
                }
                Ok(Event::Text(text)) => {
                    if in_scope(&path) {
                        let text = text.unescape().map_err(|e| {
                            SourceError::Parse(format!("Failed to decode PMC XML text: {}", e))
                        })?;
                        if !current.is_empty() && !current.ends_with(' ') {
                            current.push(' ');
                        }
                        current.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SourceError::Parse(format!("Failed to parse PMC XML: {}", e)));
                }
                Ok(_) => {}
            }
        }

        if sections.is_empty() {
            return Err(SourceError::Parse(
                "no text content found in PMC XML".to_string(),
            ));
        }

        Ok(sections.join("\n\n"))
    }

    async fn fetch_articles(&self, pmids: &[String]) -> Result<Vec<Article>, SourceError> {
        let url = self.build_fetch_url(pmids);
        let xml = fetch_text(&self.client, self.name(), &url).await?;
        Self::parse_fetch_response(&xml)
    }
}

#[async_trait]
impl Source for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH | SourceCapabilities::LOOKUP | SourceCapabilities::FULLTEXT
    }

    fn max_page_size(&self) -> usize {
        100
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SourceError> {
        validate_query(query, self.max_page_size())?;
        if let Some(date) = &query.date_start {
            validate_date(date)?;
        }
        if let Some(date) = &query.date_end {
            validate_date(date)?;
        }

        let url = self.build_search_url(query);
        let body = fetch_text(&self.client, self.name(), &url).await?;
        let (pmids, total, query_translation) = Self::parse_search_response(&body)?;

        let mut result = if pmids.is_empty() {
            SearchResult::new(Vec::new())
        } else {
            let mut articles = self.fetch_articles(&pmids).await?;
            articles.truncate(query.limit);
            SearchResult::new(articles.into_iter().map(Record::Article).collect())
        };

        if let Some(total) = total {
            result = result.total_count(total);
        }
        result.query_translation = query_translation;

        Ok(result.paginate(query.offset))
    }

    async fn get_by_id(
        &self,
        id: &str,
        _fields: Option<&[String]>,
    ) -> Result<Record, SourceError> {
        validate_pmid(id)?;

        let articles = self.fetch_articles(&[id.to_string()]).await?;
        articles
            .into_iter()
            .next()
            .map(Record::Article)
            .ok_or_else(|| SourceError::NotFound(format!("no article with PMID '{}'", id)))
    }

    async fn fulltext(&self, pmid: &str) -> Result<String, SourceError> {
        validate_pmid(pmid)?;

        let articles = self.fetch_articles(&[pmid.to_string()]).await?;
        let article = articles
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(format!("no article with PMID '{}'", pmid)))?;

        let pmc_id = article.pmc_id.ok_or_else(|| {
            SourceError::NotFound(format!(
                "article {} has no PubMed Central deposit; full text unavailable",
                pmid
            ))
        })?;

        let url = self.build_fulltext_url(&pmc_id);
        let xml = fetch_text(&self.client, self.name(), &url).await?;
        Self::parse_fulltext_xml(&xml)
    }
}
