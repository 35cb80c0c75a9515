//! End-to-end adapter tests against a local HTTP stub.
//!
//! Each test stands up a mockito server with a canned upstream payload and
//! drives a source through its public surface, checking the mapped records
//! and the error taxonomy.

use lifescience_mcp::config::Config;
use lifescience_mcp::mcp::tools::{ToolHandler, ToolRegistry};
use lifescience_mcp::models::{EntrezDatabase, Record, SearchQuery};
use lifescience_mcp::sources::{
    CellosaurusSource, EntrezSource, PubChemSource, PubMedSource, PubTator3Source, Source,
    SourceError, SourceRegistry,
};
use serde_json::json;
use std::sync::Arc;

const CELLOSAURUS_SEARCH_BODY: &str = r#"{
    "total_count": 42,
    "cell_lines": [
        {
            "accession": "CVCL_0030",
            "name": "HeLa",
            "category": "Cancer cell line",
            "species": "Homo sapiens"
        },
        {
            "accession": "CVCL_0058",
            "name": "HeLa S3",
            "category": "Cancer cell line",
            "species": "Homo sapiens"
        }
    ]
}"#;

const CELLOSAURUS_HELA_BODY: &str = r#"{
    "accession": "CVCL_0030",
    "name": "HeLa",
    "synonyms": ["Hela", "He La"],
    "category": "Cancer cell line",
    "species": "Homo sapiens",
    "sex": "Female",
    "derived_from_site": "Uterus; cervix"
}"#;

#[tokio::test]
async fn test_cellosaurus_search_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/cell-line")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CELLOSAURUS_SEARCH_BODY)
        .create_async()
        .await;

    let source = CellosaurusSource::with_base_url(&Config::default(), server.url()).unwrap();
    let query = SearchQuery::new("name:HeLa").limit(5);
    let result = source.search(&query).await.unwrap();

    assert!(result.records.len() <= query.limit);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.total_count, Some(42));
    assert_eq!(result.next_offset, Some(2));
    assert_eq!(result.records[0].accession(), "CVCL_0030");
}

#[tokio::test]
async fn test_cellosaurus_lookup_returns_matching_accession() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/cell-line/CVCL_0030")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CELLOSAURUS_HELA_BODY)
        .create_async()
        .await;

    let source = CellosaurusSource::with_base_url(&Config::default(), server.url()).unwrap();
    let record = source.get_by_id("CVCL_0030", None).await.unwrap();

    assert_eq!(record.accession(), "CVCL_0030");
    match record {
        Record::CellLine(cell_line) => assert_eq!(cell_line.name, "HeLa"),
        other => panic!("expected a cell line record, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cellosaurus_unknown_accession_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/cell-line/CVCL_9999")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let source = CellosaurusSource::with_base_url(&Config::default(), server.url()).unwrap();
    let err = source.get_by_id("CVCL_9999", None).await.unwrap_err();

    assert!(matches!(err, SourceError::NotFound(_)));
}

#[tokio::test]
async fn test_cellosaurus_malformed_payload_is_data_format_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/cell-line")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"unexpected": "shape"}"#)
        .create_async()
        .await;

    let source = CellosaurusSource::with_base_url(&Config::default(), server.url()).unwrap();
    let err = source.search(&SearchQuery::new("name:HeLa")).await.unwrap_err();

    assert!(matches!(err, SourceError::Parse(_)));
}

#[tokio::test]
async fn test_pubmed_search_end_to_end() {
    let mut server = mockito::Server::new_async().await;

    let _esearch = server
        .mock("GET", "/esearch.fcgi")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"esearchresult": {"count": "1", "idlist": ["31978945"],
                "querytranslation": "\"covid\"[All Fields]"}}"#,
        )
        .create_async()
        .await;

    let _efetch = server
        .mock("GET", "/efetch.fcgi")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"<PubmedArticleSet>
                 <PubmedArticle>
                   <MedlineCitation>
                     <PMID Version="1">31978945</PMID>
                     <Article>
                       <ArticleTitle>A Novel Coronavirus from Patients with Pneumonia in China, 2019.</ArticleTitle>
                     </Article>
                   </MedlineCitation>
                 </PubmedArticle>
               </PubmedArticleSet>"#,
        )
        .create_async()
        .await;

    let source = PubMedSource::with_base_url(&Config::default(), server.url()).unwrap();
    let result = source.search(&SearchQuery::new("covid")).await.unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.total_count, Some(1));
    assert_eq!(result.records[0].accession(), "31978945");
    assert_eq!(
        result.query_translation.as_deref(),
        Some("\"covid\"[All Fields]")
    );
}

#[tokio::test]
async fn test_pubmed_lookup_empty_set_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _efetch = server
        .mock("GET", "/efetch.fcgi")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body("<PubmedArticleSet></PubmedArticleSet>")
        .create_async()
        .await;

    let source = PubMedSource::with_base_url(&Config::default(), server.url()).unwrap();
    let err = source.get_by_id("99999999", None).await.unwrap_err();

    assert!(matches!(err, SourceError::NotFound(_)));
}

#[tokio::test]
async fn test_pubchem_lookup_with_synonyms() {
    let mut server = mockito::Server::new_async().await;

    let _properties = server
        .mock(
            "GET",
            "/compound/cid/2244/property/IUPACName,MolecularFormula,MolecularWeight,CanonicalSMILES,InChIKey/JSON",
        )
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"PropertyTable": {"Properties": [
                {"CID": 2244, "MolecularFormula": "C9H8O4", "MolecularWeight": "180.16",
                 "IUPACName": "2-acetyloxybenzoic acid"}
            ]}}"#,
        )
        .create_async()
        .await;

    let _synonyms = server
        .mock("GET", "/compound/cid/2244/synonyms/JSON")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"InformationList": {"Information": [
                {"CID": 2244, "Synonym": ["aspirin", "acetylsalicylic acid"]}
            ]}}"#,
        )
        .create_async()
        .await;

    let source = PubChemSource::with_base_url(&Config::default(), server.url()).unwrap();
    let record = source.get_by_id("2244", None).await.unwrap();

    assert_eq!(record.accession(), "2244");
    match record {
        Record::Compound(compound) => {
            assert_eq!(compound.molecular_weight, Some(180.16));
            assert_eq!(compound.synonyms, vec!["aspirin", "acetylsalicylic acid"]);
        }
        other => panic!("expected a compound record, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pubtator3_annotate_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _export = server
        .mock("GET", "/publications/export/biocjson")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"PubTator3": [
                {"_id": "31978945", "passages": [
                    {"infons": {"section_type": "TITLE"},
                     "annotations": [{"infons": {"identifier": "MESH:D011024", "biotype": "disease", "name": "pneumonia"}}]}
                ]}
            ]}"#,
        )
        .create_async()
        .await;

    let source = PubTator3Source::with_base_url(&Config::default(), server.url()).unwrap();
    let annotations = source.annotate(&["31978945".to_string()]).await.unwrap();

    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].pmid, "31978945");
    assert_eq!(annotations[0].sections[0].annotations[0].name, "pneumonia");
}

#[tokio::test]
async fn test_entrez_links_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _elink = server
        .mock("GET", "/elink.fcgi")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"<eLinkResult>
                 <LinkSet>
                   <DbFrom>pubmed</DbFrom>
                   <IdList><Id>31978945</Id></IdList>
                   <LinkSetDb>
                     <DbTo>gene</DbTo>
                     <LinkName>pubmed_gene</LinkName>
                     <Link><Id>43740578</Id></Link>
                   </LinkSetDb>
                 </LinkSet>
               </eLinkResult>"#,
        )
        .create_async()
        .await;

    let source = EntrezSource::with_base_url(&Config::default(), server.url()).unwrap();
    let links = source
        .links(
            &["31978945".to_string()],
            EntrezDatabase::Pubmed,
            EntrezDatabase::Gene,
        )
        .await
        .unwrap();

    assert_eq!(links.links.len(), 1);
    assert_eq!(links.links[0].linked_ids, vec!["43740578"]);
}

#[tokio::test]
async fn test_field_selection_through_tool_surface() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/cell-line/CVCL_0030")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(CELLOSAURUS_HELA_BODY)
        .create_async()
        .await;

    let config = Config::default();
    let mut registry = SourceRegistry::new(&config).unwrap();
    registry.register(Arc::new(
        CellosaurusSource::with_base_url(&config, server.url()).unwrap(),
    ));

    let tools = ToolRegistry::from_sources(Arc::new(registry));
    let handler = &tools.get("get_by_accession").unwrap().handler;

    let value = handler
        .execute(json!({
            "id": "CVCL_0030",
            "database": "cellosaurus",
            "fields": ["name", "species"]
        }))
        .await
        .unwrap();

    // exactly the requested fields plus the tag and identifier
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["accession", "kind", "name", "species"]);
    assert_eq!(value["accession"], "CVCL_0030");
}
