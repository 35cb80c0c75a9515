//! Integration tests for lifescience-mcp
//!
//! These exercise the source registry and the MCP tool surface without
//! touching the network: argument validation, capability routing, and tool
//! schema shape.

use lifescience_mcp::config::Config;
use lifescience_mcp::mcp::tools::{ToolHandler, ToolRegistry};
use lifescience_mcp::sources::{Source, SourceCapabilities, SourceError, SourceRegistry};
use serde_json::json;
use std::sync::Arc;

fn registry() -> Arc<SourceRegistry> {
    Arc::new(SourceRegistry::new(&Config::default()).unwrap())
}

fn expected_source_count() -> usize {
    let mut count = 0;
    if cfg!(feature = "source-cellosaurus") {
        count += 1;
    }
    if cfg!(feature = "source-pubmed") {
        count += 1;
    }
    if cfg!(feature = "source-pubtator3") {
        count += 1;
    }
    if cfg!(feature = "source-pubchem") {
        count += 1;
    }
    if cfg!(feature = "source-entrez") {
        count += 1;
    }
    count
}

#[test]
fn test_all_compiled_sources_registered() {
    let registry = registry();
    assert_eq!(registry.len(), expected_source_count());

    let mut ids: Vec<&str> = registry.ids().collect();
    ids.sort_unstable();

    let mut expected = Vec::new();
    if cfg!(feature = "source-cellosaurus") {
        expected.push("cellosaurus");
    }
    if cfg!(feature = "source-entrez") {
        expected.push("entrez");
    }
    if cfg!(feature = "source-pubchem") {
        expected.push("pubchem");
    }
    if cfg!(feature = "source-pubmed") {
        expected.push("pubmed");
    }
    if cfg!(feature = "source-pubtator3") {
        expected.push("pubtator3");
    }

    assert_eq!(ids, expected);
}

#[test]
fn test_source_capabilities() {
    let registry = registry();

    for source in registry.all() {
        // every source carries at least one capability, and pagination
        // bounds are sane
        assert!(!source.capabilities().is_empty());
        assert!(source.max_page_size() >= 1);
    }

    #[cfg(feature = "source-cellosaurus")]
    {
        let cellosaurus = registry.get("cellosaurus").unwrap();
        assert!(cellosaurus.supports(SourceCapabilities::SEARCH));
        assert!(cellosaurus.supports(SourceCapabilities::LOOKUP));
        assert!(!cellosaurus.supports(SourceCapabilities::LINKS));
    }

    #[cfg(feature = "source-entrez")]
    {
        let entrez = registry.get("entrez").unwrap();
        assert!(entrez.supports(SourceCapabilities::LINKS));
        assert!(entrez.supports(SourceCapabilities::FETCH_RAW));
        assert!(!entrez.supports(SourceCapabilities::SEARCH));
    }

    #[cfg(feature = "source-pubmed")]
    {
        let pubmed = registry.get("pubmed").unwrap();
        assert!(pubmed.supports(SourceCapabilities::FULLTEXT));
    }
}

#[test]
fn test_tool_registry_exposes_full_surface() {
    let tools = ToolRegistry::from_sources(registry());

    for name in [
        "search",
        "get_by_accession",
        "annotate_articles",
        "autocomplete_entity",
        "get_links",
        "fetch_raw",
        "fetch_fulltext",
        "list_databases",
    ] {
        let tool = tools.get(name);
        assert!(tool.is_some(), "tool '{}' is missing", name);

        let tool = tool.unwrap();
        assert!(!tool.description.is_empty());
        assert_eq!(tool.input_schema["type"], "object");
    }

    assert_eq!(tools.len(), 8);
}

#[test]
fn test_search_tool_schema_requires_query_and_database() {
    let tools = ToolRegistry::from_sources(registry());
    let schema = &tools.get("search").unwrap().input_schema;

    let required: Vec<&str> = schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();

    assert!(required.contains(&"query"));
    assert!(required.contains(&"database"));
}

#[tokio::test]
async fn test_search_rejects_unknown_database() {
    let tools = ToolRegistry::from_sources(registry());
    let handler = &tools.get("search").unwrap().handler;

    let err = handler
        .execute(json!({"query": "hela", "database": "genbank"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_search_rejects_missing_query() {
    let tools = ToolRegistry::from_sources(registry());
    let handler = &tools.get("search").unwrap().handler;

    let err = handler
        .execute(json!({"database": "cellosaurus"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidRequest(_)));
}

#[cfg(feature = "source-entrez")]
#[tokio::test]
async fn test_search_rejects_database_without_search_capability() {
    let tools = ToolRegistry::from_sources(registry());
    let handler = &tools.get("search").unwrap().handler;

    let err = handler
        .execute(json!({"query": "tp53", "database": "entrez"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_search_rejects_negative_offset() {
    let tools = ToolRegistry::from_sources(registry());
    let handler = &tools.get("search").unwrap().handler;

    let err = handler
        .execute(json!({
            "query": "hela",
            "database": "cellosaurus",
            "offset": -1
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidRequest(_)));
}

#[cfg(feature = "source-entrez")]
#[tokio::test]
async fn test_get_links_rejects_unknown_database_name() {
    let tools = ToolRegistry::from_sources(registry());
    let handler = &tools.get("get_links").unwrap().handler;

    let err = handler
        .execute(json!({
            "ids": ["31978945"],
            "db_from": "pubmed",
            "db_to": "genbank"
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_autocomplete_rejects_unknown_concept() {
    let tools = ToolRegistry::from_sources(registry());
    let handler = &tools.get("autocomplete_entity").unwrap().handler;

    let err = handler
        .execute(json!({"keyword": "remdesivir", "concept": "species"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_list_databases_reports_capabilities() {
    let tools = ToolRegistry::from_sources(registry());
    let handler = &tools.get("list_databases").unwrap().handler;

    let value = handler.execute(json!({})).await.unwrap();
    let databases = value["databases"].as_array().unwrap();
    assert_eq!(databases.len(), expected_source_count());

    // sorted by id, each entry fully populated
    let ids: Vec<&str> = databases
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    for database in databases {
        assert!(database["name"].as_str().is_some());
        assert!(database["max_page_size"].as_u64().is_some());
        assert!(!database["capabilities"].as_array().unwrap().is_empty());
    }
}
