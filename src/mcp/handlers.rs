//! Tool handlers bridging MCP arguments to the source adapters.
//!
//! Handlers own argument extraction and capability routing; everything
//! database-specific stays behind the [`Source`] trait. Database-specific
//! operations (annotate, links, ...) route to whichever registered source
//! carries the capability instead of hardcoding an id.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::models::{select_fields, Concept, EntrezDatabase, SearchQuery, DEFAULT_LIMIT};
use crate::sources::{Source, SourceCapabilities, SourceError, SourceRegistry};

use super::tools::ToolHandler;

fn required_str(args: &Value, key: &str) -> Result<String, SourceError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            SourceError::InvalidRequest(format!("missing required parameter '{}'", key))
        })
}

fn optional_str(args: &Value, key: &str) -> Result<Option<String>, SourceError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SourceError::InvalidRequest(format!(
            "parameter '{}' must be a string",
            key
        ))),
    }
}

fn optional_usize(args: &Value, key: &str) -> Result<Option<usize>, SourceError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| n as usize)
            .map(Some)
            .ok_or_else(|| {
                SourceError::InvalidRequest(format!(
                    "parameter '{}' must be a non-negative integer",
                    key
                ))
            }),
    }
}

fn optional_bool(args: &Value, key: &str) -> Result<Option<bool>, SourceError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_bool().map(Some).ok_or_else(|| {
            SourceError::InvalidRequest(format!("parameter '{}' must be a boolean", key))
        }),
    }
}

fn optional_str_list(args: &Value, key: &str) -> Result<Option<Vec<String>>, SourceError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    SourceError::InvalidRequest(format!(
                        "parameter '{}' must be an array of strings",
                        key
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(SourceError::InvalidRequest(format!(
            "parameter '{}' must be an array of strings",
            key
        ))),
    }
}

fn required_str_list(args: &Value, key: &str) -> Result<Vec<String>, SourceError> {
    optional_str_list(args, key)?.ok_or_else(|| {
        SourceError::InvalidRequest(format!("missing required parameter '{}'", key))
    })
}

/// Resolve the one registered source carrying a capability
fn source_with_capability<'a>(
    sources: &'a SourceRegistry,
    capability: SourceCapabilities,
    operation: &str,
) -> Result<&'a Arc<dyn Source>, SourceError> {
    sources
        .with_capability(capability)
        .into_iter()
        .next()
        .ok_or_else(|| {
            SourceError::InvalidRequest(format!(
                "no registered database supports {}",
                operation
            ))
        })
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<Value, SourceError> {
    serde_json::to_value(value)
        .map_err(|e| SourceError::Parse(format!("Failed to serialize result: {}", e)))
}

/// Handler for the unified `search` tool
#[derive(Debug)]
pub struct SearchHandler {
    pub sources: Arc<SourceRegistry>,
}

#[async_trait::async_trait]
impl ToolHandler for SearchHandler {
    async fn execute(&self, args: Value) -> Result<Value, SourceError> {
        let database = required_str(&args, "database")?;
        let source = self.sources.get_required(&database)?;
        if !source.supports(SourceCapabilities::SEARCH) {
            return Err(SourceError::InvalidRequest(format!(
                "database '{}' does not support search",
                database
            )));
        }

        let mut query = SearchQuery::new(required_str(&args, "query")?)
            .offset(optional_usize(&args, "offset")?.unwrap_or(0))
            .limit(optional_usize(&args, "limit")?.unwrap_or(DEFAULT_LIMIT));
        query.fields = optional_str_list(&args, "fields")?;
        query.date_start = optional_str(&args, "date_start")?;
        query.date_end = optional_str(&args, "date_end")?;
        query.mesh_terms = optional_str_list(&args, "mesh_terms")?.unwrap_or_default();
        query.open_access = optional_bool(&args, "open_access")?.unwrap_or(false);

        let result = source.search(&query).await?;

        let mut value = serialize(&result)?;
        if let Some(fields) = &query.fields {
            value["records"] = Value::Array(
                result
                    .records
                    .iter()
                    .map(|record| select_fields(record, fields))
                    .collect(),
            );
        }

        Ok(value)
    }
}

/// Handler for the `get_by_accession` tool
#[derive(Debug)]
pub struct GetByAccessionHandler {
    pub sources: Arc<SourceRegistry>,
}

#[async_trait::async_trait]
impl ToolHandler for GetByAccessionHandler {
    async fn execute(&self, args: Value) -> Result<Value, SourceError> {
        let database = required_str(&args, "database")?;
        let source = self.sources.get_required(&database)?;
        if !source.supports(SourceCapabilities::LOOKUP) {
            return Err(SourceError::InvalidRequest(format!(
                "database '{}' does not support accession lookup",
                database
            )));
        }

        let id = required_str(&args, "id")?;
        let fields = optional_str_list(&args, "fields")?;

        let record = source.get_by_id(&id, fields.as_deref()).await?;

        match &fields {
            Some(fields) => Ok(select_fields(&record, fields)),
            None => serialize(&record),
        }
    }
}

/// Handler for the `annotate_articles` tool
#[derive(Debug)]
pub struct AnnotateArticlesHandler {
    pub sources: Arc<SourceRegistry>,
}

#[async_trait::async_trait]
impl ToolHandler for AnnotateArticlesHandler {
    async fn execute(&self, args: Value) -> Result<Value, SourceError> {
        let pmids = required_str_list(&args, "pmids")?;
        let source = source_with_capability(
            &self.sources,
            SourceCapabilities::ANNOTATE,
            "entity annotation",
        )?;

        serialize(&source.annotate(&pmids).await?)
    }
}

/// Handler for the `autocomplete_entity` tool
#[derive(Debug)]
pub struct AutocompleteEntityHandler {
    pub sources: Arc<SourceRegistry>,
}

#[async_trait::async_trait]
impl ToolHandler for AutocompleteEntityHandler {
    async fn execute(&self, args: Value) -> Result<Value, SourceError> {
        let keyword = required_str(&args, "keyword")?;
        let concept = optional_str(&args, "concept")?
            .map(|c| c.parse::<Concept>().map_err(SourceError::InvalidRequest))
            .transpose()?;

        let source = source_with_capability(
            &self.sources,
            SourceCapabilities::AUTOCOMPLETE,
            "entity autocomplete",
        )?;

        serialize(&source.autocomplete(&keyword, concept).await?)
    }
}

/// Handler for the `get_links` tool
#[derive(Debug)]
pub struct GetLinksHandler {
    pub sources: Arc<SourceRegistry>,
}

#[async_trait::async_trait]
impl ToolHandler for GetLinksHandler {
    async fn execute(&self, args: Value) -> Result<Value, SourceError> {
        let ids = required_str_list(&args, "ids")?;
        let db_from = required_str(&args, "db_from")?
            .parse::<EntrezDatabase>()
            .map_err(SourceError::InvalidRequest)?;
        let db_to = required_str(&args, "db_to")?
            .parse::<EntrezDatabase>()
            .map_err(SourceError::InvalidRequest)?;

        let source =
            source_with_capability(&self.sources, SourceCapabilities::LINKS, "record linking")?;

        serialize(&source.links(&ids, db_from, db_to).await?)
    }
}

/// Handler for the `fetch_raw` tool
#[derive(Debug)]
pub struct FetchRawHandler {
    pub sources: Arc<SourceRegistry>,
}

#[async_trait::async_trait]
impl ToolHandler for FetchRawHandler {
    async fn execute(&self, args: Value) -> Result<Value, SourceError> {
        let ids = required_str_list(&args, "ids")?;
        let db = required_str(&args, "db")?
            .parse::<EntrezDatabase>()
            .map_err(SourceError::InvalidRequest)?;
        let retmode = optional_str(&args, "retmode")?.unwrap_or_else(|| "xml".to_string());
        let rettype = optional_str(&args, "rettype")?;

        let source =
            source_with_capability(&self.sources, SourceCapabilities::FETCH_RAW, "raw fetch")?;

        let data = source
            .fetch_raw(&ids, db, &retmode, rettype.as_deref())
            .await?;

        Ok(json!({
            "db": db.as_str(),
            "retmode": retmode,
            "data": data,
        }))
    }
}

/// Handler for the `fetch_fulltext` tool
#[derive(Debug)]
pub struct FetchFulltextHandler {
    pub sources: Arc<SourceRegistry>,
}

#[async_trait::async_trait]
impl ToolHandler for FetchFulltextHandler {
    async fn execute(&self, args: Value) -> Result<Value, SourceError> {
        let pmid = required_str(&args, "pmid")?;
        let source = source_with_capability(
            &self.sources,
            SourceCapabilities::FULLTEXT,
            "full-text retrieval",
        )?;

        let text = source.fulltext(&pmid).await?;

        Ok(json!({
            "pmid": pmid,
            "text": text,
        }))
    }
}

/// Handler for the `list_databases` tool
#[derive(Debug)]
pub struct ListDatabasesHandler {
    pub sources: Arc<SourceRegistry>,
}

#[async_trait::async_trait]
impl ToolHandler for ListDatabasesHandler {
    async fn execute(&self, _args: Value) -> Result<Value, SourceError> {
        let mut databases: Vec<Value> = self
            .sources
            .all()
            .map(|source| {
                json!({
                    "id": source.id(),
                    "name": source.name(),
                    "capabilities": source.capabilities().names(),
                    "max_page_size": source.max_page_size(),
                })
            })
            .collect();

        databases.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));

        Ok(json!({ "databases": databases }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_str() {
        let args = json!({"query": "hela"});
        assert_eq!(required_str(&args, "query").unwrap(), "hela");
        assert!(matches!(
            required_str(&args, "database"),
            Err(SourceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_optional_usize_rejects_negative() {
        let args = json!({"offset": -5});
        assert!(matches!(
            optional_usize(&args, "offset"),
            Err(SourceError::InvalidRequest(_))
        ));

        let args = json!({"offset": 5});
        assert_eq!(optional_usize(&args, "offset").unwrap(), Some(5));

        let args = json!({});
        assert_eq!(optional_usize(&args, "offset").unwrap(), None);
    }

    #[test]
    fn test_optional_str_list_rejects_mixed_types() {
        let args = json!({"fields": ["ac", 5]});
        assert!(matches!(
            optional_str_list(&args, "fields"),
            Err(SourceError::InvalidRequest(_))
        ));

        let args = json!({"fields": ["ac", "id"]});
        assert_eq!(
            optional_str_list(&args, "fields").unwrap(),
            Some(vec!["ac".to_string(), "id".to_string()])
        );
    }
}
