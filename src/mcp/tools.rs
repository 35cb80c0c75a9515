//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::models::{EntrezDatabase, DEFAULT_LIMIT};
use crate::sources::{SourceError, SourceRegistry};

use super::handlers::{
    AnnotateArticlesHandler, AutocompleteEntityHandler, FetchFulltextHandler, FetchRawHandler,
    GetByAccessionHandler, GetLinksHandler, ListDatabasesHandler, SearchHandler,
};

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g. "search")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,

    /// Handler executing the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, SourceError>;
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a new tool registry over the given sources
    pub fn from_sources(sources: Arc<SourceRegistry>) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };

        let databases: Vec<String> = {
            let mut ids: Vec<String> = sources.ids().map(str::to_string).collect();
            ids.sort_unstable();
            ids
        };

        registry.register(Tool {
            name: "search".to_string(),
            description: format!(
                "Search a life-science database ({}) using its native query syntax",
                databases.join(", ")
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query in the database's own grammar (e.g. 'ox:sapiens' for Cellosaurus, 'crispr[tiab]' for PubMed)"
                    },
                    "database": {
                        "type": "string",
                        "description": "Database to search",
                        "enum": databases.clone()
                    },
                    "fields": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Restrict returned records to these fields (the identifier field is always kept)"
                    },
                    "offset": {
                        "type": "integer",
                        "description": "Record offset into the result set",
                        "default": 0
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of records to return",
                        "default": DEFAULT_LIMIT
                    },
                    "date_start": {
                        "type": "string",
                        "description": "Publication date range start, YYYY/MM/DD (PubMed only)"
                    },
                    "date_end": {
                        "type": "string",
                        "description": "Publication date range end, YYYY/MM/DD (PubMed only)"
                    },
                    "mesh_terms": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "MeSH term filters, ANDed together (PubMed only)"
                    },
                    "open_access": {
                        "type": "boolean",
                        "description": "Restrict to open-access articles (PubMed only)",
                        "default": false
                    }
                },
                "required": ["query", "database"]
            }),
            handler: Arc::new(SearchHandler {
                sources: sources.clone(),
            }),
        });

        registry.register(Tool {
            name: "get_by_accession".to_string(),
            description: "Fetch a single record by its accession/identifier (e.g. 'CVCL_0030', a PMID, or a PubChem CID)".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Accession or identifier of the record"
                    },
                    "database": {
                        "type": "string",
                        "description": "Database to look up",
                        "enum": databases.clone()
                    },
                    "fields": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Restrict the returned record to these fields (the identifier field is always kept)"
                    }
                },
                "required": ["id", "database"]
            }),
            handler: Arc::new(GetByAccessionHandler {
                sources: sources.clone(),
            }),
        });

        registry.register(Tool {
            name: "annotate_articles".to_string(),
            description: "Extract normalized gene/disease/chemical entities from PubMed articles (PubTator3)".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pmids": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "PubMed IDs of the articles to annotate"
                    }
                },
                "required": ["pmids"]
            }),
            handler: Arc::new(AnnotateArticlesHandler {
                sources: sources.clone(),
            }),
        });

        registry.register(Tool {
            name: "autocomplete_entity".to_string(),
            description: "Resolve a free-text keyword to its best normalized entity term (PubTator3)".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "keyword": {
                        "type": "string",
                        "description": "Keyword to normalize"
                    },
                    "concept": {
                        "type": "string",
                        "description": "Restrict matches to one concept class",
                        "enum": ["gene", "disease", "chemical"]
                    }
                },
                "required": ["keyword"]
            }),
            handler: Arc::new(AutocompleteEntityHandler {
                sources: sources.clone(),
            }),
        });

        registry.register(Tool {
            name: "get_links".to_string(),
            description: "Discover links between records of two NCBI databases (Entrez eLink)".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ids": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Record ids in the source database"
                    },
                    "db_from": {
                        "type": "string",
                        "description": "Source database",
                        "enum": EntrezDatabase::names()
                    },
                    "db_to": {
                        "type": "string",
                        "description": "Target database",
                        "enum": EntrezDatabase::names()
                    }
                },
                "required": ["ids", "db_from", "db_to"]
            }),
            handler: Arc::new(GetLinksHandler {
                sources: sources.clone(),
            }),
        });

        registry.register(Tool {
            name: "fetch_raw".to_string(),
            description: "Fetch raw records from an NCBI database in an upstream-native format (Entrez eFetch)".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ids": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Record ids to fetch"
                    },
                    "db": {
                        "type": "string",
                        "description": "Database to fetch from",
                        "enum": EntrezDatabase::names()
                    },
                    "retmode": {
                        "type": "string",
                        "description": "Response format",
                        "enum": ["xml", "text", "json"],
                        "default": "xml"
                    },
                    "rettype": {
                        "type": "string",
                        "description": "Record type to retrieve (e.g. 'fasta', 'abstract')"
                    }
                },
                "required": ["ids", "db"]
            }),
            handler: Arc::new(FetchRawHandler {
                sources: sources.clone(),
            }),
        });

        registry.register(Tool {
            name: "fetch_fulltext".to_string(),
            description: "Fetch the plain-text body of an open-access PubMed article via PubMed Central".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pmid": {
                        "type": "string",
                        "description": "PubMed ID of the article"
                    }
                },
                "required": ["pmid"]
            }),
            handler: Arc::new(FetchFulltextHandler {
                sources: sources.clone(),
            }),
        });

        registry.register(Tool {
            name: "list_databases".to_string(),
            description: "List the available databases with their capabilities and pagination bounds".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
            handler: Arc::new(ListDatabasesHandler { sources }),
        });

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// All registered tools
    pub fn all(&self) -> impl Iterator<Item = &Tool> {
        self.tools.values()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
