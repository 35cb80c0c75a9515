//! # Lifescience MCP
//!
//! A Model Context Protocol (MCP) server exposing life-science databases
//! (Cellosaurus, PubMed, PubTator3, PubChem, NCBI Entrez) through a uniform
//! tool surface: structured search, accession lookup, and a handful of
//! database-specific operations.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Typed entity schemas and query/result containers
//! - [`sources`]: Database adapters with extensible trait-based architecture
//! - [`mcp`]: MCP protocol implementation and server
//! - [`utils`]: HTTP client, retry, and input validation utilities
//! - [`config`]: Configuration management

pub mod config;
pub mod mcp;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::{Record, SearchQuery, SearchResult};
pub use sources::{Source, SourceError, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
