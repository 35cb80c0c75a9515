//! MCP server implementation using pmcp (Pragmatic AI's rust-mcp-sdk).
//!
//! This module wires the tool registry into a pmcp `Server` for proper
//! JSON-RPC handling over stdio and streamable HTTP.

use async_trait::async_trait;
use pmcp::{
    server::streamable_http_server::StreamableHttpServer, Error, RequestHandlerExtra, Server,
    ServerCapabilities, ToolHandler as PmcpToolHandler, ToolInfo,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::mcp::tools::ToolRegistry;
use crate::sources::{SourceError, SourceRegistry};

/// The MCP server for lifescience-mcp
///
/// Exposes the database tool surface over stdio (for Claude Desktop and
/// other MCP clients) or streamable HTTP.
pub struct McpServer {
    server: Server,
}

impl McpServer {
    /// Create a new MCP server with the given source registry
    pub fn new(sources: Arc<SourceRegistry>) -> Result<Self, pmcp::Error> {
        let tools = ToolRegistry::from_sources(sources);
        Ok(Self {
            server: Self::build_server(tools)?,
        })
    }

    /// Build the pmcp server with tool handlers
    fn build_server(tools: ToolRegistry) -> Result<Server, pmcp::Error> {
        let mut builder = Server::builder()
            .name(env!("CARGO_PKG_NAME"))
            .version(env!("CARGO_PKG_VERSION"))
            .capabilities(ServerCapabilities::default());

        for tool in tools.all() {
            let wrapper = ToolWrapper {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                input_schema: tool.input_schema.clone(),
                handler: tool.handler.clone(),
            };
            builder = builder.tool(wrapper.name.clone(), wrapper);
        }

        builder.build()
    }

    /// Run the server in stdio mode
    pub async fn run(self) -> Result<(), pmcp::Error> {
        tracing::info!("Starting MCP server in stdio mode");
        self.server.run_stdio().await
    }

    /// Run the server in streamable HTTP mode
    pub async fn run_http(self, addr: &str) -> Result<(SocketAddr, JoinHandle<()>), pmcp::Error> {
        tracing::info!("Starting MCP server in HTTP mode on {}", addr);

        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::invalid_params(format!("Invalid address: {}", e)))?;

        let http_server =
            StreamableHttpServer::new(socket_addr, Arc::new(Mutex::new(self.server)));
        http_server.start().await
    }
}

/// Wrapper adapting our ToolHandler to pmcp's ToolHandler
#[derive(Clone)]
struct ToolWrapper {
    name: String,
    description: Option<String>,
    input_schema: Value,
    handler: Arc<dyn crate::mcp::tools::ToolHandler>,
}

#[async_trait]
impl PmcpToolHandler for ToolWrapper {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> Result<Value, Error> {
        self.handler.execute(args).await.map_err(to_protocol_error)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            self.name.clone(),
            self.description.clone(),
            self.input_schema.clone(),
        ))
    }
}

/// Map a source failure to a protocol error, keeping the taxonomy code in
/// the message so callers can distinguish failure classes
fn to_protocol_error(err: SourceError) -> Error {
    let message = format!("{}: {}", err.code(), err);
    match err {
        SourceError::InvalidRequest(_) => Error::invalid_params(message),
        _ => Error::internal(message),
    }
}

/// Create a new MCP server instance
pub fn create_mcp_server(sources: Arc<SourceRegistry>) -> Result<McpServer, pmcp::Error> {
    McpServer::new(sources)
}
