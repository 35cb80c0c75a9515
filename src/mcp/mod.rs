//! MCP protocol implementation and server.

pub mod handlers;
pub mod server;
pub mod tools;

pub use server::McpServer;
pub use tools::{Tool, ToolHandler, ToolRegistry};
