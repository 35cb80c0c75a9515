use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lifescience_mcp::config::Config;
use lifescience_mcp::mcp::McpServer;
use lifescience_mcp::models::SearchQuery;
use lifescience_mcp::sources::{Source, SourceRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Lifescience MCP - query life-science databases over the Model Context Protocol
#[derive(Parser, Debug)]
#[command(name = "lifescience-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server for Cellosaurus, PubMed, PubTator3, PubChem, and NCBI Entrez", long_about = None)]
struct Cli {
    /// Enable verbose logging (-v, -vv for more)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server (default; stdio transport unless --http)
    Serve {
        /// Serve over streamable HTTP instead of stdio
        #[arg(long)]
        http: bool,

        /// Bind address for HTTP mode (overrides config)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Run a one-off search and print the result as JSON
    Search {
        /// Query in the database's own grammar
        query: String,

        /// Database to search
        #[arg(long, short)]
        database: String,

        /// Maximum number of records
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Record offset
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Comma-separated field selection
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
    },

    /// Fetch a single record by accession and print it as JSON
    Get {
        /// Accession or identifier
        id: String,

        /// Database to look up
        #[arg(long, short)]
        database: String,
    },

    /// List the available databases
    Sources,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the stdio transport; logs must stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let sources = Arc::new(SourceRegistry::new(&config)?);

    match cli.command.unwrap_or(Commands::Serve {
        http: false,
        addr: None,
    }) {
        Commands::Serve { http, addr } => {
            let server = McpServer::new(sources)?;
            if http {
                let addr = addr.unwrap_or_else(|| config.server.http_addr.clone());
                let (bound, handle) = server.run_http(&addr).await?;
                tracing::info!("MCP server listening on {}", bound);
                handle.await?;
            } else {
                server.run().await?;
            }
        }

        Commands::Search {
            query,
            database,
            limit,
            offset,
            fields,
        } => {
            let source = sources.get_required(&database)?;
            let mut search_query = SearchQuery::new(query).limit(limit).offset(offset);
            search_query.fields = fields;

            let result = source.search(&search_query).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Get { id, database } => {
            let source = sources.get_required(&database)?;
            let record = source.get_by_id(&id, None).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Sources => {
            let mut ids: Vec<&str> = sources.ids().collect();
            ids.sort_unstable();
            for id in ids {
                if let Some(source) = sources.get(id) {
                    println!(
                        "{:<12} {:<14} [{}]",
                        id,
                        source.name(),
                        source.capabilities().names().join(", ")
                    );
                }
            }
        }
    }

    Ok(())
}
