//! Configuration management.
//!
//! Settings come from an optional TOML file plus `LIFESCIENCE_MCP_*`
//! environment variable overrides:
//!
//! ```toml
//! [http]
//! timeout_secs = 30
//!
//! [ncbi]
//! api_key = "your-ncbi-api-key"
//! email = "you@example.org"
//!
//! [rate_limits]
//! pubchem_requests_per_second = 5
//!
//! [server]
//! http_addr = "127.0.0.1:8090"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// NCBI E-utilities credentials (PubMed, PubTator3, Entrez)
    #[serde(default)]
    pub ncbi: NcbiConfig,

    /// Per-upstream request pacing
    #[serde(default)]
    pub rate_limits: RateLimitConfig,

    /// Server transport settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from an optional TOML file, then apply
    /// `LIFESCIENCE_MCP_*` environment overrides
    /// (e.g. `LIFESCIENCE_MCP_NCBI__API_KEY`)
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder
            .add_source(
                config::Environment::with_prefix("LIFESCIENCE_MCP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// NCBI E-utilities credentials
///
/// NCBI asks every client to identify itself with a `tool` name and, ideally,
/// a contact email. An API key raises the request quota from 3 to 10 per
/// second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NcbiConfig {
    /// NCBI API key (optional, for higher rate limits)
    #[serde(default = "default_ncbi_api_key")]
    pub api_key: Option<String>,

    /// Contact email passed to NCBI
    #[serde(default = "default_ncbi_email")]
    pub email: Option<String>,

    /// Tool name passed to NCBI
    #[serde(default = "default_ncbi_tool")]
    pub tool: String,
}

impl Default for NcbiConfig {
    fn default() -> Self {
        Self {
            api_key: default_ncbi_api_key(),
            email: default_ncbi_email(),
            tool: default_ncbi_tool(),
        }
    }
}

fn default_ncbi_api_key() -> Option<String> {
    std::env::var("NCBI_API_KEY").ok()
}

fn default_ncbi_email() -> Option<String> {
    std::env::var("NCBI_EMAIL").ok()
}

fn default_ncbi_tool() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

/// Per-upstream request pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second against NCBI hosts; defaults to 3, or 10 when an
    /// API key is configured
    #[serde(default)]
    pub ncbi_requests_per_second: Option<u32>,

    /// Requests per second against PubChem PUG REST (their cap is 5)
    #[serde(default = "default_pubchem_rps")]
    pub pubchem_requests_per_second: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            ncbi_requests_per_second: None,
            pubchem_requests_per_second: default_pubchem_rps(),
        }
    }
}

fn default_pubchem_rps() -> u32 {
    5
}

impl Config {
    /// Effective NCBI pacing: explicit setting, otherwise keyed by whether an
    /// API key is present
    pub fn ncbi_requests_per_second(&self) -> u32 {
        self.rate_limits
            .ncbi_requests_per_second
            .unwrap_or(if self.ncbi.api_key.is_some() { 10 } else { 3 })
    }
}

/// Server transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the streamable HTTP transport
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> String {
    "127.0.0.1:8090".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.rate_limits.pubchem_requests_per_second, 5);
        assert_eq!(config.server.http_addr, "127.0.0.1:8090");
        assert_eq!(config.ncbi.tool, "lifescience-mcp");
    }

    #[test]
    fn test_ncbi_rps_follows_api_key() {
        let mut config = Config::default();
        config.ncbi.api_key = None;
        config.rate_limits.ncbi_requests_per_second = None;
        assert_eq!(config.ncbi_requests_per_second(), 3);

        config.ncbi.api_key = Some("key".to_string());
        assert_eq!(config.ncbi_requests_per_second(), 10);

        config.rate_limits.ncbi_requests_per_second = Some(2);
        assert_eq!(config.ncbi_requests_per_second(), 2);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
            [http]
            timeout_secs = 10

            [ncbi]
            api_key = "abc"
            email = "dev@example.org"

            [rate_limits]
            pubchem_requests_per_second = 2
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.ncbi.api_key.as_deref(), Some("abc"));
        assert_eq!(config.rate_limits.pubchem_requests_per_second, 2);
    }
}
