//! HTTP client utilities.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::sources::SourceError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client with sensible defaults and optional request pacing.
///
/// Pacing matters for the NCBI E-utilities family, which allows 3 requests
/// per second without an API key and 10 with one.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings and no pacing
    pub fn new() -> Result<Self, SourceError> {
        Self::with_settings(DEFAULT_TIMEOUT, None)
    }

    /// Create a new HTTP client with a custom timeout and an optional
    /// requests-per-second cap
    pub fn with_settings(
        timeout: Duration,
        requests_per_second: Option<u32>,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let limiter = requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Ok(Self { client, limiter })
    }

    /// Issue a GET request, waiting for a rate-limit slot first when pacing
    /// is configured
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
        self.client.get(url).send().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_without_pacing() {
        let client = HttpClient::new().unwrap();
        assert!(client.limiter.is_none());
    }

    #[test]
    fn test_client_builds_with_pacing() {
        let client = HttpClient::with_settings(Duration::from_secs(5), Some(3)).unwrap();
        assert!(client.limiter.is_some());
    }

    #[test]
    fn test_zero_rps_disables_pacing() {
        let client = HttpClient::with_settings(Duration::from_secs(5), Some(0)).unwrap();
        assert!(client.limiter.is_none());
    }
}
