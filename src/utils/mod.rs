//! Utility modules supporting the database adapters.
//!
//! - [`HttpClient`]: HTTP client with built-in request pacing
//! - [`with_retry`]: Execute an operation with automatic retry on transient errors
//! - [`RetryConfig`]: Configuration for retry logic with exponential backoff
//! - `validate_*`: Identifier and date format validation

mod http;
mod retry;
mod validate;

pub use http::HttpClient;
pub use retry::{api_retry_config, with_retry, RetryConfig, TransientError};
pub use validate::{
    validate_cell_line_accession, validate_cid, validate_date, validate_pmid,
};
