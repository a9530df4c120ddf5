//! Shared HTTP client for extraction requests.

use crate::config::ExtractConfig;
use crate::error::SearchError;
use std::time::Duration;

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("finder-search/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for the extraction service.
///
/// The client has:
/// - Timeout from config
/// - A fixed, versioned User-Agent
/// - gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &ExtractConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Map a transport-level [`reqwest::Error`] to the matching [`SearchError`].
pub fn map_transport_error(err: &reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout(err.to_string())
    } else if err.is_decode() {
        SearchError::Parse(format!("failed to read response body: {err}"))
    } else {
        SearchError::Http(format!("request failed: {err}"))
    }
}
