//! Error types for the finder-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and for the error note carried by sentinel records. No API keys or
//! other secrets appear in error messages.

/// Errors that can occur while extracting institution records.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to the extraction service failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request timed out before the service replied.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The service rejected the API key.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The service is rate limiting this client.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The service reply could not be parsed into a record.
    #[error("parse error: {0}")]
    Parse(String),

    /// The service replied without any candidate text.
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// Invalid extraction configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The batch itself could not be driven to completion.
    #[error("batch error: {0}")]
    Batch(String),
}

impl SearchError {
    /// Returns `true` for failures that may succeed if the same item is
    /// submitted again later (network trouble, timeouts, rate limits).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout(_) | Self::RateLimited(_)
        )
    }
}

/// Convenience type alias for finder-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
