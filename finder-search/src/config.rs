//! Extraction configuration with sensible defaults.
//!
//! [`ExtractConfig`] controls which model is asked, where it lives,
//! timeouts, web-search grounding, batch concurrency, and caching.

use crate::error::SearchError;

/// Default number of concurrent workers in a batch.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Largest batch the dispatcher accepts.
pub const MAX_BATCH_ITEMS: usize = 500;

/// Default Gemini endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Configuration for a batch extraction.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Model name placed in the `models/{model}:generateContent` path.
    pub model: String,
    /// Scheme and host of the API, without a trailing slash.
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Whether to ask the service to ground answers with web search.
    pub web_search: bool,
    /// Maximum number of requests in flight at once.
    pub concurrency: usize,
    /// How long to cache successful records in seconds. 0 disables caching.
    pub cache_ttl_seconds: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_seconds: 60,
            web_search: true,
            concurrency: DEFAULT_CONCURRENCY,
            cache_ttl_seconds: 600,
        }
    }
}

impl ExtractConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `model` must not be blank
    /// - `base_url` must be an absolute http(s) URL
    /// - `timeout_seconds` must be greater than 0
    /// - `concurrency` must be between 1 and [`MAX_BATCH_ITEMS`]
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.model.trim().is_empty() {
            return Err(SearchError::Config("model must not be empty".into()));
        }
        match url::Url::parse(&self.base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return Err(SearchError::Config(format!(
                    "base_url must be an http(s) URL, got {:?}",
                    self.base_url
                )));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 || self.concurrency > MAX_BATCH_ITEMS {
            return Err(SearchError::Config(format!(
                "concurrency must be between 1 and {MAX_BATCH_ITEMS}"
            )));
        }
        Ok(())
    }

    /// Full URL of the `generateContent` endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}
