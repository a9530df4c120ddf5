//! # finder-search
//!
//! Structured institution lookups over a generative-AI search service.
//!
//! Each search item (institution name, state, optional district) becomes a
//! prompt with a declared JSON response schema. Replies are parsed strictly
//! with per-field defaulting into a [`CollegeRecord`].
//!
//! ## Design
//!
//! - A bounded worker pool drains up to 500 items with 8 requests in flight
//! - Every failure becomes a zero-confidence sentinel record, never an error
//! - Successful records are cached in memory with a configurable TTL
//! - Progress is reported through a callback
//!
//! ## Security
//!
//! - The API key is sent as a header and never logged or printed by `Debug`
//! - Query text is logged only at trace level

pub mod cache;
pub mod config;
pub mod contract;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod types;

pub use cache::CachedExtractor;
pub use config::{ExtractConfig, DEFAULT_CONCURRENCY, MAX_BATCH_ITEMS};
pub use engine::Extractor;
pub use engines::GeminiExtractor;
pub use error::{Result, SearchError};
pub use orchestrator::dispatch::{dispatch, BatchOutcome};
pub use orchestrator::normalize::normalize;
pub use orchestrator::progress::{ProgressCallback, ProgressEvent};
pub use types::{Citation, CollegeRecord, Progress, ProgressStatus, SearchItem, NOT_AVAILABLE};

/// Extract a batch of items with the Gemini backend.
///
/// Builds a [`GeminiExtractor`] for `config`, wraps it in a
/// [`CachedExtractor`], and drains `items` with `config.concurrency`
/// workers.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` or `api_key` is invalid or
/// the batch is too large. Individual item failures are returned as
/// sentinel records inside the outcome.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> finder_search::Result<()> {
/// use finder_search::{ExtractConfig, SearchItem};
///
/// let items = vec![SearchItem::new("1", "IIT Delhi", "Delhi", None)];
/// let outcome =
///     finder_search::extract_batch(items, "api-key", &ExtractConfig::default(), None).await?;
/// for record in &outcome.records {
///     println!("{}: {}%", record.college_name, record.confidence_score);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_batch(
    items: Vec<SearchItem>,
    api_key: &str,
    config: &ExtractConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<BatchOutcome> {
    config.validate()?;
    let extractor = CachedExtractor::new(
        GeminiExtractor::new(api_key, config)?,
        config.cache_ttl_seconds,
    );
    dispatch(items, &extractor, config.concurrency, on_progress).await
}
