//! Trait definition for pluggable extraction backends.
//!
//! The Gemini backend and the caching wrapper both implement
//! [`Extractor`]; tests substitute stubs to drive the dispatcher without
//! network access.

use crate::error::SearchError;
use crate::types::{CollegeRecord, SearchItem};

/// A backend that turns one [`SearchItem`] into a [`CollegeRecord`].
///
/// Implementations may fail; the normalizer turns any failure into a
/// sentinel record so the dispatcher never sees an error.
///
/// All implementations must be `Send + Sync` so workers can share one
/// instance across a batch.
pub trait Extractor: Send + Sync {
    /// Extract the structured record for `item`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, the service rejects
    /// it, or the reply cannot be parsed.
    fn extract(
        &self,
        item: &SearchItem,
    ) -> impl std::future::Future<Output = Result<CollegeRecord, SearchError>> + Send;

    /// Short backend name used in logs.
    fn name(&self) -> &str;
}
