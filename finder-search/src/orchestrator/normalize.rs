//! Total wrapper around an [`Extractor`] call.
//!
//! [`normalize`] never fails: any extraction error becomes a sentinel
//! [`CollegeRecord`] whose error note names the failure class, so the
//! dispatcher and everything above it never branch on item-level errors.

use crate::engine::Extractor;
use crate::types::{CollegeRecord, SearchItem};

/// Extract `item`, mapping any failure into a sentinel record.
pub async fn normalize<E: Extractor>(extractor: &E, item: &SearchItem) -> CollegeRecord {
    match extractor.extract(item).await {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(
                extractor = extractor.name(),
                name = %item.name,
                transient = err.is_transient(),
                error = %err,
                "extraction failed; recording placeholder"
            );
            CollegeRecord::sentinel(item, err.to_string())
        }
    }
}
