//! Batch orchestrator: bounded worker pool, total normalizer, progress.
//!
//! This module drains a batch of search items with a fixed number of
//! concurrent workers, turns every extraction failure into a sentinel
//! record, and reports progress through a callback.

pub mod dispatch;
pub mod normalize;
pub mod progress;
