//! Bounded work-stealing dispatcher.
//!
//! Drains a queue of [`SearchItem`]s with at most `concurrency` workers.
//! Each worker loops: pop the head item, await [`normalize`], append the
//! record, advance progress. Workers are futures joined inside the
//! calling task, so they interleave only at the network call.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::config::MAX_BATCH_ITEMS;
use crate::engine::Extractor;
use crate::error::SearchError;
use crate::types::{CollegeRecord, Progress, SearchItem};

use super::normalize::normalize;
use super::progress::{ProgressCallback, ProgressTracker};

/// Records and final progress of a finished batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// One record per input item, in completion order.
    pub records: Vec<CollegeRecord>,
    /// Progress at the end of the batch.
    pub progress: Progress,
}

/// Extract every item exactly once with at most `concurrency` requests in flight.
///
/// # Pipeline
///
/// 1. Reject batches above [`MAX_BATCH_ITEMS`] or a zero `concurrency`
/// 2. Resolve immediately for an empty batch (progress stays idle)
/// 3. Start `min(concurrency, items.len())` workers over a shared queue
/// 4. Each worker pops, normalizes, appends, and reports progress until
///    the queue is empty
///
/// The output is not ordered relative to the input. Items are never
/// retried here; per-item failures arrive as sentinel records.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an oversized batch or zero
/// concurrency, and [`SearchError::Batch`] if shared state becomes
/// unusable mid-batch. Item-level failures never surface as errors.
pub async fn dispatch<E: Extractor>(
    items: Vec<SearchItem>,
    extractor: &E,
    concurrency: usize,
    on_progress: Option<&ProgressCallback>,
) -> Result<BatchOutcome, SearchError> {
    let total = items.len();
    if total > MAX_BATCH_ITEMS {
        return Err(SearchError::Config(format!(
            "batch of {total} items exceeds the limit of {MAX_BATCH_ITEMS}"
        )));
    }
    if concurrency == 0 {
        return Err(SearchError::Config(
            "concurrency must be greater than 0".into(),
        ));
    }

    let tracker = ProgressTracker::new(total, on_progress);
    if total == 0 {
        return Ok(BatchOutcome {
            records: Vec::new(),
            progress: tracker.snapshot()?,
        });
    }

    let workers = concurrency.min(total);
    tracing::info!(total, workers, extractor = extractor.name(), "batch started");
    tracker.start()?;

    let queue = Mutex::new(VecDeque::from(items));
    let results = Mutex::new(Vec::with_capacity(total));

    let loops = (0..workers).map(|worker| run_worker(worker, &queue, &results, &tracker, extractor));
    for outcome in futures::future::join_all(loops).await {
        outcome?;
    }

    let records = results
        .into_inner()
        .map_err(|_| SearchError::Batch("result lock poisoned".into()))?;
    let progress = tracker.snapshot()?;
    if records.len() != total {
        return Err(SearchError::Batch(format!(
            "expected {total} records, collected {}",
            records.len()
        )));
    }

    let failed = records.iter().filter(|r| r.is_error()).count();
    tracing::info!(total, failed, "batch completed");
    Ok(BatchOutcome { records, progress })
}

/// One worker loop: pop, extract, record, repeat until the queue is empty.
async fn run_worker<E: Extractor>(
    worker: usize,
    queue: &Mutex<VecDeque<SearchItem>>,
    results: &Mutex<Vec<CollegeRecord>>,
    tracker: &ProgressTracker<'_>,
    extractor: &E,
) -> Result<(), SearchError> {
    loop {
        let next = queue
            .lock()
            .map_err(|_| SearchError::Batch("queue lock poisoned".into()))?
            .pop_front();
        let Some(item) = next else {
            break;
        };

        tracker.item_started(&item.name)?;
        let record = normalize(extractor, &item).await;
        let failed = record.is_error();
        results
            .lock()
            .map_err(|_| SearchError::Batch("result lock poisoned".into()))?
            .push(record);
        tracker.item_completed(&item.name, failed)?;
        tracing::debug!(worker, name = %item.name, failed, "item completed");
    }
    Ok(())
}
