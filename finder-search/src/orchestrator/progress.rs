//! Progress events and the shared tracker workers update.
//!
//! Provides callback-based progress reporting that decouples the batch
//! loop from presentation (CLI progress bar, session snapshot, tests).

use std::sync::Mutex;

use crate::error::SearchError;
use crate::types::{Progress, ProgressStatus};

/// Progress events emitted while a batch drains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Workers are about to start on a non-empty batch.
    BatchStarted {
        /// Number of items in the batch.
        total: usize,
    },

    /// A worker picked up an item.
    ItemStarted {
        /// Institution name of the item.
        label: String,
    },

    /// A worker finished an item (successfully or with a sentinel).
    ItemCompleted {
        /// Institution name of the item.
        label: String,
        /// Items completed so far, including this one.
        completed: usize,
        /// Number of items in the batch.
        total: usize,
        /// Whether the record is a sentinel.
        failed: bool,
    },

    /// Every item has produced a record.
    BatchCompleted {
        /// Number of items in the batch.
        total: usize,
        /// How many of them are sentinel records.
        failed: usize,
    },
}

/// Callback type for receiving progress events.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

struct TrackerState {
    progress: Progress,
    failed: usize,
}

/// Shared progress state for one batch.
///
/// All mutation happens under a short-lived lock that is never held
/// across an `.await`; callbacks fire after the lock is released.
pub struct ProgressTracker<'a> {
    state: Mutex<TrackerState>,
    callback: Option<&'a ProgressCallback>,
}

impl<'a> ProgressTracker<'a> {
    /// Create an idle tracker for a batch of `total` items.
    pub fn new(total: usize, callback: Option<&'a ProgressCallback>) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                progress: Progress {
                    total,
                    ..Progress::default()
                },
                failed: 0,
            }),
            callback,
        }
    }

    /// Move to `Processing` and announce the batch.
    pub fn start(&self) -> Result<(), SearchError> {
        let total = {
            let mut state = self.lock()?;
            state.progress.status = ProgressStatus::Processing;
            state.progress.total
        };
        self.emit(ProgressEvent::BatchStarted { total });
        Ok(())
    }

    /// Record that a worker picked up `label`.
    pub fn item_started(&self, label: &str) -> Result<(), SearchError> {
        self.lock()?.progress.current = Some(label.to_owned());
        self.emit(ProgressEvent::ItemStarted {
            label: label.to_owned(),
        });
        Ok(())
    }

    /// Record that a worker finished `label`.
    ///
    /// The completed counter only moves forward; the transition to
    /// `Completed` happens exactly once, on the final item.
    pub fn item_completed(&self, label: &str, failed: bool) -> Result<(), SearchError> {
        let (completed, total, finished, failed_total) = {
            let mut state = self.lock()?;
            if state.progress.status == ProgressStatus::Completed {
                return Err(SearchError::Batch(format!(
                    "item {label:?} completed after the batch finished"
                )));
            }
            state.progress.completed += 1;
            state.progress.current = Some(label.to_owned());
            if failed {
                state.failed += 1;
            }
            let finished = state.progress.completed == state.progress.total;
            if finished {
                state.progress.status = ProgressStatus::Completed;
            }
            (
                state.progress.completed,
                state.progress.total,
                finished,
                state.failed,
            )
        };

        self.emit(ProgressEvent::ItemCompleted {
            label: label.to_owned(),
            completed,
            total,
            failed,
        });
        if finished {
            self.emit(ProgressEvent::BatchCompleted {
                total,
                failed: failed_total,
            });
        }
        Ok(())
    }

    /// Current progress snapshot.
    pub fn snapshot(&self) -> Result<Progress, SearchError> {
        Ok(self.lock()?.progress.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, TrackerState>, SearchError> {
        self.state
            .lock()
            .map_err(|_| SearchError::Batch("progress lock poisoned".into()))
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(cb) = self.callback {
            cb(event);
        }
    }
}
