//! College Finder: batch lookup of Indian higher-education institutions.
//!
//! This crate is the front half of the tool. It holds the session (pending
//! items, results, progress), spreadsheet import and export, terminal
//! rendering, and configuration. Extraction itself lives in the
//! `finder-search` workspace crate.
//!
//! # Architecture
//!
//! ```text
//! add / import ──► Session.items ──► finder_search::dispatch ──► Session.results
//!                                     (8 workers, Gemini)         │
//!                                                                 ├─► render (cards | table)
//!                                                                 └─► spreadsheet export
//! ```

pub mod config;
pub mod error;
pub mod render;
pub mod session;
pub mod spreadsheet;
pub mod states;
pub mod view;

pub use config::FinderConfig;
pub use error::{FinderError, Result};
pub use session::{BATCH_FAILURE_MESSAGE, ItemDraft, Session};
pub use spreadsheet::SheetFormat;
pub use states::IndiaState;
pub use view::ViewMode;

pub use finder_search::{
    CachedExtractor, CollegeRecord, ExtractConfig, GeminiExtractor, Progress, ProgressEvent,
    ProgressStatus, SearchItem,
};
