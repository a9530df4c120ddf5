//! Session state: the pending item list, the latest results, and progress.
//!
//! A [`Session`] is owned by its caller and mutated only through the
//! methods here. Input errors leave the item list untouched and are
//! recorded in [`Session::error`] so a front end can display them.

use std::path::{Path, PathBuf};

use finder_search::{
    CollegeRecord, Extractor, MAX_BATCH_ITEMS, Progress, ProgressCallback, SearchItem, dispatch,
};
use serde::{Deserialize, Serialize};

use crate::error::{FinderError, Result};
use crate::spreadsheet::{self, SheetFormat};
use crate::states::IndiaState;
use crate::view::filter_records;

/// Shown when a batch fails as a whole.
pub const BATCH_FAILURE_MESSAGE: &str =
    "Information retrieval failed. Please try again with more specific names.";

/// Largest number of pending items a session holds.
pub const MAX_PENDING_ITEMS: usize = MAX_BATCH_ITEMS;

/// Unvalidated input from the add-item form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub state: String,
    pub district: Option<String>,
}

impl ItemDraft {
    /// Check the draft and turn it into a [`SearchItem`] with a fresh id.
    ///
    /// The state is replaced by its canonical spelling.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Validation`] if the name is blank or the
    /// state is not one of [`IndiaState::all`].
    pub fn into_item(self) -> Result<SearchItem> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FinderError::Validation("college name is required".into()));
        }
        if self.state.trim().is_empty() {
            return Err(FinderError::Validation("state is required".into()));
        }
        let state: IndiaState = self.state.parse().map_err(FinderError::Validation)?;
        Ok(SearchItem::new(
            uuid::Uuid::new_v4().to_string(),
            name,
            state.name(),
            self.district,
        ))
    }
}

/// Everything the front end shows between invocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Items awaiting the next batch.
    pub items: Vec<SearchItem>,
    /// Records of the most recent batch.
    pub results: Vec<CollegeRecord>,
    /// Progress of the most recent batch.
    pub progress: Progress,
    /// Last user-facing error, cleared by the next successful action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Session {
    /// Load a saved session, or start a fresh one if `path` does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Session`] if the file exists but is not a session.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FinderError::Session(format!("{}: {e}", path.display())))
    }

    /// Save the session as JSON, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FinderError::Session(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn fail<T>(&mut self, err: FinderError) -> Result<T> {
        self.error = Some(err.to_string());
        Err(err)
    }

    /// Validate `draft` and append it to the pending list.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Validation`] for a bad draft or a full list.
    pub fn add_item(&mut self, draft: ItemDraft) -> Result<&SearchItem> {
        if self.items.len() >= MAX_PENDING_ITEMS {
            return self.fail(FinderError::Validation(format!(
                "the list already holds {MAX_PENDING_ITEMS} colleges"
            )));
        }
        let item = match draft.into_item() {
            Ok(item) => item,
            Err(e) => return self.fail(e),
        };
        tracing::debug!(id = %item.id, "item added");
        self.error = None;
        self.items.push(item);
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// Position of the item whose id is `key` or uniquely starts with it.
    pub fn find_item(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        if let Some(pos) = self.items.iter().position(|i| i.id == key) {
            return Some(pos);
        }
        let mut matches = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.id.starts_with(key))
            .map(|(pos, _)| pos);
        match (matches.next(), matches.next()) {
            (Some(pos), None) => Some(pos),
            _ => None,
        }
    }

    /// Remove the item matched by [`find_item`](Self::find_item).
    pub fn remove_item(&mut self, key: &str) -> Option<SearchItem> {
        let pos = self.find_item(key)?;
        self.error = None;
        Some(self.items.remove(pos))
    }

    /// Drop every pending item; results are kept.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.error = None;
    }

    /// Forget items, results, progress, and errors.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Append imported items to the pending list.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::TooManyRows`] if the combined list would
    /// exceed [`MAX_PENDING_ITEMS`]; the list is left unchanged.
    pub fn extend_items(&mut self, items: Vec<SearchItem>) -> Result<usize> {
        let combined = self.items.len() + items.len();
        if combined > MAX_PENDING_ITEMS {
            return self.fail(FinderError::TooManyRows {
                rows: combined,
                limit: MAX_PENDING_ITEMS,
            });
        }
        let added = items.len();
        self.items.extend(items);
        self.error = None;
        Ok(added)
    }

    /// Import a `.csv`/`.tsv` file and append its rows.
    ///
    /// # Errors
    ///
    /// Any import error; the item list is left unchanged and the message
    /// is stored in [`Session::error`].
    pub fn import_file(&mut self, path: &Path) -> Result<usize> {
        match spreadsheet::import_file(path) {
            Ok(items) => self.extend_items(items),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "import rejected");
                self.fail(e)
            }
        }
    }

    /// Run the pending items as one batch and store the outcome.
    ///
    /// Previous results are replaced. Per-item failures are stored as
    /// sentinel records. If the batch fails as a whole, results are
    /// emptied, progress is reset, and [`BATCH_FAILURE_MESSAGE`] is stored.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Validation`] if there are no pending items,
    /// or [`FinderError::Search`] if the batch failed as a whole.
    pub async fn run_batch<E: Extractor>(
        &mut self,
        extractor: &E,
        concurrency: usize,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<usize> {
        if self.items.is_empty() {
            return self.fail(FinderError::Validation(
                "add at least one college before searching".into(),
            ));
        }
        self.error = None;
        self.results.clear();

        match dispatch(self.items.clone(), extractor, concurrency, on_progress).await {
            Ok(outcome) => {
                self.results = outcome.records;
                self.progress = outcome.progress;
                Ok(self.results.len())
            }
            Err(e) => {
                tracing::error!(error = %e, "batch failed");
                self.progress = Progress::default();
                self.error = Some(BATCH_FAILURE_MESSAGE.to_owned());
                Err(e.into())
            }
        }
    }

    /// Results matching `query` (see [`filter_records`]).
    pub fn filtered_results(&self, query: &str) -> Vec<&CollegeRecord> {
        filter_records(&self.results, query)
    }

    /// First result whose college name equals `name`, ignoring case.
    pub fn find_result(&self, name: &str) -> Option<&CollegeRecord> {
        let name = name.trim();
        self.results
            .iter()
            .find(|r| r.college_name.eq_ignore_ascii_case(name))
    }

    /// Write the results matching `query` to `college_results.<ext>` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Export`] if nothing matches, or a write error.
    pub fn export_results(&self, dir: &Path, format: SheetFormat, query: &str) -> Result<PathBuf> {
        let records: Vec<CollegeRecord> =
            self.filtered_results(query).into_iter().cloned().collect();
        if records.is_empty() {
            return Err(FinderError::Export("no results to export".into()));
        }
        let path = dir.join(spreadsheet::export_file_name(None, format));
        let file = std::fs::File::create(&path)?;
        spreadsheet::write_records(std::io::BufWriter::new(file), &records, format)?;
        tracing::info!(path = %path.display(), count = records.len(), "results exported");
        Ok(path)
    }

    /// Write the result named `name` to `<Name>_details.<ext>` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Export`] if no result has that name, or a write error.
    pub fn export_record(&self, name: &str, dir: &Path, format: SheetFormat) -> Result<PathBuf> {
        let record = self
            .find_result(name)
            .ok_or_else(|| FinderError::Export(format!("no result named {name:?}")))?;
        let path = dir.join(spreadsheet::export_file_name(Some(record), format));
        let file = std::fs::File::create(&path)?;
        spreadsheet::write_record(std::io::BufWriter::new(file), record, format)?;
        tracing::info!(path = %path.display(), "record exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use finder_search::{ProgressStatus, SearchError};

    fn draft(name: &str, state: &str) -> ItemDraft {
        ItemDraft {
            name: name.into(),
            state: state.into(),
            district: None,
        }
    }

    struct ScoreByName;

    impl Extractor for ScoreByName {
        async fn extract(&self, item: &SearchItem) -> std::result::Result<CollegeRecord, SearchError> {
            if item.name.contains("Fake") {
                return Err(SearchError::Parse("no JSON object in reply".into()));
            }
            let mut record = CollegeRecord::sentinel(item, "");
            record.error = None;
            record.confidence_score = 90;
            Ok(record)
        }

        fn name(&self) -> &str {
            "score-by-name"
        }
    }

    #[test]
    fn add_item_canonicalises_state() {
        let mut session = Session::default();
        let item = session.add_item(draft("  IIT Delhi ", "delhi")).unwrap().clone();
        assert_eq!(item.name, "IIT Delhi");
        assert_eq!(item.state, "Delhi");
        assert_eq!(item.district, None);
        assert_eq!(session.items.len(), 1);
    }

    #[test]
    fn add_item_rejects_bad_drafts() {
        let mut session = Session::default();
        assert!(matches!(
            session.add_item(draft(" ", "Goa")),
            Err(FinderError::Validation(_))
        ));
        assert!(session.add_item(draft("NIT Goa", "")).is_err());
        let err = session.add_item(draft("NIT Goa", "Atlantis")).unwrap_err();
        assert!(err.to_string().contains("Atlantis"));
        assert!(session.items.is_empty());
        assert!(session.error.is_some());
    }

    #[test]
    fn pending_list_is_capped() {
        let mut session = Session::default();
        for i in 0..MAX_PENDING_ITEMS {
            session.add_item(draft(&format!("College {i}"), "Kerala")).unwrap();
        }
        assert!(session.add_item(draft("One More", "Kerala")).is_err());
        assert_eq!(session.items.len(), MAX_PENDING_ITEMS);
    }

    #[test]
    fn remove_by_id_or_prefix() {
        let mut session = Session::default();
        let id = session.add_item(draft("IIT Delhi", "Delhi")).unwrap().id.clone();
        assert!(session.remove_item("no-such-id").is_none());
        let removed = session.remove_item(&id[..8]).unwrap();
        assert_eq!(removed.name, "IIT Delhi");
        assert!(session.items.is_empty());
    }

    #[test]
    fn import_over_capacity_leaves_list_unchanged() {
        let mut session = Session::default();
        session.add_item(draft("IIT Delhi", "Delhi")).unwrap();
        let items: Vec<_> = (0..MAX_PENDING_ITEMS)
            .map(|i| SearchItem::new(i.to_string(), format!("College {i}"), "Goa", None))
            .collect();
        let err = session.extend_items(items).unwrap_err();
        assert!(matches!(err, FinderError::TooManyRows { rows: 501, .. }));
        assert_eq!(session.items.len(), 1);
        assert!(session.error.as_deref().unwrap().contains("501"));
    }

    #[test]
    fn failed_import_sets_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Foo,Bar\n1,2\n").unwrap();
        let mut session = Session::default();
        assert!(session.import_file(&path).is_err());
        assert!(session.items.is_empty());
        assert!(session.error.as_deref().unwrap().contains("College Name"));
    }

    #[tokio::test]
    async fn run_batch_stores_records_and_progress() {
        let mut session = Session::default();
        session.add_item(draft("IIT Delhi", "Delhi")).unwrap();
        session.add_item(draft("XYZ Fake College", "Goa")).unwrap();

        let count = session.run_batch(&ScoreByName, 8, None).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(session.progress.total, 2);
        assert_eq!(session.progress.completed, 2);
        assert_eq!(session.progress.status, ProgressStatus::Completed);

        let delhi = session.find_result("iit delhi").unwrap();
        assert_eq!(delhi.confidence_score, 90);
        let fake = session.find_result("XYZ Fake College").unwrap();
        assert!(fake.is_error());
        assert_eq!(fake.confidence_score, 0);
        assert!(session.error.is_none());
    }

    #[tokio::test]
    async fn run_batch_failure_empties_results() {
        let mut session = Session::default();
        session.add_item(draft("IIT Delhi", "Delhi")).unwrap();
        session.run_batch(&ScoreByName, 8, None).await.unwrap();

        let err = session.run_batch(&ScoreByName, 0, None).await.unwrap_err();
        assert!(matches!(err, FinderError::Search(SearchError::Config(_))));
        assert!(session.results.is_empty());
        assert_eq!(session.progress, Progress::default());
        assert_eq!(session.error.as_deref(), Some(BATCH_FAILURE_MESSAGE));
        assert_eq!(session.items.len(), 1);
    }

    #[tokio::test]
    async fn run_batch_requires_items() {
        let mut session = Session::default();
        let err = session.run_batch(&ScoreByName, 8, None).await.unwrap_err();
        assert!(matches!(err, FinderError::Validation(_)));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");
        let mut session = Session::default();
        session.add_item(draft("NIT Calicut", "Kerala")).unwrap();
        session.save(&path).unwrap();

        assert_eq!(Session::load(&path).unwrap(), session);
        assert_eq!(
            Session::load(&dir.path().join("absent.json")).unwrap(),
            Session::default()
        );
    }

    #[test]
    fn corrupt_session_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Session::load(&path), Err(FinderError::Session(_))));
    }

    #[test]
    fn export_without_results_fails() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::default();
        assert!(matches!(
            session.export_results(dir.path(), SheetFormat::Csv, ""),
            Err(FinderError::Export(_))
        ));
    }
}
