//! Error types for the college finder.

use finder_search::SearchError;

/// Top-level error type for session, spreadsheet, and config operations.
#[derive(Debug, thiserror::Error)]
pub enum FinderError {
    /// A search item failed form validation.
    #[error("invalid search item: {0}")]
    Validation(String),

    /// An upload held more rows than one batch may contain.
    #[error("file has {rows} rows; at most {limit} colleges can be imported at once")]
    TooManyRows {
        /// Data rows parsed from the file.
        rows: usize,
        /// Largest accepted row count.
        limit: usize,
    },

    /// No row of an upload had both required columns filled.
    #[error("no valid rows: the file needs 'College Name' (or 'Name') and 'State' columns")]
    MissingColumns,

    /// An upload could not be read as a spreadsheet.
    #[error("import error: {0}")]
    Import(String),

    /// Results could not be written.
    #[error("export error: {0}")]
    Export(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Session state could not be loaded or saved.
    #[error("session error: {0}")]
    Session(String),

    /// Extraction engine error.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, FinderError>;
