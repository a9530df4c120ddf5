//! Spreadsheet import of search items and export of results.
//!
//! Imports read delimited text (CSV or TSV) or a workbook (the first
//! sheet of an `.xlsx`/`.xls` file). Exports write the fixed 22-column
//! results table as CSV, TSV, or an `.xlsx` workbook, or the records
//! themselves as pretty-printed JSON.

pub mod export;
pub mod import;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FinderError, Result};

pub use export::{EXPORT_HEADERS, export_file_name, write_record, write_records};
pub use import::{MAX_IMPORT_ROWS, import_file, read_items};

/// File formats understood by import and export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// Tab-separated values.
    Tsv,
    /// Excel workbook; `.xls` is accepted on import.
    Xlsx,
    /// Pretty-printed JSON records (export only).
    Json,
}

impl SheetFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }

    /// Field delimiter for the delimited formats.
    pub fn delimiter(&self) -> Option<u8> {
        match self {
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
            Self::Xlsx | Self::Json => None,
        }
    }

    /// Infer the format from a file extension.
    ///
    /// `.txt` is read as CSV.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Import`] for an unknown or missing extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            other => Err(FinderError::Import(format!(
                "unsupported file type {other:?} for {}; use .csv, .tsv, or .xlsx",
                path.display()
            ))),
        }
    }
}

impl fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SheetFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown format {other:?} (expected csv, tsv, xlsx, or json)"
            )),
        }
    }
}
