//! Results view selection and the client-side filter.

use std::fmt;
use std::str::FromStr;

use finder_search::CollegeRecord;
use serde::{Deserialize, Serialize};

/// How the results view lays out records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One detailed card per record.
    #[default]
    Cards,
    /// One dense row per record.
    Table,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cards => "cards",
            Self::Table => "table",
        })
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cards" | "card" | "grid" => Ok(Self::Cards),
            "table" | "compare" | "list" => Ok(Self::Table),
            other => Err(format!("unknown view {other:?} (expected cards or table)")),
        }
    }
}

/// Records whose name, state, or district contains `query`, ignoring case.
///
/// A blank query matches everything. Input order is preserved, so
/// filtering an already filtered list with the same query changes nothing.
pub fn filter_records<'a>(records: &'a [CollegeRecord], query: &str) -> Vec<&'a CollegeRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| {
            [&record.college_name, &record.state, &record.district]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
