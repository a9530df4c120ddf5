//! Core types for search items, extracted records, and batch progress.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used for every string field the service could not fill.
pub const NOT_AVAILABLE: &str = "Not Available";

/// One institution query awaiting extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    /// Opaque identifier, unique within one session.
    pub id: String,
    /// Institution name as entered by the user.
    pub name: String,
    /// State or union territory.
    pub state: String,
    /// District, if the user supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

impl SearchItem {
    /// Create an item, treating a blank district as absent.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        state: impl Into<String>,
        district: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: state.into(),
            district: district
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
        }
    }

    /// District text, or the empty string when absent.
    pub fn district_or_empty(&self) -> &str {
        self.district.as_deref().unwrap_or("")
    }
}

/// A web source the service reports having used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Page title (`"Source"` when the service gave none).
    pub title: String,
    /// Absolute http(s) URI of the source.
    pub uri: String,
}

/// The normalized result of extracting one [`SearchItem`].
///
/// Field names serialize in camelCase, matching the JSON object the
/// extraction service is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeRecord {
    pub college_name: String,
    pub state: String,
    pub district: String,
    pub university_affiliation: String,
    pub college_type: String,
    #[serde(default)]
    pub courses_offered: Vec<String>,
    pub principal_name: String,
    pub principal_contact: String,
    pub principal_email: String,
    pub tpo_name: String,
    pub tpo_contact: String,
    pub tpo_email: String,
    pub official_website: String,
    pub aishe_code: String,
    pub year_of_establishment: String,
    pub accreditation_details: String,
    pub student_strength: String,
    pub faculty_strength: String,
    pub address: String,
    pub pin_code: String,
    /// Self-assessed certainty of the service, 0..=100. Always 0 on error.
    pub confidence_score: u8,
    #[serde(default)]
    pub sources: Vec<Citation>,
    /// Failure description, present only on sentinel records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollegeRecord {
    /// Build the placeholder record returned when extraction fails.
    ///
    /// Carries the item's own name/state/district, a zero confidence
    /// score, no citations, and `error_note` describing the failure.
    pub fn sentinel(item: &SearchItem, error_note: impl Into<String>) -> Self {
        let na = || NOT_AVAILABLE.to_owned();
        Self {
            college_name: item.name.clone(),
            state: item.state.clone(),
            district: item.district_or_empty().to_owned(),
            university_affiliation: na(),
            college_type: na(),
            courses_offered: Vec::new(),
            principal_name: na(),
            principal_contact: na(),
            principal_email: na(),
            tpo_name: na(),
            tpo_contact: na(),
            tpo_email: na(),
            official_website: na(),
            aishe_code: na(),
            year_of_establishment: na(),
            accreditation_details: na(),
            student_strength: na(),
            faculty_strength: na(),
            address: na(),
            pin_code: na(),
            confidence_score: 0,
            sources: Vec::new(),
            error: Some(error_note.into()),
        }
    }

    /// Returns `true` if this is a sentinel record for a failed extraction.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Lifecycle of a batch as seen by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// No batch has run, or the batch was empty.
    #[default]
    Idle,
    /// Workers are draining the queue.
    Processing,
    /// Every item has produced a record.
    Completed,
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Completed => "completed",
        })
    }
}

/// Snapshot of batch progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Number of items in the batch.
    pub total: usize,
    /// Number of items that have produced a record.
    pub completed: usize,
    /// Name of the item most recently picked up or finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    pub status: ProgressStatus,
}

impl Progress {
    /// Completion percentage, `completed / total`, rounded down.
    ///
    /// An empty batch reports 0.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = self.completed.min(self.total) * 100 / self.total;
        u8::try_from(pct).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(district: Option<&str>) -> SearchItem {
        SearchItem::new("a1", "IIT Delhi", "Delhi", district.map(str::to_owned))
    }

    #[test]
    fn blank_district_is_absent() {
        assert_eq!(item(Some("   ")).district, None);
        assert_eq!(item(None).district_or_empty(), "");
        assert_eq!(item(Some(" South ")).district.as_deref(), Some("South"));
    }

    #[test]
    fn sentinel_carries_item_identity() {
        let record = CollegeRecord::sentinel(&item(Some("South")), "HTTP error: refused");
        assert_eq!(record.college_name, "IIT Delhi");
        assert_eq!(record.state, "Delhi");
        assert_eq!(record.district, "South");
        assert_eq!(record.confidence_score, 0);
        assert!(record.sources.is_empty());
        assert!(record.courses_offered.is_empty());
        assert_eq!(record.principal_name, NOT_AVAILABLE);
        assert_eq!(record.pin_code, NOT_AVAILABLE);
        assert!(record.is_error());
        assert_eq!(record.error.as_deref(), Some("HTTP error: refused"));
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = CollegeRecord::sentinel(&item(None), "boom");
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["collegeName"], "IIT Delhi");
        assert_eq!(json["confidenceScore"], 0);
        assert_eq!(json["tpoEmail"], NOT_AVAILABLE);
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn successful_record_omits_error_key() {
        let mut record = CollegeRecord::sentinel(&item(None), "boom");
        record.error = None;
        let json = serde_json::to_value(&record).expect("serialize");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn progress_percent() {
        let mut progress = Progress {
            total: 4,
            completed: 1,
            current: None,
            status: ProgressStatus::Processing,
        };
        assert_eq!(progress.percent(), 25);
        progress.completed = 4;
        assert_eq!(progress.percent(), 100);
        assert_eq!(Progress::default().percent(), 0);
    }

    #[test]
    fn progress_status_display() {
        assert_eq!(ProgressStatus::Idle.to_string(), "idle");
        assert_eq!(ProgressStatus::Processing.to_string(), "processing");
        assert_eq!(ProgressStatus::Completed.to_string(), "completed");
    }
}
