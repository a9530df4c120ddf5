//! Plain-text rendering of results for the terminal.
//!
//! Cards show every field of one record grouped into sections; the table
//! packs one record per line for side-by-side comparison. Sentinel
//! records are marked `[ERROR]` in both layouts and carry their note.

use finder_search::{CollegeRecord, NOT_AVAILABLE, Progress, ProgressStatus};

use crate::view::ViewMode;

/// Scores strictly above this render as high confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: u8 = 80;

/// Printed on a card when the record carries no citations.
pub const NO_SOURCES_NOTE: &str = "No specific sources cited for this result.";

/// `HIGH (90% accuracy)` or `LOW (40% accuracy)`.
pub fn confidence_badge(score: u8) -> String {
    let level = if score > HIGH_CONFIDENCE_THRESHOLD {
        "HIGH"
    } else {
        "LOW"
    };
    format!("{level} ({score}% accuracy)")
}

/// Website text as a clickable link: `https://` is prepended when the
/// value has no scheme. Placeholder values pass through unchanged.
pub fn website_link(website: &str) -> String {
    let trimmed = website.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        return NOT_AVAILABLE.to_owned();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    }
}

fn field(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("    {label:<24}{value}\n"));
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("  {title}\n"));
}

/// Render one record as a detailed card.
pub fn render_card(record: &CollegeRecord) -> String {
    let mut out = String::new();
    let location = if record.district.is_empty() {
        record.state.clone()
    } else {
        format!("{}, {}", record.district, record.state)
    };

    if let Some(note) = &record.error {
        out.push_str(&format!("[ERROR] {} ({location})\n", record.college_name));
        out.push_str(&format!("  {note}\n"));
        return out;
    }

    out.push_str(&format!(
        "{} ({location})  {}\n",
        record.college_name,
        confidence_badge(record.confidence_score)
    ));

    section(&mut out, "General Information");
    field(&mut out, "University Affiliation", &record.university_affiliation);
    field(&mut out, "College Type", &record.college_type);
    field(&mut out, "AISHE Code", &record.aishe_code);
    field(&mut out, "Established", &record.year_of_establishment);
    field(&mut out, "Accreditation", &record.accreditation_details);
    field(&mut out, "Website", &website_link(&record.official_website));
    field(&mut out, "Address", &record.address);
    field(&mut out, "Pin Code", &record.pin_code);

    section(&mut out, "Administration Contacts");
    out.push_str("    Principal\n");
    field(&mut out, "  Name", &record.principal_name);
    field(&mut out, "  Contact", &record.principal_contact);
    field(&mut out, "  Email", &record.principal_email);
    out.push_str("    Placement Officer (TPO)\n");
    field(&mut out, "  Name", &record.tpo_name);
    field(&mut out, "  Contact", &record.tpo_contact);
    field(&mut out, "  Email", &record.tpo_email);

    section(&mut out, "Academic & Infrastructure");
    let courses = if record.courses_offered.is_empty() {
        NOT_AVAILABLE.to_owned()
    } else {
        record.courses_offered.join(", ")
    };
    field(&mut out, "Courses Offered", &courses);
    field(&mut out, "Student Strength", &record.student_strength);
    field(&mut out, "Faculty Strength", &record.faculty_strength);

    section(&mut out, "Verified Data Sources");
    if record.sources.is_empty() {
        out.push_str(&format!("    {NO_SOURCES_NOTE}\n"));
    } else {
        for (i, source) in record.sources.iter().enumerate() {
            out.push_str(&format!("    {}. {} <{}>\n", i + 1, source.title, source.uri));
        }
    }
    out
}

/// Shorten `value` to at most `width` characters, marking the cut with `~`.
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_owned();
    }
    let kept: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}~")
}

const TABLE_COLUMNS: [(&str, usize); 7] = [
    ("College", 32),
    ("State", 16),
    ("District", 16),
    ("Type", 14),
    ("Principal", 22),
    ("Website", 30),
    ("Score", 5),
];

fn table_line(cells: &[String]) -> String {
    let mut line = String::new();
    for (cell, (_, width)) in cells.iter().zip(TABLE_COLUMNS) {
        line.push_str(&format!("{:<width$}  ", truncate(cell, width)));
    }
    line.trim_end().to_owned()
}

/// Render records as a comparison table, one line each.
pub fn render_table(records: &[&CollegeRecord]) -> String {
    let header: Vec<String> = TABLE_COLUMNS.iter().map(|(h, _)| (*h).to_owned()).collect();
    let rule: usize = TABLE_COLUMNS.iter().map(|(_, w)| w + 2).sum();

    let mut out = table_line(&header);
    out.push('\n');
    out.push_str(&"-".repeat(rule.saturating_sub(2)));
    out.push('\n');
    for record in records {
        let cells = match &record.error {
            Some(note) => vec![
                format!("[ERROR] {}", record.college_name),
                record.state.clone(),
                record.district.clone(),
                note.clone(),
                String::new(),
                String::new(),
                "0".to_owned(),
            ],
            None => vec![
                record.college_name.clone(),
                record.state.clone(),
                record.district.clone(),
                record.college_type.clone(),
                record.principal_name.clone(),
                website_link(&record.official_website),
                format!("{}%", record.confidence_score),
            ],
        };
        out.push_str(&table_line(&cells));
        out.push('\n');
    }
    out
}

/// Render records in the chosen layout.
///
/// An empty slice renders a hint instead of an empty table.
pub fn render_records(records: &[&CollegeRecord], view: ViewMode) -> String {
    if records.is_empty() {
        return "No results to show.\n".to_owned();
    }
    match view {
        ViewMode::Table => render_table(records),
        ViewMode::Cards => records
            .iter()
            .map(|r| render_card(r))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// One-line progress summary, e.g. `processing 1/2 (50%) IIT Delhi`.
pub fn render_progress(progress: &Progress) -> String {
    let mut line = format!(
        "{} {}/{} ({}%)",
        progress.status,
        progress.completed,
        progress.total,
        progress.percent()
    );
    if progress.status == ProgressStatus::Processing {
        if let Some(current) = &progress.current {
            line.push(' ');
            line.push_str(current);
        }
    }
    line
}
