//! Result export as CSV, TSV, an `.xlsx` workbook, or JSON.

use std::io::Write;

use finder_search::{CollegeRecord, NOT_AVAILABLE};
use rust_xlsxwriter::{Format, Workbook};

use super::SheetFormat;
use crate::error::{FinderError, Result};

/// Column headers of the exported results table, in order.
pub const EXPORT_HEADERS: [&str; 22] = [
    "College Name",
    "State",
    "District",
    "University Affiliation",
    "College Type",
    "Courses Offered",
    "Principal Name",
    "Principal Contact",
    "Principal Email",
    "TPO Name",
    "TPO Contact",
    "TPO Email",
    "Official Website",
    "AISHE Code",
    "Year of Establishment",
    "Accreditation Details",
    "Student Strength",
    "Faculty Strength",
    "Address",
    "Pin Code",
    "Confidence Score",
    "Sources",
];

fn record_row(record: &CollegeRecord) -> [String; 22] {
    let courses = if record.courses_offered.is_empty() {
        NOT_AVAILABLE.to_owned()
    } else {
        record.courses_offered.join(", ")
    };
    let sources = record
        .sources
        .iter()
        .map(|c| format!("{} <{}>", c.title, c.uri))
        .collect::<Vec<_>>()
        .join("; ");
    [
        record.college_name.clone(),
        record.state.clone(),
        record.district.clone(),
        record.university_affiliation.clone(),
        record.college_type.clone(),
        courses,
        record.principal_name.clone(),
        record.principal_contact.clone(),
        record.principal_email.clone(),
        record.tpo_name.clone(),
        record.tpo_contact.clone(),
        record.tpo_email.clone(),
        record.official_website.clone(),
        record.aishe_code.clone(),
        record.year_of_establishment.clone(),
        record.accreditation_details.clone(),
        record.student_strength.clone(),
        record.faculty_strength.clone(),
        record.address.clone(),
        record.pin_code.clone(),
        record.confidence_score.to_string(),
        sources,
    ]
}

fn export_err(e: impl std::fmt::Display) -> FinderError {
    FinderError::Export(e.to_string())
}

fn write_table<W: Write>(writer: W, records: &[CollegeRecord], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    wtr.write_record(EXPORT_HEADERS).map_err(export_err)?;
    for record in records {
        wtr.write_record(record_row(record)).map_err(export_err)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Name of the single sheet in exported workbooks.
const SHEET_NAME: &str = "College Results";

/// Index of the `Confidence Score` column, written as a number in workbooks.
const SCORE_COLUMN: usize = 20;

fn write_workbook<W: Write>(mut writer: W, records: &[CollegeRecord]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(export_err)?;

    for (col, title) in (0u16..).zip(EXPORT_HEADERS) {
        sheet
            .write_string_with_format(0, col, title, &header)
            .map_err(export_err)?;
    }
    for (row, record) in (1u32..).zip(records) {
        for (col, value) in (0u16..).zip(record_row(record)) {
            if usize::from(col) == SCORE_COLUMN {
                sheet
                    .write_number(row, col, f64::from(record.confidence_score))
                    .map_err(export_err)?;
            } else {
                sheet.write_string(row, col, value).map_err(export_err)?;
            }
        }
    }
    sheet.set_freeze_panes(1, 0).map_err(export_err)?;

    let bytes = workbook.save_to_buffer().map_err(export_err)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

fn write_json<W: Write, T: serde::Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value).map_err(export_err)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `records` as a results table (delimited text or a workbook), or
/// as a JSON array.
///
/// # Errors
///
/// Returns [`FinderError::Export`] if serialization fails, or an I/O error.
pub fn write_records<W: Write>(
    writer: W,
    records: &[CollegeRecord],
    format: SheetFormat,
) -> Result<()> {
    match format {
        SheetFormat::Csv => write_table(writer, records, b','),
        SheetFormat::Tsv => write_table(writer, records, b'\t'),
        SheetFormat::Xlsx => write_workbook(writer, records),
        SheetFormat::Json => write_json(writer, records),
    }
}

/// Write one record: a one-row table, or a single JSON object.
///
/// # Errors
///
/// Same as [`write_records`].
pub fn write_record<W: Write>(
    writer: W,
    record: &CollegeRecord,
    format: SheetFormat,
) -> Result<()> {
    match format {
        SheetFormat::Json => write_json(writer, record),
        _ => write_records(writer, std::slice::from_ref(record), format),
    }
}

/// Download name: `<College_Name>_details.<ext>` for one record,
/// `college_results.<ext>` for a whole batch.
pub fn export_file_name(record: Option<&CollegeRecord>, format: SheetFormat) -> String {
    let ext = format.extension();
    match record {
        Some(record) => {
            let stem = record
                .college_name
                .split(|c: char| c.is_whitespace() || matches!(c, '/' | '\\' | ':'))
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("_");
            let stem = if stem.is_empty() { "college" } else { &stem };
            format!("{stem}_details.{ext}")
        }
        None => format!("college_results.{ext}"),
    }
}
