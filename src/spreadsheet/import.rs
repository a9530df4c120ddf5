//! Search-item import from delimited text and workbooks.
//!
//! Header names are matched case-insensitively: `College Name` (or
//! `Name`) and `State` are required, `District` is optional. Rows missing
//! a required value are skipped. Workbooks are read from their first sheet.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{Data, Range, Reader};
use finder_search::{MAX_BATCH_ITEMS, SearchItem};

use super::SheetFormat;
use crate::error::{FinderError, Result};

/// Largest number of data rows one upload may contain.
pub const MAX_IMPORT_ROWS: usize = MAX_BATCH_ITEMS;

/// Column positions located in the header row.
#[derive(Debug, Default)]
struct Columns {
    name: Option<usize>,
    state: Option<usize>,
    district: Option<usize>,
}

impl Columns {
    fn locate(headers: &[String]) -> Self {
        let normalised: Vec<String> = headers.iter().map(|h| normalise_header(h)).collect();
        let find = |wanted: &str| normalised.iter().position(|h| h == wanted);
        Self {
            name: find("college name").or_else(|| find("name")),
            state: find("state"),
            district: find("district"),
        }
    }
}

fn normalise_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn cell(row: &[String], index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| row.get(i))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Turn a header row and data rows into search items.
///
/// Blank rows are ignored and do not count toward the row limit.
fn collect_items<I>(headers: &[String], rows: I) -> Result<Vec<SearchItem>>
where
    I: IntoIterator<Item = Result<Vec<String>>>,
{
    let columns = Columns::locate(headers);
    tracing::debug!(?columns, "located import columns");

    let mut count = 0usize;
    let mut items = Vec::new();
    for row in rows {
        let row = row?;
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        count += 1;
        if count > MAX_IMPORT_ROWS {
            continue;
        }
        let (Some(name), Some(state)) = (cell(&row, columns.name), cell(&row, columns.state))
        else {
            continue;
        };
        items.push(SearchItem::new(
            uuid::Uuid::new_v4().to_string(),
            name,
            state,
            cell(&row, columns.district),
        ));
    }

    if count > MAX_IMPORT_ROWS {
        return Err(FinderError::TooManyRows {
            rows: count,
            limit: MAX_IMPORT_ROWS,
        });
    }
    if items.is_empty() {
        return Err(FinderError::MissingColumns);
    }
    tracing::info!(rows = count, accepted = items.len(), "imported search items");
    Ok(items)
}

fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Vec<SearchItem>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| FinderError::Import(format!("unreadable header row: {e}")))?
        .iter()
        .map(str::to_owned)
        .collect();
    let rows = rdr.records().map(|record| {
        record
            .map(|r| r.iter().map(str::to_owned).collect::<Vec<String>>())
            .map_err(|e| FinderError::Import(format!("unreadable row: {e}")))
    });
    collect_items(&headers, rows)
}

fn read_workbook<R: Read>(mut reader: R) -> Result<Vec<SearchItem>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| FinderError::Import(format!("unreadable workbook: {e}")))?;
    let range: Range<Data> = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FinderError::Import("workbook has no sheets".into()))?
        .map_err(|e| FinderError::Import(format!("unreadable sheet: {e}")))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect::<Vec<String>>());
    let Some(headers) = rows.next() else {
        return Err(FinderError::MissingColumns);
    };
    collect_items(&headers, rows.map(Ok))
}

/// Read search items from delimited text or a workbook.
///
/// Each accepted row gets a fresh UUID.
///
/// # Errors
///
/// - [`FinderError::TooManyRows`] if more than [`MAX_IMPORT_ROWS`] data rows are present
/// - [`FinderError::MissingColumns`] if no row has both a name and a state
/// - [`FinderError::Import`] if the input is not readable as `format`
pub fn read_items<R: Read>(reader: R, format: SheetFormat) -> Result<Vec<SearchItem>> {
    match format {
        SheetFormat::Csv => read_delimited(reader, b','),
        SheetFormat::Tsv => read_delimited(reader, b'\t'),
        SheetFormat::Xlsx => read_workbook(reader),
        SheetFormat::Json => Err(FinderError::Import(
            "JSON files cannot be imported; use .csv, .tsv, or .xlsx".into(),
        )),
    }
}

/// Read search items from a `.csv`/`.tsv`/`.xlsx`/`.xls` file.
///
/// # Errors
///
/// Same as [`read_items`], plus I/O errors and unsupported extensions.
pub fn import_file(path: &Path) -> Result<Vec<SearchItem>> {
    let format = SheetFormat::from_path(path)?;
    let file = File::open(path)?;
    read_items(file, format)
}
