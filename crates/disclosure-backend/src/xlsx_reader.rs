//! XLSX workbook reader using calamine
//!
//! Reads every output sheet (`Coding`, `Coding_<n>`, other `Coding*`) of a
//! workbook, in [`SheetOrder`], and turns the data rows back into
//! [`SheetRow`]s. Columns are located by header name, so a reviewer may
//! reorder or add columns without breaking the read.

// Clippy pedantic allows:
// - Whole, in-range floats are converted to page/year numbers
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use disclosure_core::{DisclosureError, GroupKey, Result, SheetOrder, SheetRow, COLUMNS};
use std::path::Path;

static EMPTY: Data = Data::Empty;

/// Rows read from a workbook, with the sheets they came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookRows {
    /// Output sheets in read order
    pub sheets: Vec<String>,
    /// Data rows of all sheets, concatenated in read order
    pub rows: Vec<SheetRow>,
}

/// Read all output sheets of the workbook at `path`.
///
/// Sheets whose names do not start with `Coding` are ignored.
///
/// # Errors
/// Returns [`DisclosureError::Workbook`] if the file is not a readable XLSX
/// workbook, has no output sheet, lacks a required column, or holds a
/// non-numeric `year` or `page` value.
pub fn read_workbook(path: &Path) -> Result<WorkbookRows> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
        DisclosureError::Workbook(format!("Failed to open XLSX: {e}: {}", path.display()))
    })?;

    let mut sheets: Vec<(SheetOrder, String)> = workbook
        .sheet_names()
        .into_iter()
        .filter_map(|name| SheetOrder::of(&name).map(|order| (order, name)))
        .collect();
    if sheets.is_empty() {
        return Err(DisclosureError::Workbook(format!(
            "no Coding sheet in {}",
            path.display()
        )));
    }
    // stable: unnumbered Coding* sheets keep workbook order
    sheets.sort_by_key(|(order, _)| *order);

    let mut out = WorkbookRows::default();
    for (_, name) in sheets {
        let range = workbook.worksheet_range(&name).map_err(|e| {
            DisclosureError::Workbook(format!("Failed to read sheet {name}: {e}"))
        })?;
        let rows = rows_from_range(&name, &range)?;
        log::debug!("Read {} rows from sheet {name}", rows.len());
        out.rows.extend(rows);
        out.sheets.push(name);
    }

    log::info!(
        "Read {} rows from {} sheets of {}",
        out.rows.len(),
        out.sheets.len(),
        path.display()
    );
    Ok(out)
}

/// Convert one sheet's cell range into rows. The first row is the header.
///
/// Fully blank rows are skipped. An empty range yields no rows.
///
/// # Errors
/// Returns [`DisclosureError::Workbook`] for a missing column or a bad
/// `year`/`page` value.
pub fn rows_from_range(sheet: &str, range: &Range<Data>) -> Result<Vec<SheetRow>> {
    let mut lines = range.rows();
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };
    let columns = ColumnIndex::locate(sheet, header)?;
    let first_row = range.start().map_or(0, |(row, _)| u64::from(row));

    let mut rows = Vec::new();
    for (offset, cells) in lines.enumerate() {
        if cells.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        // 1-based sheet row; +2 skips the header
        let row_number = first_row + offset as u64 + 2;
        let number = |column: usize| {
            let cell = columns.cell(cells, column);
            cell_number(cell).ok_or_else(|| {
                DisclosureError::Workbook(format!(
                    "sheet {sheet} row {row_number}: invalid {} value '{cell}'",
                    COLUMNS[column]
                ))
            })
        };

        rows.push(SheetRow {
            source: cell_text(columns.cell(cells, SOURCE)).unwrap_or_default(),
            year: number(YEAR)?,
            page: number(PAGE)?,
            group: cell_group(columns.cell(cells, GROUP)),
            disclosure: cell_text(columns.cell(cells, DISCLOSURE)),
            table_data: cell_text(columns.cell(cells, TABLE_DATA)),
        });
    }
    Ok(rows)
}

const SOURCE: usize = 0;
const YEAR: usize = 1;
const PAGE: usize = 2;
const GROUP: usize = 3;
const DISCLOSURE: usize = 4;
const TABLE_DATA: usize = 5;

/// Position of each of [`COLUMNS`] within a sheet row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    positions: [usize; 6],
}

impl ColumnIndex {
    fn locate(sheet: &str, header: &[Data]) -> Result<Self> {
        let mut positions = [0; 6];
        for (slot, column) in positions.iter_mut().zip(COLUMNS) {
            *slot = header
                .iter()
                .position(|cell| cell.to_string().trim() == column)
                .ok_or_else(|| {
                    DisclosureError::Workbook(format!("sheet {sheet} has no '{column}' column"))
                })?;
        }
        Ok(Self { positions })
    }

    fn cell<'a>(&self, cells: &'a [Data], column: usize) -> &'a Data {
        cells.get(self.positions[column]).unwrap_or(&EMPTY)
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) if text.is_empty() => None,
        Data::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn cell_number(cell: &Data) -> Option<u32> {
    match cell {
        Data::Int(value) => u32::try_from(*value).ok(),
        Data::Float(value)
            if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(value) =>
        {
            Some(*value as u32)
        }
        Data::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn cell_group(cell: &Data) -> Option<GroupKey> {
    match cell {
        Data::Empty => None,
        Data::Float(value) => Some(GroupKey::from_number(*value)),
        Data::String(text) => GroupKey::new(text),
        other => GroupKey::new(&other.to_string()),
    }
}
