//! Row records exchanged by every stage of the pipeline.
//!
//! Freshly extracted rows use [`Row`], whose [`RowContent`] is either a prose
//! fragment or a single tabular value. The two-nullable-column shape of the
//! spreadsheet schema only exists at the workbook boundary, as [`SheetRow`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column headers of every output sheet, in their fixed order.
pub const COLUMNS: [&str; 6] = ["source", "year", "page", "group", "disclosure", "table_data"];

/// Name of the single output sheet, and the prefix of chunked sheets
/// (`Coding_0`, `Coding_1`, ...).
pub const SHEET_NAME: &str = "Coding";

/// Default workbook file name inside the document directory.
pub const DEFAULT_WORKBOOK_NAME: &str = "tax_information.xlsx";

/// Content of a freshly extracted row: exactly one of prose or tabular value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowContent {
    /// A prose fragment (sentence, line, or the text left around a table block)
    Prose(String),
    /// One line of a tabular numeric block
    TableValue(String),
}

impl RowContent {
    /// Text carried by the row, whichever kind it is
    #[inline]
    #[must_use = "returns the row text"]
    pub fn text(&self) -> &str {
        match self {
            Self::Prose(text) | Self::TableValue(text) => text,
        }
    }

    /// True for [`RowContent::TableValue`]
    #[inline]
    #[must_use = "returns whether the row is a tabular value"]
    pub const fn is_table_value(&self) -> bool {
        matches!(self, Self::TableValue(_))
    }
}

/// A row produced by the forward path, stamped with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Row {
    /// File name of the originating document
    pub source: String,
    /// First four-digit run in the file name, 0 if none
    pub year: u32,
    /// 1-based page ordinal within the document
    pub page: u32,
    /// Prose fragment or tabular value
    pub content: RowContent,
}

/// A human-assigned group key read back from the `group` column.
///
/// Keys are normalized text so that a reviewer typing `3` and a workbook
/// storing `3.0` land in the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey(String);

impl GroupKey {
    /// Build a key from cell text. Blank text means "no group".
    #[must_use = "returns the normalized key"]
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Build a key from a numeric cell, dropping the fraction of integral values.
    #[must_use = "returns the normalized key"]
    #[allow(clippy::cast_possible_truncation)] // guarded by the fract/range check
    pub fn from_number(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
            Self(format!("{}", value as i64))
        } else {
            Self(value.to_string())
        }
    }

    /// The normalized key text
    #[inline]
    #[must_use = "returns the key text"]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One data row of an output sheet.
///
/// Rows read back for the clean pass, and rows produced by merging a group,
/// may carry both text columns or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetRow {
    pub source: String,
    pub year: u32,
    pub page: u32,
    pub group: Option<GroupKey>,
    pub disclosure: Option<String>,
    pub table_data: Option<String>,
}

impl SheetRow {
    /// Exactly one of `disclosure` / `table_data` is present.
    #[inline]
    #[must_use = "returns whether the row satisfies the fresh-row invariant"]
    pub const fn is_well_formed(&self) -> bool {
        self.disclosure.is_some() != self.table_data.is_some()
    }
}

impl From<Row> for SheetRow {
    fn from(row: Row) -> Self {
        let (disclosure, table_data) = match row.content {
            RowContent::Prose(text) => (Some(text), None),
            RowContent::TableValue(text) => (None, Some(text)),
        };
        Self {
            source: row.source,
            year: row.year,
            page: row.page,
            group: None,
            disclosure,
            table_data,
        }
    }
}

/// The run's row sequence, owned by exactly one pipeline stage at a time.
///
/// The assembler fills it and hands it to the writer by value; nothing else
/// holds a reference to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowBuffer {
    rows: Vec<Row>,
}

impl RowBuffer {
    /// Create an empty buffer
    #[inline]
    #[must_use = "creates an empty row buffer"]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append a row at the end of the sequence
    #[inline]
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Number of rows
    #[inline]
    #[must_use = "returns the row count"]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no row has been produced
    #[inline]
    #[must_use = "returns whether the buffer is empty"]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in sequence order
    #[inline]
    #[must_use = "returns the rows as a slice"]
    pub fn as_slice(&self) -> &[Row] {
        &self.rows
    }

    /// Convert to the workbook shape, preserving order
    #[must_use = "returns the rows in workbook shape"]
    pub fn into_sheet_rows(self) -> Vec<SheetRow> {
        self.rows.into_iter().map(SheetRow::from).collect()
    }
}

impl From<Vec<Row>> for RowBuffer {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl IntoIterator for RowBuffer {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Derive a document's year from its file name.
///
/// Returns the first run of four consecutive ASCII digits, or 0. A longer digit
/// run yields its first four digits.
#[must_use = "returns the derived year"]
pub fn year_from_name(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut run = 0usize;
    for (i, byte) in bytes.iter().enumerate() {
        if byte.is_ascii_digit() {
            run += 1;
            if run == 4 {
                return bytes[i - 3..=i]
                    .iter()
                    .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'));
            }
        } else {
            run = 0;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prose_row(text: &str) -> Row {
        Row {
            source: "report_2019.pdf".to_string(),
            year: 2019,
            page: 1,
            content: RowContent::Prose(text.to_string()),
        }
    }

    #[test]
    fn test_year_from_name() {
        assert_eq!(year_from_name("annual_report_2019.pdf"), 2019);
        assert_eq!(year_from_name("2020-2021 statements.pdf"), 2020);
        assert_eq!(year_from_name("notes.pdf"), 0);
        assert_eq!(year_from_name("q3_19.pdf"), 0);
    }

    #[test]
    fn test_year_from_longer_digit_run_takes_first_four() {
        assert_eq!(year_from_name("doc_201903.pdf"), 2019);
        assert_eq!(year_from_name("v12_x_1998.pdf"), 1998);
    }

    #[test]
    fn test_sheet_row_from_prose() {
        let row = SheetRow::from(prose_row("Revenue increased."));
        assert_eq!(row.disclosure.as_deref(), Some("Revenue increased."));
        assert!(row.table_data.is_none());
        assert!(row.group.is_none());
        assert!(row.is_well_formed());
    }

    #[test]
    fn test_sheet_row_from_table_value() {
        let row = SheetRow::from(Row {
            content: RowContent::TableValue("(567)".to_string()),
            ..prose_row("")
        });
        assert!(row.disclosure.is_none());
        assert_eq!(row.table_data.as_deref(), Some("(567)"));
        assert!(row.is_well_formed());
    }

    #[test]
    fn test_sheet_row_well_formed_rejects_both_and_neither() {
        let both = SheetRow {
            disclosure: Some("a".to_string()),
            table_data: Some("1".to_string()),
            ..SheetRow::default()
        };
        assert!(!both.is_well_formed());
        assert!(!SheetRow::default().is_well_formed());
    }

    #[test]
    fn test_group_key_normalization() {
        assert_eq!(GroupKey::new("  a1 "), Some(GroupKey("a1".to_string())));
        assert_eq!(GroupKey::new("   "), None);
        assert_eq!(GroupKey::from_number(3.0).as_str(), "3");
        assert_eq!(GroupKey::from_number(2.5).as_str(), "2.5");
        assert_eq!(GroupKey::from_number(3.0), GroupKey::new("3").unwrap());
    }

    #[test]
    fn test_row_buffer_preserves_order() {
        let mut buffer = RowBuffer::new();
        assert!(buffer.is_empty());
        buffer.push(prose_row("first"));
        buffer.push(prose_row("second"));
        assert_eq!(buffer.len(), 2);

        let rows = buffer.into_sheet_rows();
        assert_eq!(rows[0].disclosure.as_deref(), Some("first"));
        assert_eq!(rows[1].disclosure.as_deref(), Some("second"));
    }

    #[test]
    fn test_columns_order() {
        assert_eq!(
            COLUMNS,
            ["source", "year", "page", "group", "disclosure", "table_data"]
        );
    }
}
