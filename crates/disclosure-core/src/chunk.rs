//! Capacity-bounded sheet planning.
//!
//! A row sequence that fits in one sheet is written to `Coding`. A longer one
//! is cut into consecutive chunks of at most `capacity` rows, written to
//! `Coding_0`, `Coding_1`, ... in order. Concatenating the chunks in sheet
//! order always gives back the original sequence.

use crate::error::{DisclosureError, Result};
use crate::types::SHEET_NAME;
use std::ops::Range;

/// Most data rows one sheet can hold: the XLSX row limit (1,048,576) minus
/// the header row.
pub const MAX_ROWS_PER_SHEET_LIMIT: usize = 1_048_575;

/// Default rows per sheet: one row of headroom below [`MAX_ROWS_PER_SHEET_LIMIT`].
pub const DEFAULT_MAX_ROWS_PER_SHEET: usize = MAX_ROWS_PER_SHEET_LIMIT - 1;

/// Check that `capacity` rows fit on one sheet.
///
/// # Errors
/// Returns [`DisclosureError::InvalidInput`] if `capacity` is 0 or above
/// [`MAX_ROWS_PER_SHEET_LIMIT`].
pub fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(DisclosureError::InvalidInput(
            "max_rows_per_sheet must be greater than 0".to_string(),
        ));
    }
    if capacity > MAX_ROWS_PER_SHEET_LIMIT {
        return Err(DisclosureError::InvalidInput(format!(
            "max_rows_per_sheet must be at most {MAX_ROWS_PER_SHEET_LIMIT}, got {capacity}"
        )));
    }
    Ok(())
}

/// Name of the `index`-th chunk sheet (`Coding_0`, `Coding_1`, ...)
#[inline]
#[must_use = "returns the sheet name"]
pub fn chunk_sheet_name(index: usize) -> String {
    format!("{SHEET_NAME}_{index}")
}

/// One planned sheet: its name and the range of rows it receives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetSpec {
    pub name: String,
    pub range: Range<usize>,
}

/// How `total` rows are laid out over sheets of at most `capacity` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPlan {
    total: usize,
    capacity: usize,
}

impl ChunkPlan {
    /// Plan `total` rows over sheets of `capacity` rows.
    ///
    /// # Errors
    /// Returns [`DisclosureError::InvalidInput`] if `capacity` is 0 or does
    /// not fit on one sheet.
    pub fn new(total: usize, capacity: usize) -> Result<Self> {
        validate_capacity(capacity)?;
        Ok(Self { total, capacity })
    }

    /// True when every row fits in the single `Coding` sheet
    #[inline]
    #[must_use = "returns whether a single sheet suffices"]
    pub const fn is_single_sheet(&self) -> bool {
        self.total <= self.capacity
    }

    /// Number of sheets the plan writes (at least 1, even for zero rows)
    #[inline]
    #[must_use = "returns the sheet count"]
    pub const fn sheet_count(&self) -> usize {
        if self.is_single_sheet() {
            1
        } else {
            self.total.div_ceil(self.capacity)
        }
    }

    /// Sheets in write order
    #[must_use = "returns the planned sheets"]
    pub fn sheets(&self) -> Vec<SheetSpec> {
        if self.is_single_sheet() {
            return vec![SheetSpec {
                name: SHEET_NAME.to_string(),
                range: 0..self.total,
            }];
        }
        (0..self.sheet_count())
            .map(|index| {
                let start = index * self.capacity;
                SheetSpec {
                    name: chunk_sheet_name(index),
                    range: start..(start + self.capacity).min(self.total),
                }
            })
            .collect()
    }
}

/// Split `rows` into named, order-preserving chunks.
///
/// # Errors
/// Returns [`DisclosureError::InvalidInput`] if `capacity` is 0 or does not
/// fit on one sheet.
pub fn chunk_rows<T>(rows: &[T], capacity: usize) -> Result<Vec<(String, &[T])>> {
    let plan = ChunkPlan::new(rows.len(), capacity)?;
    Ok(plan
        .sheets()
        .into_iter()
        .map(|sheet| (sheet.name, &rows[sheet.range]))
        .collect())
}

/// Read order of an output sheet, derived from its name.
///
/// `Coding` sorts first, then `Coding_<n>` by `n`, then any other sheet whose
/// name starts with `Coding` (in workbook order, since they compare equal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SheetOrder {
    Single,
    Chunk(u64),
    Other,
}

impl SheetOrder {
    /// Classify a sheet name; `None` for sheets that are not output sheets
    #[must_use = "returns the sheet's read order"]
    pub fn of(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(SHEET_NAME)?;
        if rest.is_empty() {
            return Some(Self::Single);
        }
        Some(
            rest.strip_prefix('_')
                .and_then(|suffix| suffix.parse::<u64>().ok())
                .map_or(Self::Other, Self::Chunk),
        )
    }
}
