//! # Disclosure Core
//!
//! Pure logic for turning paginated document text into ordered spreadsheet
//! rows, and for merging reviewer-grouped rows back together.
//!
//! ## Pipeline
//!
//! ```text
//! forward:  PageTextSource -> Segmenter -> table::extract_rows -> RecordAssembler -> chunk
//! clean:    sheets -> reconcile -> chunk
//! ```
//!
//! File formats (PDF pages, XLSX workbooks) live in `disclosure-backend`; this
//! crate only sees page text and row records.
//!
//! ## Quick Start
//!
//! ```rust
//! use disclosure_core::{RowContent, SegmentationMode, Segmenter};
//!
//! let segmenter = Segmenter::new(SegmentationMode::Sentences);
//! let rows = segmenter.segment("Revenue increased.\n1,234\n(567)\n89.5\nNet effect stated above.");
//!
//! assert_eq!(rows.len(), 5);
//! assert_eq!(rows[1], RowContent::TableValue("1,234".to_string()));
//! ```
//!
//! ## Row invariants
//!
//! - Fresh rows ([`Row`]) are exactly one of prose or tabular value.
//! - Rows of page N precede rows of page N+1; rows of an earlier listed
//!   document precede rows of a later one.
//! - Chunking never reorders, drops or duplicates rows.
//! - Reconciliation yields one row per ungrouped row plus one per distinct
//!   group key, and is a no-op on its own output.

pub mod assemble;
pub mod chunk;
pub mod error;
pub mod options;
pub mod reconcile;
pub mod segment;
pub mod table;
pub mod types;

pub use assemble::{DocumentListing, NoProgress, PageText, PageTextSource, ProgressSink, RecordAssembler};
pub use chunk::{
    chunk_rows, chunk_sheet_name, validate_capacity, ChunkPlan, SheetOrder, SheetSpec,
    DEFAULT_MAX_ROWS_PER_SHEET, MAX_ROWS_PER_SHEET_LIMIT,
};
pub use error::{DisclosureError, Result};
pub use options::RunOptions;
pub use reconcile::{reconcile, ReconcileSummary, Reconciled};
pub use segment::{SegmentationMode, Segmenter, SentenceBoundary, UnicodeSentences};
pub use table::{extract_blocks, extract_rows, is_numeric_line, TableSplit};
pub use types::{
    year_from_name, GroupKey, Row, RowBuffer, RowContent, SheetRow, COLUMNS, DEFAULT_WORKBOOK_NAME,
    SHEET_NAME,
};
