//! # Disclosure Backend
//!
//! File formats and run pipelines for disclosure extraction:
//!
//! - [`pdf`]: page text of PDF files (lopdf) and PDF directory listing
//! - [`xlsx_writer`]: chunked `Coding` workbooks (zip + quick-xml)
//! - [`xlsx_reader`]: reading `Coding*` sheets back (calamine)
//! - [`pipeline`]: forward and clean runs
//!
//! ```rust,no_run
//! use disclosure_backend::run_forward;
//! use disclosure_core::{NoProgress, RunOptions};
//! use std::path::Path;
//!
//! let options = RunOptions::default().with_advanced_segmentation(true);
//! let report = run_forward(Path::new("filings"), &options, &mut NoProgress)?;
//! println!("{} rows in {:?}", report.rows, report.sheets);
//! # Ok::<(), disclosure_core::DisclosureError>(())
//! ```

pub mod pdf;
pub mod pipeline;
pub mod xlsx_reader;
pub mod xlsx_writer;

pub use pdf::{PdfDirectory, PdfDocument};
pub use pipeline::{extract_directory, resolve_workbook_path, run, run_clean, run_forward, RunReport};
pub use xlsx_reader::{read_workbook, rows_from_range, WorkbookRows};
pub use xlsx_writer::XlsxWorkbookWriter;
