//! Forward (extract) and clean (reconcile) runs over files on disk.
//!
//! Both paths validate their inputs before any row is produced and commit
//! through a single workbook write at the end, so an aborted run leaves the
//! file system as it was.

use crate::pdf::PdfDirectory;
use crate::xlsx_reader::read_workbook;
use crate::xlsx_writer::XlsxWorkbookWriter;
use disclosure_core::{
    reconcile, DisclosureError, ProgressSink, RecordAssembler, ReconcileSummary, Reconciled,
    Result, RowBuffer, RunOptions,
};
use std::path::{Path, PathBuf};

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Workbook that was written
    pub output: PathBuf,
    /// Data rows written
    pub rows: usize,
    /// Sheets written, in order
    pub sheets: Vec<String>,
    /// Group counts, for clean runs
    pub reconcile: Option<ReconcileSummary>,
}

/// Workbook path for a run target: `<dir>/<workbook_name>` for a directory,
/// the path itself otherwise.
#[must_use = "returns the resolved workbook path"]
pub fn resolve_workbook_path(target: &Path, options: &RunOptions) -> PathBuf {
    if target.is_dir() {
        target.join(&options.workbook_name)
    } else {
        target.to_path_buf()
    }
}

/// Extract rows from every PDF in `dir`.
///
/// # Errors
/// Returns [`DisclosureError::InvalidInput`] if `dir` is not a directory, or
/// the first extraction error.
pub fn extract_directory(
    dir: &Path,
    options: &RunOptions,
    progress: &mut dyn ProgressSink,
) -> Result<RowBuffer> {
    let listing = PdfDirectory::new(dir)?;
    RecordAssembler::new(options.segmentation_mode()).assemble(&listing, progress)
}

/// Extract rows from every PDF in `dir` and write them to
/// `<dir>/<workbook_name>`.
///
/// # Errors
/// Returns an error for invalid options or paths, any extraction failure, or
/// a failed workbook write. Nothing is written unless extraction succeeds.
pub fn run_forward(
    dir: &Path,
    options: &RunOptions,
    progress: &mut dyn ProgressSink,
) -> Result<RunReport> {
    options.validate()?;
    let writer = XlsxWorkbookWriter::new(options.max_rows_per_sheet)?;
    let output = dir.join(&options.workbook_name);

    log::info!(
        "Extracting {} ({:?} segmentation)",
        dir.display(),
        options.segmentation_mode()
    );
    let rows = extract_directory(dir, options, progress)?.into_sheet_rows();
    let sheets = writer.write(&rows, &output)?;

    Ok(RunReport {
        output,
        rows: rows.len(),
        sheets,
        reconcile: None,
    })
}

/// Merge grouped rows of an existing workbook and write the result back over
/// it.
///
/// `target` is either the workbook itself or a directory holding
/// `<workbook_name>`.
///
/// # Errors
/// Returns [`DisclosureError::InvalidInput`] if the workbook does not exist,
/// or [`DisclosureError::Workbook`] if it cannot be read or rewritten.
pub fn run_clean(target: &Path, options: &RunOptions) -> Result<RunReport> {
    options.validate()?;
    let writer = XlsxWorkbookWriter::new(options.max_rows_per_sheet)?;
    let output = resolve_workbook_path(target, options);
    if !output.is_file() {
        return Err(DisclosureError::InvalidInput(format!(
            "{} is not an existing workbook",
            output.display()
        )));
    }

    log::info!("Cleaning {}", output.display());
    let workbook = read_workbook(&output)?;
    let Reconciled { rows, summary } = reconcile(workbook.rows);
    let sheets = writer.write(&rows, &output)?;

    Ok(RunReport {
        output,
        rows: rows.len(),
        sheets,
        reconcile: Some(summary),
    })
}

/// Run the path selected by [`RunOptions::clean`].
///
/// # Errors
/// See [`run_forward`] and [`run_clean`].
pub fn run(target: &Path, options: &RunOptions, progress: &mut dyn ProgressSink) -> Result<RunReport> {
    if options.clean {
        run_clean(target, options)
    } else {
        run_forward(target, options, progress)
    }
}
