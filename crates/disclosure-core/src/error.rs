//! Error types for extraction and reconciliation runs.
//!
//! Every failure is terminal for a run. Nothing is written until the complete
//! row sequence is ready, so an error raised anywhere before the workbook
//! writer leaves no artifact behind.

use thiserror::Error;

/// Error types that can occur during an extraction or clean run.
///
/// # Examples
///
/// ```rust,ignore
/// use disclosure_backend::run_forward;
/// use disclosure_core::{DisclosureError, NoProgress, RunOptions};
///
/// match run_forward("reports/", &RunOptions::default(), &mut NoProgress) {
///     Ok(report) => println!("wrote {} rows", report.rows),
///     Err(DisclosureError::InvalidInput(msg)) => eprintln!("bad input: {msg}"),
///     Err(DisclosureError::Extraction { source_name, message }) => {
///         eprintln!("{source_name}: {message}");
///     }
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum DisclosureError {
    /// Invalid or missing path, or an unusable configuration value.
    ///
    /// Raised before any row is produced.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A document could not be opened or one of its pages yielded no text.
    #[error("Extraction error in {source_name}: {message}")]
    Extraction {
        /// File name of the document that failed.
        source_name: String,
        /// What went wrong.
        message: String,
    },

    /// Workbook read/write failure, including schema problems in a workbook
    /// handed to the clean pass.
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DisclosureError {
    /// Build an [`DisclosureError::Extraction`] for the named document.
    #[inline]
    #[must_use = "returns the error to be propagated"]
    pub fn extraction(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Type alias for [`Result<T, DisclosureError>`].
pub type Result<T> = std::result::Result<T, DisclosureError>;
