//! Run configuration shared by the forward and clean pipelines.

// Clippy pedantic allows:
// - RunOptions mirrors the CLI's boolean switches one to one
#![allow(clippy::struct_excessive_bools)]

use crate::chunk::{validate_capacity, DEFAULT_MAX_ROWS_PER_SHEET};
use crate::error::{DisclosureError, Result};
use crate::segment::SegmentationMode;
use crate::types::DEFAULT_WORKBOOK_NAME;

/// Options for one run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunOptions {
    /// Use sentence-boundary segmentation with table detection instead of the
    /// naive line split
    pub use_advanced_segmentation: bool,

    /// Reconcile an existing workbook instead of extracting documents
    pub clean: bool,

    /// Report progress and diagnostics
    pub verbose: bool,

    /// Maximum data rows per sheet (header excluded)
    pub max_rows_per_sheet: usize,

    /// Workbook file name used when the target is a directory
    pub workbook_name: String,
}

impl RunOptions {
    /// Select sentence-boundary segmentation
    #[inline]
    #[must_use = "returns options with segmentation configured"]
    pub fn with_advanced_segmentation(mut self, enable: bool) -> Self {
        self.use_advanced_segmentation = enable;
        self
    }

    /// Select the clean (group reconciliation) path
    #[inline]
    #[must_use = "returns options with clean mode configured"]
    pub fn with_clean(mut self, enable: bool) -> Self {
        self.clean = enable;
        self
    }

    /// Enable progress and diagnostic reporting
    #[inline]
    #[must_use = "returns options with verbosity configured"]
    pub fn with_verbose(mut self, enable: bool) -> Self {
        self.verbose = enable;
        self
    }

    /// Set sheet capacity
    #[inline]
    #[must_use = "returns options with sheet capacity configured"]
    pub fn with_max_rows_per_sheet(mut self, rows: usize) -> Self {
        self.max_rows_per_sheet = rows;
        self
    }

    /// Set the workbook file name used inside a directory target
    #[inline]
    #[must_use = "returns options with workbook name configured"]
    pub fn with_workbook_name(mut self, name: impl Into<String>) -> Self {
        self.workbook_name = name.into();
        self
    }

    /// Segmentation mode selected by these options
    #[inline]
    #[must_use = "returns the segmentation mode"]
    pub const fn segmentation_mode(&self) -> SegmentationMode {
        if self.use_advanced_segmentation {
            SegmentationMode::Sentences
        } else {
            SegmentationMode::Naive
        }
    }

    /// Reject unusable values before any work starts.
    ///
    /// # Errors
    /// Returns [`DisclosureError::InvalidInput`] for a sheet capacity of 0 or
    /// above the XLSX row limit, or a blank workbook name.
    pub fn validate(&self) -> Result<()> {
        validate_capacity(self.max_rows_per_sheet)?;
        if self.workbook_name.trim().is_empty() {
            return Err(DisclosureError::InvalidInput(
                "workbook name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RunOptions {
    #[inline]
    fn default() -> Self {
        Self {
            use_advanced_segmentation: false,
            clean: false,
            verbose: false,
            max_rows_per_sheet: DEFAULT_MAX_ROWS_PER_SHEET,
            workbook_name: DEFAULT_WORKBOOK_NAME.to_string(),
        }
    }
}
