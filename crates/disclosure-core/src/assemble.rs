//! Record assembly: documents -> pages -> units -> one ordered row sequence.
//!
//! The assembler owns no I/O. Documents come from a [`DocumentListing`], page
//! text from each document's [`PageTextSource`], and progress goes to a
//! [`ProgressSink`]. Any error aborts the whole run and the partially filled
//! buffer is dropped.

use crate::error::{DisclosureError, Result};
use crate::segment::{SegmentationMode, Segmenter};
use crate::types::{year_from_name, Row, RowBuffer};

/// Raw text of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page ordinal
    pub number: u32,
    /// Extracted text, line breaks preserved
    pub text: String,
}

impl PageText {
    /// Create a page
    #[inline]
    #[must_use = "creates a page that should be used"]
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// A paginated document that can hand back its page texts in order.
pub trait PageTextSource {
    /// Document identity (file name) used for `source` and `year`
    fn name(&self) -> &str;

    /// Page texts in document order
    ///
    /// # Errors
    /// Returns an error if the document cannot be read or a page has no text.
    fn page_texts(&self) -> Result<Vec<PageText>>;
}

/// Enumerates the documents of one input directory.
pub trait DocumentListing {
    /// Documents in listing order (not necessarily sorted)
    ///
    /// # Errors
    /// Returns an error if the listing itself cannot be read.
    fn documents(&self) -> Result<Vec<Box<dyn PageTextSource>>>;
}

/// Receives progress notifications. Purely observational.
pub trait ProgressSink {
    /// Called once with the number of documents about to be processed
    fn start(&mut self, _total: usize) {}

    /// Called after each document has been fully assembled
    fn advance(&mut self, _document: &str) {}

    /// Called once after the last document
    fn finish(&mut self) {}
}

/// Progress sink that ignores every notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Walks every document, page and unit, producing one ordered [`RowBuffer`].
#[derive(Debug, Default)]
pub struct RecordAssembler {
    segmenter: Segmenter,
}

impl RecordAssembler {
    /// Create an assembler for the given mode
    #[inline]
    #[must_use = "creates an assembler that should be used"]
    pub fn new(mode: SegmentationMode) -> Self {
        Self::with_segmenter(Segmenter::new(mode))
    }

    /// Create an assembler around a preconfigured segmenter
    #[inline]
    #[must_use = "creates an assembler that should be used"]
    pub const fn with_segmenter(segmenter: Segmenter) -> Self {
        Self { segmenter }
    }

    /// Assemble rows for every document of the listing.
    ///
    /// Rows of page N precede rows of page N+1, and rows of an earlier listed
    /// document precede rows of a later one.
    ///
    /// # Errors
    /// Returns the first listing or extraction error; no rows are returned in
    /// that case.
    pub fn assemble(
        &self,
        listing: &dyn DocumentListing,
        progress: &mut dyn ProgressSink,
    ) -> Result<RowBuffer> {
        let documents = listing.documents()?;
        log::info!(
            "Assembling rows from {} documents ({:?} mode)",
            documents.len(),
            self.segmenter.mode()
        );

        progress.start(documents.len());
        let mut buffer = RowBuffer::new();
        for document in &documents {
            self.assemble_document(document.as_ref(), &mut buffer)?;
            progress.advance(document.name());
        }
        progress.finish();

        log::info!("Assembled {} rows", buffer.len());
        Ok(buffer)
    }

    /// Append the rows of one document to `buffer`, returning how many were
    /// added.
    ///
    /// # Errors
    /// Returns an error if the document cannot be read or reports a page
    /// ordinal of 0.
    pub fn assemble_document(
        &self,
        document: &dyn PageTextSource,
        buffer: &mut RowBuffer,
    ) -> Result<usize> {
        let name = document.name();
        let year = year_from_name(name);
        let pages = document.page_texts()?;
        let before = buffer.len();

        for page in &pages {
            if page.number == 0 {
                return Err(DisclosureError::extraction(
                    name,
                    "page ordinals start at 1",
                ));
            }
            for content in self.segmenter.segment(&page.text) {
                buffer.push(Row {
                    source: name.to_string(),
                    year,
                    page: page.number,
                    content,
                });
            }
        }

        let added = buffer.len() - before;
        log::debug!("{name}: {} pages, {added} rows", pages.len());
        Ok(added)
    }
}
