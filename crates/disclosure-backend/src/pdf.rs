//! PDF page text via lopdf, and directory listing of PDF files.
//!
//! Documents are opened lazily: [`PdfDirectory`] only collects paths, and each
//! [`PdfDocument`] loads its file when the assembler asks for its pages. A
//! document is therefore fully read and released before the next one opens.

use disclosure_core::{DisclosureError, DocumentListing, PageText, PageTextSource, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A PDF file on disk
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfDocument {
    path: PathBuf,
    name: String,
}

impl PdfDocument {
    /// Create a document for `path`. Nothing is read until
    /// [`PageTextSource::page_texts`] is called.
    #[must_use = "creates a document handle that should be used"]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    /// Path of the PDF file
    #[inline]
    #[must_use = "returns the document path"]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages, read from the page tree
    ///
    /// # Errors
    /// Returns an error if the file is not a loadable PDF.
    pub fn page_count(&self) -> Result<usize> {
        Ok(self.load()?.get_pages().len())
    }

    fn load(&self) -> Result<lopdf::Document> {
        lopdf::Document::load(&self.path).map_err(|e| {
            DisclosureError::extraction(&self.name, format!("failed to load PDF: {e}"))
        })
    }
}

impl PageTextSource for PdfDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_texts(&self) -> Result<Vec<PageText>> {
        let document = self.load()?;
        let pages = document.get_pages();
        let mut texts = Vec::with_capacity(pages.len());

        // get_pages() is keyed by 1-based page number, in document order
        for &number in pages.keys() {
            let text = document.extract_text(&[number]).map_err(|e| {
                DisclosureError::extraction(&self.name, format!("page {number}: {e}"))
            })?;
            texts.push(PageText::new(number, text));
        }

        log::debug!("{}: extracted {} pages", self.name, texts.len());
        Ok(texts)
    }
}

/// The PDF files of one directory, in `read_dir` order.
///
/// The directory is listed once, when the value is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfDirectory {
    dir: PathBuf,
    paths: Vec<PathBuf>,
}

impl PdfDirectory {
    /// List the regular files with a `.pdf` extension (any case) in `dir`.
    ///
    /// Order is whatever the file system returns; it is not sorted.
    ///
    /// # Errors
    /// Returns [`DisclosureError::InvalidInput`] if `dir` is not a directory,
    /// or an I/O error if it cannot be read.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DisclosureError::InvalidInput(format!(
                "{} is not a valid directory",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && has_pdf_extension(&path) {
                paths.push(path);
            }
        }
        Ok(Self { dir, paths })
    }

    /// Directory being listed
    #[inline]
    #[must_use = "returns the listed directory"]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths of the listed PDF files
    #[inline]
    #[must_use = "returns the listed PDF paths"]
    pub fn pdf_paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of PDF files found
    #[inline]
    #[must_use = "returns the number of PDF files"]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True when the directory holds no PDF files
    #[inline]
    #[must_use = "returns whether any PDF files were found"]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

impl fmt::Display for PdfDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' contains {} PDF files.",
            self.dir.display(),
            self.paths.len()
        )
    }
}

impl DocumentListing for PdfDirectory {
    fn documents(&self) -> Result<Vec<Box<dyn PageTextSource>>> {
        log::info!("{self}");
        Ok(self
            .paths
            .iter()
            .map(|path| Box::new(PdfDocument::new(path)) as Box<dyn PageTextSource>)
            .collect())
    }
}
