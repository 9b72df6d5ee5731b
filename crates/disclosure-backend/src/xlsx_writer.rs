//! XLSX workbook writer using zip and quick-xml
//!
//! Produces a minimal SpreadsheetML package: one worksheet per chunk, a shared
//! string table for every text cell, and a single default cell style. `year`
//! and `page` are written as numeric cells; absent values are omitted cells.
//!
//! ## Package layout
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! xl/workbook.xml
//! xl/_rels/workbook.xml.rels
//! xl/styles.xml
//! xl/worksheets/sheet1.xml ... sheetN.xml
//! xl/sharedStrings.xml
//! ```
//!
//! Files are committed atomically: the package is written to a temporary file
//! in the destination directory and renamed over the target once complete, so
//! a failed write never leaves a truncated workbook behind.

use disclosure_core::{
    chunk_rows, validate_capacity, DisclosureError, Result, SheetRow, COLUMNS,
    DEFAULT_MAX_ROWS_PER_SHEET,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const CT_SHARED_STRINGS: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";

const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill>"#,
    r#"<fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

/// Column letters for [`COLUMNS`], in order
const COLUMN_LETTERS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Longest text a spreadsheet application will show in one cell
const MAX_CELL_CHARS: usize = 32_767;

/// Writes row sequences to chunked `Coding` workbooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XlsxWorkbookWriter {
    max_rows_per_sheet: usize,
}

impl XlsxWorkbookWriter {
    /// Create a writer that puts at most `max_rows_per_sheet` data rows on each sheet.
    ///
    /// # Errors
    /// Returns [`DisclosureError::InvalidInput`] if `max_rows_per_sheet` is 0
    /// or more than one sheet can hold below its header row.
    pub fn new(max_rows_per_sheet: usize) -> Result<Self> {
        validate_capacity(max_rows_per_sheet)?;
        Ok(Self { max_rows_per_sheet })
    }

    /// Sheet capacity of this writer
    #[inline]
    #[must_use = "returns the sheet capacity"]
    pub const fn max_rows_per_sheet(&self) -> usize {
        self.max_rows_per_sheet
    }

    /// Write `rows` as a workbook at `path`, replacing any existing file.
    ///
    /// Returns the sheet names in write order.
    ///
    /// # Errors
    /// Returns an error if the package cannot be built or the file cannot be
    /// committed. The previous file at `path`, if any, is left untouched.
    pub fn write(&self, rows: &[SheetRow], path: &Path) -> Result<Vec<String>> {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut staged = tempfile::Builder::new()
            .prefix(".disclosure-")
            .suffix(".xlsx.tmp")
            .tempfile_in(dir)?;
        let sheets = self.write_to(rows, staged.as_file_mut())?;
        staged.as_file_mut().sync_all()?;
        staged.persist(path).map_err(|e| DisclosureError::Io(e.error))?;

        log::info!(
            "Wrote {} rows to {} ({} sheets)",
            rows.len(),
            path.display(),
            sheets.len()
        );
        Ok(sheets)
    }

    /// Write `rows` as an XLSX package to any seekable sink.
    ///
    /// Returns the sheet names in write order.
    ///
    /// # Errors
    /// Returns [`DisclosureError::Workbook`] if the package cannot be written.
    pub fn write_to<W: Write + Seek>(&self, rows: &[SheetRow], writer: W) -> Result<Vec<String>> {
        let chunks = chunk_rows(rows, self.max_rows_per_sheet)?;
        let names: Vec<String> = chunks.iter().map(|(name, _)| name.clone()).collect();

        let mut zip = ZipWriter::new(writer);
        let mut strings = SharedStrings::default();

        start_part(&mut zip, "[Content_Types].xml")?;
        write_content_types(&mut zip, names.len())?;
        start_part(&mut zip, "_rels/.rels")?;
        write_root_relationships(&mut zip)?;
        start_part(&mut zip, "xl/workbook.xml")?;
        write_workbook(&mut zip, &names)?;
        start_part(&mut zip, "xl/_rels/workbook.xml.rels")?;
        write_workbook_relationships(&mut zip, names.len())?;
        start_part(&mut zip, "xl/styles.xml")?;
        zip.write_all(STYLES_XML.as_bytes())?;

        for (index, (name, chunk)) in chunks.iter().enumerate() {
            log::debug!("Writing sheet {name} with {} rows", chunk.len());
            start_part(&mut zip, &format!("xl/worksheets/sheet{}.xml", index + 1))?;
            write_worksheet(&mut zip, chunk, &mut strings)?;
        }

        start_part(&mut zip, "xl/sharedStrings.xml")?;
        write_shared_strings(&mut zip, &strings)?;

        zip.finish().map_err(zip_error)?;
        Ok(names)
    }
}

impl Default for XlsxWorkbookWriter {
    #[inline]
    fn default() -> Self {
        Self {
            max_rows_per_sheet: DEFAULT_MAX_ROWS_PER_SHEET,
        }
    }
}

fn xml_error(e: impl Display) -> DisclosureError {
    DisclosureError::Workbook(format!("failed to write XML: {e}"))
}

fn zip_error(e: impl Display) -> DisclosureError {
    DisclosureError::Workbook(format!("failed to write XLSX archive: {e}"))
}

fn start_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str) -> Result<()> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(name, options).map_err(zip_error)
}

/// Thin event helper over [`quick_xml::Writer`]
struct Xml<W: Write> {
    inner: Writer<W>,
}

impl<W: Write> Xml<W> {
    fn new(out: W) -> Result<Self> {
        let mut xml = Self {
            inner: Writer::new(out),
        };
        xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(xml)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.inner.write_event(event).map_err(xml_error)
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.event(Event::Start(
            BytesStart::new(name).with_attributes(attributes.iter().copied()),
        ))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.event(Event::Empty(
            BytesStart::new(name).with_attributes(attributes.iter().copied()),
        ))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::new(text)))
    }
}

fn write_content_types<W: Write>(out: W, sheet_count: usize) -> Result<()> {
    let mut xml = Xml::new(out)?;
    xml.open("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    xml.empty(
        "Default",
        &[("Extension", "rels"), ("ContentType", CT_RELATIONSHIPS)],
    )?;
    xml.empty(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )?;
    xml.empty(
        "Override",
        &[("PartName", "/xl/workbook.xml"), ("ContentType", CT_WORKBOOK)],
    )?;
    for index in 1..=sheet_count {
        let part = format!("/xl/worksheets/sheet{index}.xml");
        xml.empty(
            "Override",
            &[("PartName", part.as_str()), ("ContentType", CT_WORKSHEET)],
        )?;
    }
    xml.empty(
        "Override",
        &[("PartName", "/xl/styles.xml"), ("ContentType", CT_STYLES)],
    )?;
    xml.empty(
        "Override",
        &[
            ("PartName", "/xl/sharedStrings.xml"),
            ("ContentType", CT_SHARED_STRINGS),
        ],
    )?;
    xml.close("Types")
}

fn write_root_relationships<W: Write>(out: W) -> Result<()> {
    let mut xml = Xml::new(out)?;
    xml.open("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    xml.empty(
        "Relationship",
        &[
            ("Id", "rId1"),
            ("Type", REL_OFFICE_DOCUMENT),
            ("Target", "xl/workbook.xml"),
        ],
    )?;
    xml.close("Relationships")
}

fn write_workbook<W: Write>(out: W, names: &[String]) -> Result<()> {
    let mut xml = Xml::new(out)?;
    xml.open(
        "workbook",
        &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)],
    )?;
    xml.open("sheets", &[])?;
    for (index, name) in names.iter().enumerate() {
        let sheet_id = (index + 1).to_string();
        let rel_id = format!("rId{sheet_id}");
        xml.empty(
            "sheet",
            &[
                ("name", name.as_str()),
                ("sheetId", sheet_id.as_str()),
                ("r:id", rel_id.as_str()),
            ],
        )?;
    }
    xml.close("sheets")?;
    xml.close("workbook")
}

fn write_workbook_relationships<W: Write>(out: W, sheet_count: usize) -> Result<()> {
    let mut xml = Xml::new(out)?;
    xml.open("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    for index in 1..=sheet_count {
        let id = format!("rId{index}");
        let target = format!("worksheets/sheet{index}.xml");
        xml.empty(
            "Relationship",
            &[
                ("Id", id.as_str()),
                ("Type", REL_WORKSHEET),
                ("Target", target.as_str()),
            ],
        )?;
    }
    let styles_id = format!("rId{}", sheet_count + 1);
    xml.empty(
        "Relationship",
        &[
            ("Id", styles_id.as_str()),
            ("Type", REL_STYLES),
            ("Target", "styles.xml"),
        ],
    )?;
    let strings_id = format!("rId{}", sheet_count + 2);
    xml.empty(
        "Relationship",
        &[
            ("Id", strings_id.as_str()),
            ("Type", REL_SHARED_STRINGS),
            ("Target", "sharedStrings.xml"),
        ],
    )?;
    xml.close("Relationships")
}

/// A cell value to write
#[derive(Debug, Clone, Copy)]
enum Cell<'a> {
    Text(&'a str),
    Number(u32),
}

fn write_worksheet<W: Write>(out: W, rows: &[SheetRow], strings: &mut SharedStrings) -> Result<()> {
    let mut xml = Xml::new(out)?;
    xml.open(
        "worksheet",
        &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)],
    )?;
    xml.open("sheetData", &[])?;

    let header = COLUMNS.map(|column| Some(Cell::Text(column)));
    write_row(&mut xml, 1, &header, strings)?;

    for (offset, row) in rows.iter().enumerate() {
        let cells = [
            Some(Cell::Text(&row.source)),
            Some(Cell::Number(row.year)),
            Some(Cell::Number(row.page)),
            row.group.as_ref().map(|key| Cell::Text(key.as_str())),
            row.disclosure.as_deref().map(Cell::Text),
            row.table_data.as_deref().map(Cell::Text),
        ];
        write_row(&mut xml, offset + 2, &cells, strings)?;
    }

    xml.close("sheetData")?;
    xml.close("worksheet")
}

fn write_row<W: Write>(
    xml: &mut Xml<W>,
    number: usize,
    cells: &[Option<Cell<'_>>],
    strings: &mut SharedStrings,
) -> Result<()> {
    let row_ref = number.to_string();
    xml.open("row", &[("r", row_ref.as_str())])?;

    for (column, cell) in cells.iter().enumerate() {
        let Some(cell) = cell else { continue };
        let cell_ref = format!("{}{number}", COLUMN_LETTERS[column]);
        let value = match *cell {
            Cell::Text(text) => {
                if text.chars().count() > MAX_CELL_CHARS {
                    log::warn!("Cell {cell_ref} exceeds {MAX_CELL_CHARS} characters");
                }
                xml.open("c", &[("r", cell_ref.as_str()), ("t", "s")])?;
                strings.intern(text).to_string()
            }
            Cell::Number(value) => {
                xml.open("c", &[("r", cell_ref.as_str())])?;
                value.to_string()
            }
        };
        xml.open("v", &[])?;
        xml.text(&value)?;
        xml.close("v")?;
        xml.close("c")?;
    }

    xml.close("row")
}

/// Deduplicated string table shared by all worksheets
#[derive(Debug, Default)]
struct SharedStrings {
    index: HashMap<String, usize>,
    strings: Vec<String>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, text: &str) -> usize {
        self.references += 1;
        let text = xml_safe(text);
        if let Some(&existing) = self.index.get(text.as_ref()) {
            return existing;
        }
        let id = self.strings.len();
        self.strings.push(text.to_string());
        self.index.insert(text.into_owned(), id);
        id
    }
}

fn write_shared_strings<W: Write>(out: W, strings: &SharedStrings) -> Result<()> {
    let count = strings.references.to_string();
    let unique = strings.strings.len().to_string();

    let mut xml = Xml::new(out)?;
    xml.open(
        "sst",
        &[
            ("xmlns", NS_MAIN),
            ("count", count.as_str()),
            ("uniqueCount", unique.as_str()),
        ],
    )?;
    for text in &strings.strings {
        xml.open("si", &[])?;
        xml.open("t", &[("xml:space", "preserve")])?;
        xml.text(text)?;
        xml.close("t")?;
        xml.close("si")?;
    }
    xml.close("sst")
}

/// Characters allowed in an XML 1.0 document
const fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Drop characters XML 1.0 cannot carry (control bytes from PDF text, mostly)
fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        log::debug!("Dropping characters not allowed in XML from cell text");
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}
