//! Workbook write/read round trips through real files.

mod common;

use calamine::{open_workbook, Data, Reader, Xlsx};
use common::sheet_row;
use disclosure_backend::{read_workbook, XlsxWorkbookWriter};
use disclosure_core::{DisclosureError, GroupKey, SheetRow, COLUMNS};
use tempfile::TempDir;

fn rows(count: u32) -> Vec<SheetRow> {
    (1..=count)
        .map(|page| sheet_row("annual_2019.pdf", page, None, Some(&format!("Line {page}"))))
        .collect()
}

#[test]
fn test_written_workbook_reads_back_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tax_information.xlsx");

    let mut written = rows(3);
    written[1].disclosure = None;
    written[1].table_data = Some("(1,234.5)".to_string());
    written[2].disclosure = Some("  leading and trailing  ".to_string());

    XlsxWorkbookWriter::new(100).unwrap().write(&written, &path).unwrap();
    let read = read_workbook(&path).unwrap();

    assert_eq!(read.sheets, vec!["Coding"]);
    assert_eq!(read.rows, written);
}

#[test]
fn test_header_and_cell_types_seen_by_calamine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.xlsx");
    XlsxWorkbookWriter::new(10).unwrap().write(&rows(1), &path).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Coding".to_string()]);

    let range = workbook.worksheet_range("Coding").unwrap();
    let lines: Vec<&[Data]> = range.rows().collect();
    let header: Vec<String> = lines[0].iter().map(ToString::to_string).collect();
    assert_eq!(header, COLUMNS.to_vec());

    assert_eq!(lines[1][0], Data::String("annual_2019.pdf".to_string()));
    assert_eq!(lines[1][1], Data::Float(2019.0));
    assert_eq!(lines[1][2], Data::Float(1.0));
    assert_eq!(lines[1][3], Data::Empty);
    assert_eq!(lines[1][4], Data::String("Line 1".to_string()));
}

#[test]
fn test_chunked_workbook_reads_back_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.xlsx");
    let written = rows(7);

    let sheets = XlsxWorkbookWriter::new(3).unwrap().write(&written, &path).unwrap();
    assert_eq!(sheets, vec!["Coding_0", "Coding_1", "Coding_2"]);

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let sizes: Vec<usize> = sheets
        .iter()
        .map(|name| workbook.worksheet_range(name).unwrap().height() - 1)
        .collect();
    assert_eq!(sizes, vec![3, 3, 1]);

    let read = read_workbook(&path).unwrap();
    assert_eq!(read.sheets, sheets);
    assert_eq!(read.rows, written);
}

#[test]
fn test_group_keys_survive_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grouped.xlsx");
    let written = vec![
        sheet_row("a_2020.pdf", 1, Some("1"), Some("first")),
        sheet_row("a_2020.pdf", 1, Some("note-a"), Some("second")),
    ];

    XlsxWorkbookWriter::new(10).unwrap().write(&written, &path).unwrap();
    let read = read_workbook(&path).unwrap();
    assert_eq!(read.rows[0].group, GroupKey::new("1"));
    assert_eq!(read.rows[1].group, GroupKey::new("note-a"));
}

#[test]
fn test_empty_archive_is_workbook_error() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.xlsx");
    std::fs::write(&bogus, b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0").unwrap();
    assert!(matches!(
        read_workbook(&bogus),
        Err(DisclosureError::Workbook(_))
    ));
}

#[test]
fn test_rewrite_in_place_shrinks_sheet_count() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shrink.xlsx");

    XlsxWorkbookWriter::new(2).unwrap().write(&rows(5), &path).unwrap();
    assert_eq!(read_workbook(&path).unwrap().sheets.len(), 3);

    XlsxWorkbookWriter::new(2).unwrap().write(&rows(2), &path).unwrap();
    let read = read_workbook(&path).unwrap();
    assert_eq!(read.sheets, vec!["Coding"]);
    assert_eq!(read.rows.len(), 2);
}
