//! Spreadsheet formats: xlsx, xls, csv
//!
//! Workbooks render as a text summary rather than a faithful grid: a
//! header line per file, a heading per sheet, then a capped number of
//! rows with cells joined by pipes. Long rows are clipped.

use crate::error::PrintHubError;
use crate::pdf::{Font, TextFlow};
use crate::tools::office::clip;
use calamine::{open_workbook_auto_from_rs, Reader};
use std::io::Cursor;

const ROWS_PER_SHEET: usize = 10;
const CSV_MAX_LINES: usize = 30;
const ROW_WIDTH: usize = 80;

const TITLE_SIZE: f64 = 14.0;
const SHEET_SIZE: f64 = 12.0;
const ROW_SIZE: f64 = 8.0;

/// Convert an xlsx or xls workbook to a PDF summary.
pub fn workbook_to_pdf(bytes: &[u8], name: &str) -> Result<Vec<u8>, PrintHubError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| PrintHubError::Parse(format!("Failed to open workbook: {}", e)))?;

    let mut flow = TextFlow::new();
    flow.line(&format!("Excel File: {}", name), Font::Bold, TITLE_SIZE)?;
    flow.blank(SHEET_SIZE)?;

    let sheet_names = workbook.sheet_names();
    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| PrintHubError::Parse(format!("Sheet {}: {}", sheet_name, e)))?;

        flow.line(&format!("Sheet: {}", sheet_name), Font::Bold, SHEET_SIZE)?;

        let total_rows = range.height();
        for row in range.rows().take(ROWS_PER_SHEET) {
            let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            flow.line(&clip(&cells.join(" | "), ROW_WIDTH), Font::Regular, ROW_SIZE)?;
        }
        if total_rows > ROWS_PER_SHEET {
            flow.line(
                &format!("... and {} more rows", total_rows - ROWS_PER_SHEET),
                Font::Oblique,
                ROW_SIZE,
            )?;
        }
        flow.blank(SHEET_SIZE)?;
    }
    flow.finish()
}

/// Convert csv text to a PDF summary.
pub fn csv_to_pdf(bytes: &[u8], name: &str) -> Result<Vec<u8>, PrintHubError> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().collect();

    let mut flow = TextFlow::new();
    flow.line(&format!("CSV File: {}", name), Font::Bold, TITLE_SIZE)?;
    flow.blank(SHEET_SIZE)?;

    for line in lines.iter().take(CSV_MAX_LINES) {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        flow.line(&clip(&cells.join(" | "), ROW_WIDTH), Font::Regular, ROW_SIZE)?;
    }
    if lines.len() > CSV_MAX_LINES {
        flow.line(
            &format!("... and {} more rows", lines.len() - CSV_MAX_LINES),
            Font::Oblique,
            ROW_SIZE,
        )?;
    }
    flow.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Document;

    #[test]
    fn test_csv_to_pdf_is_loadable() {
        let csv = b"name,qty,price\npen,2,10\nnotebook,1,40\n";
        let pdf = csv_to_pdf(csv, "order.csv").unwrap();
        assert!(Document::load_mem(&pdf).is_ok());
    }

    #[test]
    fn test_csv_elision_beyond_cap() {
        let mut csv = String::from("h1,h2\n");
        for i in 0..50 {
            csv.push_str(&format!("row{},{}\n", i, i));
        }
        // 51 lines total, 21 beyond the cap
        let pdf = csv_to_pdf(csv.as_bytes(), "big.csv").unwrap();
        assert!(Document::load_mem(&pdf).is_ok());
    }

    #[test]
    fn test_garbage_workbook_is_a_parse_error() {
        let err = workbook_to_pdf(b"definitely not a workbook", "x.xlsx").unwrap_err();
        assert!(matches!(err, PrintHubError::Parse(_)));
    }
}
