//! Export helpers
//!
//! Serialize a tabular result set to CSV, XLSX, or JSON. Pure functions over
//! a flattened [`Table`]; no state, no I/O beyond the returned bytes.

use serde::Serialize;
use thiserror::Error;

/// Errors from export serialization
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX export failed: {0}")]
    Xlsx(String),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export produced invalid UTF-8")]
    Utf8,
}

/// A flattened table: one row per result, one column per provider field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    pub fn with_headers(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Serialize a table to CSV text
pub fn to_csv(table: &Table) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|_| ExportError::Utf8)
}

/// Parse CSV text back into a table (headers + string cells)
pub fn from_csv(data: &str) -> Result<Table, ExportError> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(Table::with_headers(headers, rows))
}

/// Serialize a table to XLSX bytes with a styled header row
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>, ExportError> {
    use rust_xlsxwriter::{Color, Format, Workbook};

    let xlsx_err = |e: rust_xlsxwriter::XlsxError| ExportError::Xlsx(e.to_string());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Results").map_err(xlsx_err)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x366092));

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(xlsx_err)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let row_num = row_idx as u32 + 1;
            let col_num = col_idx as u16;
            // Numeric cells become numbers so spreadsheet formulas work
            if let Ok(value) = cell.parse::<f64>() {
                worksheet
                    .write_number(row_num, col_num, value)
                    .map_err(xlsx_err)?;
            } else {
                worksheet
                    .write_string(row_num, col_num, cell)
                    .map_err(xlsx_err)?;
            }
        }
    }

    for (col, header) in table.headers.iter().enumerate() {
        let max_len = table
            .rows
            .iter()
            .map(|row| row.get(col).map(|c| c.len()).unwrap_or(0))
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(10);
        let width = (max_len + 2).min(50) as f64;
        worksheet
            .set_column_width(col as u16, width)
            .map_err(xlsx_err)?;
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

/// Serialize any result value to pretty JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeywordKind, KeywordRow, ResultSet};

    fn sample_set() -> ResultSet {
        ResultSet::Keywords(vec![
            KeywordRow {
                keyword: "seo tools".to_string(),
                search_volume: 5400,
                difficulty: 62,
                cpc: 3.1,
                competition: 0.62,
                kind: KeywordKind::Related,
            },
            KeywordRow {
                keyword: "what is seo, really".to_string(),
                search_volume: 880,
                difficulty: 35,
                cpc: 0.9,
                competition: 0.35,
                kind: KeywordKind::Question,
            },
        ])
    }

    #[test]
    fn test_csv_round_trip() {
        let table = sample_set().to_table();
        let csv_text = to_csv(&table).unwrap();
        let parsed = from_csv(&csv_text).unwrap();

        assert_eq!(parsed.headers, table.headers);
        assert_eq!(parsed.rows.len(), table.rows.len());
        // Field values survive the trip, including the embedded comma
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_csv_empty_table() {
        let table = Table::new(&["A", "B"], vec![]);
        let csv_text = to_csv(&table).unwrap();
        let parsed = from_csv(&csv_text).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed.headers, vec!["A", "B"]);
    }

    #[test]
    fn test_xlsx_produces_bytes() {
        let table = sample_set().to_table();
        let bytes = to_xlsx(&table).unwrap();
        // XLSX is a zip container
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_json_export() {
        let set = sample_set();
        let json = to_json(&set).unwrap();
        assert!(json.contains("seo tools"));
        assert!(json.contains("5400"));
    }
}
