//! All-text rectangular tables parsed from uploaded file bytes.
//!
//! Every cell is kept as the original text of the source file. No numeric or
//! date typing happens at parse time: downstream coercion owns all type
//! decisions and needs to see the raw representation to apply its own
//! tolerant rules.

use crate::error::{IngestError, Result};
use crate::schema::FileFormat;
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::{ReaderBuilder, Trim};
use std::io::Cursor;

/// A parsed settlement file: ordered named columns and text rows.
///
/// Transient; exists only within one processing invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Removes all whitespace and the literal characters `.` and `_` from a
/// header label, preserving the remaining characters' order and case.
///
/// `"IRCTC ORDER NO."` and `"IRCTC_ORDER_NO"` both clean to `"IRCTCORDERNO"`,
/// so matching between a file and a schema declaration is insensitive to
/// punctuation and spacing variance.
pub fn clean_header(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.' && *c != '_')
        .collect()
}

fn trim_cell(text: &str) -> String {
    text.trim().trim_start_matches('\u{feff}').trim().to_string()
}

impl RawTable {
    /// Parses raw file bytes into a table according to the format tag.
    pub fn parse(bytes: &[u8], format: FileFormat) -> Result<Self> {
        match format {
            FileFormat::Csv => Self::parse_csv(bytes),
            FileFormat::Excel => Self::parse_excel(bytes),
        }
    }

    fn parse_csv(bytes: &[u8]) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| IngestError::MalformedInput(format!("CSV header: {e}")))?
            .iter()
            .map(trim_cell)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| IngestError::MalformedInput(format!("CSV row: {e}")))?;
            rows.push(record.iter().map(trim_cell).collect());
        }

        Ok(RawTable { headers, rows })
    }

    fn parse_excel(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes.to_vec());
        let mut workbook = open_workbook_auto_from_rs(cursor)
            .map_err(|e| IngestError::MalformedInput(format!("workbook: {e}")))?;

        let sheet_names = workbook.sheet_names().to_owned();
        let first_sheet = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IngestError::MalformedInput("workbook has no worksheets".into()))?;

        let range = workbook
            .worksheet_range(&first_sheet)
            .map_err(|e| IngestError::MalformedInput(format!("worksheet {first_sheet}: {e}")))?;

        let mut all_rows = range.rows().map(|row| {
            row.iter()
                .map(|cell| trim_cell(&cell.to_string()))
                .collect::<Vec<_>>()
        });

        let headers = all_rows.next().unwrap_or_default();
        let rows = all_rows.collect();

        Ok(RawTable { headers, rows })
    }

    /// Builds a table directly from headers and rows.
    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rewrites every header to its cleaned form.
    pub fn clean_headers(&mut self) {
        for header in &mut self.headers {
            *header = clean_header(header);
        }
    }

    /// Renames headers per a (cleaned raw label, canonical name) mapping.
    /// Headers not mentioned in the mapping are left as-is.
    pub fn rename_headers(&mut self, mapping: &[(String, String)]) {
        for header in &mut self.headers {
            if let Some((_, canonical)) = mapping.iter().find(|(raw, _)| raw == header) {
                *header = canonical.clone();
            }
        }
    }

    /// Position of a column by header name.
    pub fn index_of(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell text at (row, column index). Rows shorter than the header set
    /// yield `None` for the trailing columns.
    pub fn cell<'a>(&self, row: &'a [String], index: Option<usize>) -> Option<&'a str> {
        index.and_then(|i| row.get(i)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_header_strips_whitespace_and_punctuation() {
        assert_eq!(clean_header("IRCTC ORDER NO."), "IRCTCORDERNO");
        assert_eq!(clean_header("IRCTCORDERNO"), "IRCTCORDERNO");
        assert_eq!(clean_header("BANK BOOKING REF.NO."), "BANKBOOKINGREFNO");
        assert_eq!(clean_header("bank_booking_ref_no"), "bankbookingrefno");
        assert_eq!(clean_header("  TXN \t DATE "), "TXNDATE");
    }

    #[test]
    fn test_clean_header_preserves_case_and_order() {
        assert_eq!(clean_header("Credited On"), "CreditedOn");
    }

    #[test]
    fn test_parse_csv_keeps_cells_as_text() {
        let csv = "A,B\n001,12.50\n,x\n";
        let table = RawTable::parse(csv.as_bytes(), FileFormat::Csv).unwrap();

        assert_eq!(table.headers(), &["A".to_string(), "B".to_string()]);
        assert_eq!(table.rows().len(), 2);
        // Leading zero survives: no numeric inference at parse time.
        assert_eq!(table.rows()[0][0], "001");
        assert_eq!(table.rows()[1][0], "");
    }

    #[test]
    fn test_parse_csv_handles_quoted_fields() {
        let csv = "NAME,AMOUNT\n\"Doe, Jane\",100.00\n";
        let table = RawTable::parse(csv.as_bytes(), FileFormat::Csv).unwrap();
        assert_eq!(table.rows()[0][0], "Doe, Jane");
    }

    #[test]
    fn test_parse_excel_rejects_garbage_bytes() {
        let result = RawTable::parse(b"this is not a workbook", FileFormat::Excel);
        assert!(matches!(result, Err(IngestError::MalformedInput(_))));
    }

    #[test]
    fn test_rename_leaves_unmapped_headers_alone() {
        let mut table = RawTable::from_parts(
            vec!["TXNDATE".into(), "REMARKS".into()],
            vec![],
        );
        table.rename_headers(&[("TXNDATE".into(), "transaction_date".into())]);
        assert_eq!(
            table.headers(),
            &["transaction_date".to_string(), "REMARKS".to_string()]
        );
    }

    #[test]
    fn test_cell_on_short_row_is_none() {
        let table = RawTable::from_parts(
            vec!["A".into(), "B".into()],
            vec![vec!["only-a".into()]],
        );
        let row = &table.rows()[0];
        assert_eq!(table.cell(row, table.index_of("A")), Some("only-a"));
        assert_eq!(table.cell(row, table.index_of("B")), None);
    }
}
