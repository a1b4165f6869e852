//! Per-bank dialect configuration: bank codes and column schemas.
//!
//! Every bank exports its settlement reports with its own human-authored
//! column headings. A [`TransactionSchema`] declares, for one (bank,
//! transaction type) pair, which raw columns must be present and how each
//! maps onto the canonical field names. The [`SchemaRegistry`] holds the
//! static tables, is built once at process start, and is read-only
//! afterwards. Adding a bank means adding registry entries, never touching
//! extraction logic.

use crate::error::{IngestError, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Which kind of settlement report a file contains.
///
/// The type is fixed per file upload; a single invocation never mixes
/// bookings and refunds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Booking,
    Refund,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Booking => "booking",
            TransactionKind::Refund => "refund",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "booking" => Ok(TransactionKind::Booking),
            "refund" => Ok(TransactionKind::Refund),
            other => Err(IngestError::UnknownTransactionKind(other.to_string())),
        }
    }
}

/// Source file format tag supplied by the upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Excel,
    Csv,
}

impl FileFormat {
    /// Infers the format from a file name, the way the upload view does:
    /// Excel extensions map to `Excel`, everything else is treated as CSV.
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            FileFormat::Excel
        } else {
            FileFormat::Csv
        }
    }
}

impl FromStr for FileFormat {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "excel" => Ok(FileFormat::Excel),
            "csv" => Ok(FileFormat::Csv),
            other => Err(IngestError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Column layout for one (bank, transaction type) pair.
///
/// `required_columns` are the raw labels as they appear in the bank's export;
/// `column_map` maps raw labels to canonical field names. Both sides are
/// matched after header cleaning, so punctuation and spacing variance between
/// the declaration and the file is irrelevant.
#[derive(Debug, Clone)]
pub struct TransactionSchema {
    pub required_columns: Vec<String>,
    pub column_map: Vec<(String, String)>,
}

impl TransactionSchema {
    pub fn new<S: Into<String>>(required: Vec<S>, map: Vec<(S, S)>) -> Self {
        TransactionSchema {
            required_columns: required.into_iter().map(Into::into).collect(),
            column_map: map
                .into_iter()
                .map(|(raw, canonical)| (raw.into(), canonical.into()))
                .collect(),
        }
    }

    /// Canonical field names this schema produces, in declaration order.
    pub fn canonical_fields(&self) -> Vec<&str> {
        self.column_map
            .iter()
            .map(|(_, canonical)| canonical.as_str())
            .collect()
    }
}

/// Static registry of bank codes and per-bank transaction schemas.
///
/// Built once at startup and treated as read-only for the process lifetime.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    bank_codes: HashMap<String, u32>,
    schemas: HashMap<(String, TransactionKind), TransactionSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the supported banks and layouts.
    pub fn builtin() -> Self {
        let mut registry = SchemaRegistry::new();
        registry.register_bank("hdfc", 101);
        registry.register_bank("icici", 102);
        registry.register_bank("karur_vysya", 40);

        registry.register_schema(
            "karur_vysya",
            TransactionKind::Booking,
            TransactionSchema::new(
                vec![
                    "TXN DATE",
                    "IRCTC ORDER NO.",
                    "BANK BOOKING REF.NO.",
                    "BOOKING AMOUNT",
                    "CREDITED ON",
                ],
                vec![
                    ("IRCTCORDERNO", "irctc_order_no"),
                    ("BANKBOOKINGREFNO", "bank_booking_ref_no"),
                    ("BOOKINGAMOUNT", "booking_amount"),
                    ("TXNDATE", "transaction_date"),
                    ("CREDITEDON", "credited_date"),
                ],
            ),
        );

        registry.register_schema(
            "karur_vysya",
            TransactionKind::Refund,
            TransactionSchema::new(
                vec![
                    "REFUND DATE",
                    "IRCTC ORDER NO.",
                    "BANK BOOKING REF.NO.",
                    "BANK REFUND REF.NO.",
                    "REFUND AMOUNT",
                    "DEBITED ON",
                ],
                vec![
                    ("IRCTCORDERNO", "irctc_order_no"),
                    ("REFUNDAMOUNT", "refund_amount"),
                    ("DEBITEDON", "debited_date"),
                    ("REFUNDDATE", "refund_date"),
                    ("BANKBOOKINGREFNO", "bank_booking_ref_no"),
                    ("BANKREFUNDREFNO", "bank_refund_ref_no"),
                ],
            ),
        );

        registry
    }

    pub fn register_bank(&mut self, name: &str, code: u32) {
        self.bank_codes.insert(name.to_string(), code);
    }

    pub fn register_schema(
        &mut self,
        bank: &str,
        kind: TransactionKind,
        schema: TransactionSchema,
    ) {
        self.schemas.insert((bank.to_string(), kind), schema);
    }

    /// Resolves a bank identifier to its numeric code.
    pub fn bank_code(&self, bank: &str) -> Result<u32> {
        self.bank_codes
            .get(bank)
            .copied()
            .ok_or_else(|| IngestError::UnknownBank(bank.to_string()))
    }

    /// Looks up the schema for a (bank, transaction type) pair.
    pub fn schema(&self, bank: &str, kind: TransactionKind) -> Result<&TransactionSchema> {
        self.schemas
            .get(&(bank.to_string(), kind))
            .ok_or_else(|| IngestError::UnknownSchema {
                bank: bank.to_string(),
                kind,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        assert_eq!(
            "booking".parse::<TransactionKind>().unwrap(),
            TransactionKind::Booking
        );
        assert_eq!(
            " Refund ".parse::<TransactionKind>().unwrap(),
            TransactionKind::Refund
        );
        assert!(matches!(
            "transfer".parse::<TransactionKind>(),
            Err(IngestError::UnknownTransactionKind(_))
        ));
    }

    #[test]
    fn test_format_parse_and_inference() {
        assert_eq!("excel".parse::<FileFormat>().unwrap(), FileFormat::Excel);
        assert_eq!("CSV".parse::<FileFormat>().unwrap(), FileFormat::Csv);
        assert!(matches!(
            "pdf".parse::<FileFormat>(),
            Err(IngestError::UnsupportedFormat(_))
        ));

        assert_eq!(
            FileFormat::from_file_name("report.XLSX"),
            FileFormat::Excel
        );
        assert_eq!(FileFormat::from_file_name("report.csv"), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("report.txt"), FileFormat::Csv);
    }

    #[test]
    fn test_builtin_bank_codes() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(registry.bank_code("karur_vysya").unwrap(), 40);
        assert_eq!(registry.bank_code("hdfc").unwrap(), 101);
        assert_eq!(registry.bank_code("icici").unwrap(), 102);
        assert!(matches!(
            registry.bank_code("sbi"),
            Err(IngestError::UnknownBank(_))
        ));
    }

    #[test]
    fn test_builtin_schemas_exist_for_karur_vysya_only() {
        let registry = SchemaRegistry::builtin();
        assert!(registry
            .schema("karur_vysya", TransactionKind::Booking)
            .is_ok());
        assert!(registry
            .schema("karur_vysya", TransactionKind::Refund)
            .is_ok());
        assert!(matches!(
            registry.schema("hdfc", TransactionKind::Booking),
            Err(IngestError::UnknownSchema { .. })
        ));
    }

    #[test]
    fn test_registry_is_extendable() {
        let mut registry = SchemaRegistry::builtin();
        registry.register_bank("axis", 55);
        registry.register_schema(
            "axis",
            TransactionKind::Booking,
            TransactionSchema::new(
                vec!["DATE", "ORDER", "REF", "AMT"],
                vec![
                    ("ORDER", "irctc_order_no"),
                    ("REF", "bank_booking_ref_no"),
                    ("AMT", "booking_amount"),
                    ("DATE", "transaction_date"),
                ],
            ),
        );
        assert_eq!(registry.bank_code("axis").unwrap(), 55);
        assert!(registry.schema("axis", TransactionKind::Booking).is_ok());
    }
}
