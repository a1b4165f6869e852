//! Error types for settlement report ingestion.
//!
//! Two severities exist and are kept as distinct types: [`IngestError`] is
//! fatal for the whole file (nothing is persisted), while [`RowError`] is
//! contained to a single row (the row is logged and skipped, siblings
//! continue).

use crate::schema::TransactionKind;
use thiserror::Error;

/// Result type alias for file-level ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors that abort processing of an entire uploaded file.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unrecognized format tag (only `excel` and `csv` are supported)
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Unrecognized transaction type (only `booking` and `refund` are supported)
    #[error("Unknown transaction type: {0}")]
    UnknownTransactionKind(String),

    /// The byte stream could not be parsed as a rectangular table
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Required columns absent after header cleaning
    #[error("Missing columns after cleaning: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// Bank identifier absent from the bank code table
    #[error("Bank code for {0} not found")]
    UnknownBank(String),

    /// No schema registered for this (bank, transaction type) pair
    #[error("No {kind} schema registered for bank {bank}")]
    UnknownSchema { bank: String, kind: TransactionKind },

    /// Persistence layer failure
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Missing CLI arguments
    #[error("Missing arguments. Usage: settlement-ingest <input-file> <bank> <booking|refund> [sqlite-db]")]
    MissingArgument,
}

/// Errors contained to a single row of a settlement file.
///
/// An amount that is present but garbled is the one coercion failure treated
/// as an error rather than a null: it distinguishes a corrupted field from an
/// omitted one. Dates and reference numbers coerce to `None` instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RowError {
    /// Amount field present but not parseable as a decimal
    #[error("non-numeric value in {field}: '{value}'")]
    BadAmount { field: &'static str, value: String },
}
