//! Schema Normalizer: maps a bank's column naming convention onto the
//! canonical field set.
//!
//! Given raw file bytes, a format tag, a bank and a transaction type, parses
//! an all-text table and rewrites its headers so they exactly match the
//! canonical field names required for that (bank, type) pair. Fails the whole
//! file on a missing required column; never returns a partial table.

use crate::error::{IngestError, Result};
use crate::schema::{FileFormat, SchemaRegistry, TransactionKind};
use crate::table::{clean_header, RawTable};
use log::{debug, info, warn};

/// Normalizes raw file bytes into a table with canonical headers.
pub fn normalize(
    bytes: &[u8],
    format: FileFormat,
    bank: &str,
    kind: TransactionKind,
    registry: &SchemaRegistry,
) -> Result<RawTable> {
    let schema = registry.schema(bank, kind)?;

    let mut table = RawTable::parse(bytes, format)?;
    info!("Initial columns: {}", table.headers().join(", "));

    table.clean_headers();
    debug!("Cleaned columns: {}", table.headers().join(", "));

    // The schema's declared labels go through the same cleaning rule as the
    // file's headers, so matching tolerates punctuation/spacing variance on
    // both sides.
    let required: Vec<String> = schema
        .required_columns
        .iter()
        .map(|c| clean_header(c))
        .collect();

    let mut missing: Vec<String> = required
        .iter()
        .filter(|r| !table.headers().contains(*r))
        .cloned()
        .collect();
    if !missing.is_empty() {
        missing.sort();
        warn!("Missing columns: {}", missing.join(", "));
        return Err(IngestError::SchemaMismatch { missing });
    }

    let mapping: Vec<(String, String)> = schema
        .column_map
        .iter()
        .map(|(raw, canonical)| (clean_header(raw), canonical.clone()))
        .collect();
    table.rename_headers(&mapping);
    info!("Renamed columns: {}", table.headers().join(", "));

    Ok(table)
}
