//! End-to-end processing of one uploaded settlement file.
//!
//! One invocation is one independent unit of work: resolve the bank code,
//! normalize the table, extract records. No state is shared across files, so
//! the same bytes always yield a structurally identical batch.

use crate::error::Result;
use crate::extract::extract;
use crate::normalize::normalize;
use crate::record::RecordBatch;
use crate::schema::{FileFormat, SchemaRegistry, TransactionKind};
use crate::store::TransactionStore;
use log::info;

/// Processes raw file bytes into a batch of canonical records.
///
/// File-level failures (unknown bank, unsupported format, malformed input,
/// schema mismatch) abort the whole invocation; row-level failures are
/// contained inside extraction.
pub fn process_bytes(
    bytes: &[u8],
    format: FileFormat,
    bank: &str,
    kind: TransactionKind,
    registry: &SchemaRegistry,
) -> Result<RecordBatch> {
    let bank_code = registry.bank_code(bank)?;
    let table = normalize(bytes, format, bank, kind, registry)?;
    Ok(extract(&table, kind, bank_code))
}

/// Hands a batch to the persistence collaborator.
///
/// Empty collections are not written at all. Returns the number of records
/// persisted.
pub fn persist_batch<S: TransactionStore>(batch: &RecordBatch, store: &mut S) -> Result<usize> {
    let mut written = 0;

    if !batch.bookings.is_empty() {
        written += store.bulk_create_booking_transactions(&batch.bookings)?;
        info!("Stored {} booking records", batch.bookings.len());
    }
    if !batch.refunds.is_empty() {
        written += store.bulk_create_refund_transactions(&batch.refunds)?;
        info!("Stored {} refund records", batch.refunds.len());
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;

    const BOOKING_CSV: &str = "\
TXN DATE,IRCTC ORDER NO.,BANK BOOKING REF.NO.,BOOKING AMOUNT,CREDITED ON
01-10-2024,12345,678.0,,02-10-2024
01-10-2024,,679,150.00,02-10-2024
";

    #[test]
    fn test_process_booking_file() {
        let registry = SchemaRegistry::builtin();
        let batch = process_bytes(
            BOOKING_CSV.as_bytes(),
            FileFormat::Csv,
            "karur_vysya",
            TransactionKind::Booking,
            &registry,
        )
        .unwrap();

        // Second row lacks an order number and is dropped by the emission filter.
        assert_eq!(batch.bookings.len(), 1);
        assert_eq!(batch.bookings[0].irctc_order_no, Some(12345));
        assert_eq!(batch.bookings[0].bank_booking_ref_no, Some(678));
        assert!(batch.bookings[0].booking_amount.is_zero());
    }

    #[test]
    fn test_unknown_bank_aborts_before_parsing() {
        let registry = SchemaRegistry::builtin();
        let err = process_bytes(
            BOOKING_CSV.as_bytes(),
            FileFormat::Csv,
            "unknown_bank",
            TransactionKind::Booking,
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::UnknownBank(_)));
    }

    #[test]
    fn test_processing_is_idempotent() {
        let registry = SchemaRegistry::builtin();
        let run = || {
            process_bytes(
                BOOKING_CSV.as_bytes(),
                FileFormat::Csv,
                "karur_vysya",
                TransactionKind::Booking,
                &registry,
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }
}
