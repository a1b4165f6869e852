//! Record Extractor: walks a normalized table and derives canonical records.
//!
//! Row processing is per-row isolated. Each field coercion is attempted
//! independently; a single field's failure yields a null value for that field
//! only. The one exception is an amount that is present but non-numeric,
//! which fails the whole row (logged and skipped, siblings unaffected). After
//! coercion, rows that fail the emission invariant are dropped silently.

use crate::error::RowError;
use crate::record::{BookingRecord, RecordBatch, RefundRecord};
use crate::schema::TransactionKind;
use crate::table::RawTable;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Date layouts seen across bank settlement exports.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d-%b-%y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d-%m-%Y %H:%M:%S"];

/// Permissive date coercion: unparseable or absent input yields `None`,
/// never an error.
///
/// Excel worksheets sometimes surface dates as serial numbers (days since
/// 1899-12-30); those are accepted as a fallback.
pub fn coerce_date(value: Option<&str>) -> Option<NaiveDate> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }

    // Excel serial-number fallback.
    let serial: f64 = text.parse().ok()?;
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Amount coercion: absent or empty input yields zero; input that is present
/// but non-numeric is a hard failure for the row.
pub fn coerce_amount(
    value: Option<&str>,
    field: &'static str,
) -> std::result::Result<Decimal, RowError> {
    let text = match value {
        Some(t) => t.trim(),
        None => return Ok(Decimal::ZERO),
    };
    if text.is_empty() {
        return Ok(Decimal::ZERO);
    }

    Decimal::from_str(text).map_err(|_| RowError::BadAmount {
        field,
        value: text.to_string(),
    })
}

/// Tolerant integer coercion for reference and order numbers: float parse
/// then truncation. Empty, absent, or non-numeric input yields `None`.
pub fn coerce_int(value: Option<&str>) -> Option<i64> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }

    let parsed: f64 = text.parse().ok()?;
    if !parsed.is_finite() || parsed < i64::MIN as f64 || parsed > i64::MAX as f64 {
        return None;
    }
    Some(parsed.trunc() as i64)
}

/// Derives canonical records from a normalized table.
///
/// Only the collection matching `kind` is populated; the other is always
/// empty. Reordering input rows changes nothing but log ordering.
pub fn extract(table: &RawTable, kind: TransactionKind, bank_code: u32) -> RecordBatch {
    let mut batch = RecordBatch::default();

    match kind {
        TransactionKind::Booking => extract_bookings(table, bank_code, &mut batch.bookings),
        TransactionKind::Refund => extract_refunds(table, bank_code, &mut batch.refunds),
    }

    info!(
        "Prepared {} booking and {} refund records",
        batch.bookings.len(),
        batch.refunds.len()
    );
    batch
}

fn extract_bookings(table: &RawTable, bank_code: u32, out: &mut Vec<BookingRecord>) {
    let transaction_date = table.index_of("transaction_date");
    let credited_date = table.index_of("credited_date");
    let booking_amount = table.index_of("booking_amount");
    let irctc_order_no = table.index_of("irctc_order_no");
    let bank_booking_ref_no = table.index_of("bank_booking_ref_no");

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        let amount = match coerce_amount(table.cell(row, booking_amount), "booking_amount") {
            Ok(amount) => amount,
            Err(e) => {
                warn!("Row {}: {} (raw: {})", row_num, e, row.join(","));
                continue;
            }
        };

        let record = BookingRecord {
            bank_code,
            transaction_date: coerce_date(table.cell(row, transaction_date)),
            credited_date: coerce_date(table.cell(row, credited_date)),
            booking_amount: amount,
            irctc_order_no: coerce_int(table.cell(row, irctc_order_no)),
            bank_booking_ref_no: coerce_int(table.cell(row, bank_booking_ref_no)),
        };

        if record.emittable() {
            debug!("Row {}: booking record {:?}", row_num, record);
            out.push(record);
        } else {
            debug!(
                "Row {}: dropped, order/booking reference missing (raw: {})",
                row_num,
                row.join(",")
            );
        }
    }
}

fn extract_refunds(table: &RawTable, bank_code: u32, out: &mut Vec<RefundRecord>) {
    let refund_date = table.index_of("refund_date");
    let debited_date = table.index_of("debited_date");
    let refund_amount = table.index_of("refund_amount");
    let irctc_order_no = table.index_of("irctc_order_no");
    let bank_booking_ref_no = table.index_of("bank_booking_ref_no");
    let bank_refund_ref_no = table.index_of("bank_refund_ref_no");

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = row_idx + 2;

        let amount = match coerce_amount(table.cell(row, refund_amount), "refund_amount") {
            Ok(amount) => amount,
            Err(e) => {
                warn!("Row {}: {} (raw: {})", row_num, e, row.join(","));
                continue;
            }
        };

        let record = RefundRecord {
            bank_code,
            refund_date: coerce_date(table.cell(row, refund_date)),
            debited_date: coerce_date(table.cell(row, debited_date)),
            refund_amount: amount,
            irctc_order_no: coerce_int(table.cell(row, irctc_order_no)),
            bank_booking_ref_no: coerce_int(table.cell(row, bank_booking_ref_no)),
            bank_refund_ref_no: coerce_int(table.cell(row, bank_refund_ref_no)),
        };

        if record.emittable() {
            debug!("Row {}: refund record {:?}", row_num, record);
            out.push(record);
        } else {
            debug!(
                "Row {}: dropped, order/refund reference missing (raw: {})",
                row_num,
                row.join(",")
            );
        }
    }
}
