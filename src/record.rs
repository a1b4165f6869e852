//! Canonical settlement records and the batch handed to persistence.
//!
//! Records are immutable once constructed; the batch owns them exclusively
//! until it is handed to the persistence collaborator.

use crate::schema::TransactionKind;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// A normalized booking transaction derived from one settlement file row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRecord {
    pub bank_code: u32,
    pub transaction_date: Option<NaiveDate>,
    pub credited_date: Option<NaiveDate>,
    pub booking_amount: Decimal,
    pub irctc_order_no: Option<i64>,
    pub bank_booking_ref_no: Option<i64>,
}

impl BookingRecord {
    /// Canonical field names a booking schema must map onto.
    pub const FIELDS: &'static [&'static str] = &[
        "transaction_date",
        "credited_date",
        "booking_amount",
        "irctc_order_no",
        "bank_booking_ref_no",
    ];

    /// Emission invariant: a booking is persisted only when both its order
    /// number and its booking reference number coerced to non-null integers.
    pub fn emittable(&self) -> bool {
        self.irctc_order_no.is_some() && self.bank_booking_ref_no.is_some()
    }
}

/// A normalized refund transaction derived from one settlement file row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundRecord {
    pub bank_code: u32,
    pub refund_date: Option<NaiveDate>,
    pub debited_date: Option<NaiveDate>,
    pub refund_amount: Decimal,
    pub irctc_order_no: Option<i64>,
    pub bank_booking_ref_no: Option<i64>,
    pub bank_refund_ref_no: Option<i64>,
}

impl RefundRecord {
    /// Canonical field names a refund schema must map onto.
    pub const FIELDS: &'static [&'static str] = &[
        "refund_date",
        "debited_date",
        "refund_amount",
        "irctc_order_no",
        "bank_booking_ref_no",
        "bank_refund_ref_no",
    ];

    /// Emission invariant: a refund is persisted only when both its order
    /// number and its refund reference number coerced to non-null integers.
    pub fn emittable(&self) -> bool {
        self.irctc_order_no.is_some() && self.bank_refund_ref_no.is_some()
    }
}

/// Output of one file's extraction: the collection matching the requested
/// transaction type is populated, the other is always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordBatch {
    pub bookings: Vec<BookingRecord>,
    pub refunds: Vec<RefundRecord>,
}

impl RecordBatch {
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty() && self.refunds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bookings.len() + self.refunds.len()
    }

    /// Writes the batch as CSV with canonical column order.
    ///
    /// Dates are formatted as `YYYY-MM-DD`, absent values as empty fields,
    /// so the output is deterministic for a given input.
    pub fn write_csv<W: std::io::Write>(
        &self,
        kind: TransactionKind,
        writer: W,
    ) -> crate::error::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        if kind == TransactionKind::Booking {
            csv_writer
                .write_record(
                    ["bank_code"]
                        .iter()
                        .chain(BookingRecord::FIELDS.iter())
                        .copied(),
                )
                .map_err(csv_io_error)?;
            for r in &self.bookings {
                csv_writer
                    .write_record([
                        r.bank_code.to_string(),
                        fmt_date(r.transaction_date),
                        fmt_date(r.credited_date),
                        r.booking_amount.to_string(),
                        fmt_int(r.irctc_order_no),
                        fmt_int(r.bank_booking_ref_no),
                    ])
                    .map_err(csv_io_error)?;
            }
        } else {
            csv_writer
                .write_record(
                    ["bank_code"]
                        .iter()
                        .chain(RefundRecord::FIELDS.iter())
                        .copied(),
                )
                .map_err(csv_io_error)?;
            for r in &self.refunds {
                csv_writer
                    .write_record([
                        r.bank_code.to_string(),
                        fmt_date(r.refund_date),
                        fmt_date(r.debited_date),
                        r.refund_amount.to_string(),
                        fmt_int(r.irctc_order_no),
                        fmt_int(r.bank_booking_ref_no),
                        fmt_int(r.bank_refund_ref_no),
                    ])
                    .map_err(csv_io_error)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn fmt_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_io_error(e: csv::Error) -> crate::error::IngestError {
    crate::error::IngestError::MalformedInput(format!("CSV output: {e}"))
}
