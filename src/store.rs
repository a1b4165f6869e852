//! Persistence collaborator boundary.
//!
//! The core never opens a transactional boundary of its own; a batch is
//! handed over whole and the store decides how to write it. Constraint and
//! duplicate handling is the store's concern, not the pipeline's.

use crate::error::Result;
use crate::record::{BookingRecord, RefundRecord};
use chrono::NaiveDate;
use log::debug;
use rusqlite::{params, Connection};
use std::path::Path;

/// Bulk-insert contract the pipeline hands finished batches to.
pub trait TransactionStore {
    fn bulk_create_booking_transactions(&mut self, records: &[BookingRecord]) -> Result<usize>;
    fn bulk_create_refund_transactions(&mut self, records: &[RefundRecord]) -> Result<usize>;
}

/// SQLite-backed store. Each bulk insert runs inside a single transaction,
/// so a failed batch leaves nothing behind.
pub struct SqliteStore {
    conn: Connection,
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS booking_transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bank_code INTEGER NOT NULL,
    transaction_date TEXT,
    credited_date TEXT,
    booking_amount TEXT NOT NULL,
    irctc_order_no INTEGER NOT NULL,
    bank_booking_ref_no INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS refund_transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bank_code INTEGER NOT NULL,
    refund_date TEXT,
    debited_date TEXT,
    refund_amount TEXT NOT NULL,
    irctc_order_no INTEGER NOT NULL,
    bank_booking_ref_no INTEGER,
    bank_refund_ref_no INTEGER NOT NULL
);
";

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures both tables exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(SqliteStore { conn })
    }

    /// In-memory store, used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(SqliteStore { conn })
    }

    /// Row count of a table, for verification.
    pub fn count(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

impl TransactionStore for SqliteStore {
    fn bulk_create_booking_transactions(&mut self, records: &[BookingRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO booking_transactions
                 (bank_code, transaction_date, credited_date, booking_amount,
                  irctc_order_no, bank_booking_ref_no)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for r in records {
                stmt.execute(params![
                    r.bank_code,
                    date_text(r.transaction_date),
                    date_text(r.credited_date),
                    r.booking_amount.to_string(),
                    r.irctc_order_no,
                    r.bank_booking_ref_no,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Bulk inserted {} booking transactions", records.len());
        Ok(records.len())
    }

    fn bulk_create_refund_transactions(&mut self, records: &[RefundRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO refund_transactions
                 (bank_code, refund_date, debited_date, refund_amount,
                  irctc_order_no, bank_booking_ref_no, bank_refund_ref_no)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for r in records {
                stmt.execute(params![
                    r.bank_code,
                    date_text(r.refund_date),
                    date_text(r.debited_date),
                    r.refund_amount.to_string(),
                    r.irctc_order_no,
                    r.bank_booking_ref_no,
                    r.bank_refund_ref_no,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Bulk inserted {} refund transactions", records.len());
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn booking(order: i64, reference: i64) -> BookingRecord {
        BookingRecord {
            bank_code: 40,
            transaction_date: NaiveDate::from_ymd_opt(2024, 10, 1),
            credited_date: None,
            booking_amount: Decimal::from_str("150.00").unwrap(),
            irctc_order_no: Some(order),
            bank_booking_ref_no: Some(reference),
        }
    }

    #[test]
    fn test_bulk_insert_bookings() {
        let mut store = SqliteStore::in_memory().unwrap();
        let records = vec![booking(1, 10), booking(2, 20)];

        let written = store.bulk_create_booking_transactions(&records).unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.count("booking_transactions").unwrap(), 2);
        assert_eq!(store.count("refund_transactions").unwrap(), 0);
    }

    #[test]
    fn test_amount_round_trips_as_text() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .bulk_create_booking_transactions(&[booking(1, 10)])
            .unwrap();

        let amount: String = store
            .conn
            .query_row(
                "SELECT booking_amount FROM booking_transactions",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(amount, "150.00");
    }

    #[test]
    fn test_refund_with_null_booking_reference() {
        let mut store = SqliteStore::in_memory().unwrap();
        let record = RefundRecord {
            bank_code: 40,
            refund_date: None,
            debited_date: None,
            refund_amount: Decimal::ZERO,
            irctc_order_no: Some(5),
            bank_booking_ref_no: None,
            bank_refund_ref_no: Some(99),
        };
        store.bulk_create_refund_transactions(&[record]).unwrap();
        assert_eq!(store.count("refund_transactions").unwrap(), 1);
    }
}
