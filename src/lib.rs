//! # Settlement Ingest
//!
//! Normalizes bank settlement reports (booking and refund files, uploaded as
//! Excel or CSV) into canonical transaction records for downstream
//! reconciliation.
//!
//! ## Design Principles
//!
//! - **All-text parsing**: cells keep their original textual form; type
//!   decisions belong to the coercion layer
//! - **Two failure severities**: file-level errors abort the invocation,
//!   row-level errors are logged and contained to that row
//! - **Static dialect registry**: per-bank column layouts are data, not code
//! - **Pure pipeline**: same bytes in, structurally identical batch out
//!
//! ## Example
//!
//! ```no_run
//! use settlement_ingest::{process_bytes, FileFormat, SchemaRegistry, TransactionKind};
//!
//! let registry = SchemaRegistry::builtin();
//! let csv = b"TXN DATE,IRCTC ORDER NO.,BANK BOOKING REF.NO.,BOOKING AMOUNT,CREDITED ON\n\
//!             01-10-2024,12345,678,150.00,02-10-2024\n";
//! let batch = process_bytes(
//!     csv,
//!     FileFormat::Csv,
//!     "karur_vysya",
//!     TransactionKind::Booking,
//!     &registry,
//! ).unwrap();
//! assert_eq!(batch.bookings.len(), 1);
//! ```

pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod store;
pub mod table;

pub use error::{IngestError, Result, RowError};
pub use pipeline::{persist_batch, process_bytes};
pub use record::{BookingRecord, RecordBatch, RefundRecord};
pub use schema::{FileFormat, SchemaRegistry, TransactionKind, TransactionSchema};
pub use store::{SqliteStore, TransactionStore};
pub use table::RawTable;
