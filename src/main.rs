//! Settlement Ingest CLI
//!
//! Reads one bank settlement report, normalizes it into canonical records,
//! and either persists them to a SQLite database or writes them as CSV to
//! stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- report.csv karur_vysya booking > records.csv
//! cargo run -- report.xlsx karur_vysya refund settlements.db
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use settlement_ingest::{
    persist_batch, process_bytes, FileFormat, IngestError, Result, SchemaRegistry, SqliteStore,
    TransactionKind,
};
use std::env;
use std::fs;
use std::io;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        return Err(IngestError::MissingArgument);
    }

    let input_path = &args[1];
    let bank = &args[2];
    let kind: TransactionKind = args[3].parse()?;
    let db_path = args.get(4);

    let format = FileFormat::from_file_name(input_path);
    let bytes = fs::read(input_path)?;

    let registry = SchemaRegistry::builtin();
    let batch = process_bytes(&bytes, format, bank, kind, &registry)?;

    match db_path {
        Some(path) => {
            let mut store = SqliteStore::open(path)?;
            let written = persist_batch(&batch, &mut store)?;
            println!("Persisted {} {} records to {}", written, kind, path);
        }
        None => {
            let stdout = io::stdout();
            let handle = stdout.lock();
            batch.write_csv(kind, handle)?;
        }
    }

    Ok(())
}
