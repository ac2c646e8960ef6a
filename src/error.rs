use crate::domain::record::RecordId;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    #[diagnostic(code(ledger::validation))]
    Validation(String),

    #[error("No machine has a positive token count")]
    #[diagnostic(
        code(ledger::empty_batch),
        help("Enter tokens for at least one machine of the selected location.")
    )]
    EmptyBatch,

    #[error("{kind} '{id}' not found")]
    #[diagnostic(code(ledger::not_found))]
    NotFound { kind: &'static str, id: RecordId },

    #[error("Persistence error: {0}")]
    #[diagnostic(
        code(ledger::persistence),
        help("Check storage permissions and connectivity, then retry.")
    )]
    Persistence(String),

    #[error("Settlement only partially saved: {} of {} records written", .written.len(), .written.len() + .failed)]
    #[diagnostic(
        code(ledger::partial_settlement),
        help("The written records were kept. Void them or settle the missing machines again.")
    )]
    PartialSettlement {
        written: Vec<RecordId>,
        failed: usize,
        #[source]
        source: Box<LedgerError>,
    },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ledger::config))]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    #[diagnostic(code(ledger::rocksdb))]
    RocksDB(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
