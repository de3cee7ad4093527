use crate::domain::payment::PaymentStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(String),
    #[error("Payment not found: {0}")]
    RecordNotFound(String),
    #[error("Concurrent modification of {transaction_id} (expected version {expected_version})")]
    ConcurrentModification {
        transaction_id: String,
        expected_version: u64,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Publish error: {0}")]
    PublishError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
