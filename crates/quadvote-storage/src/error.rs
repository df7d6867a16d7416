use quadvote_types::Address;
use thiserror::Error;

/// Errors that can occur in storage operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    #[error("Account not found: {0}")]
    NotFound(Address),

    #[error("Account already exists: {0}")]
    AlreadyExists(Address),

    #[error("Version conflict on {address}: expected {expected}, found {actual}")]
    Conflict {
        address: Address,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl StorageError {
    /// Conflicts and I/O failures may succeed on retry; everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Conflict { .. } | StorageError::Io(_))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}
