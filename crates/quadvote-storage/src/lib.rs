//! quadvote Storage - Versioned account storage.
//!
//! Records live at 32-byte addresses and carry a version that starts at 1
//! and is bumped on every write. Writers commit a [`WriteBatch`] of creates
//! and versioned updates; the batch is validated and applied as one unit,
//! which gives callers create-if-absent and optimistic concurrency without
//! holding any lock of their own.

pub mod batch;
pub mod error;
pub mod file_store;
pub mod memory;

pub use batch::{WriteBatch, WriteOp};
pub use error::StorageError;
pub use file_store::FileStore;
pub use memory::MemoryStore;

use quadvote_types::Address;

/// A stored record and its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub data: Vec<u8>,
    pub version: u64,
}

/// Storage backend for ledger accounts.
///
/// Implementations must apply each [`WriteBatch`] atomically with respect to
/// every other `commit` and `read` on the same store.
pub trait AccountStore: Send + Sync {
    /// Read the record at `address`.
    fn read(&self, address: &Address) -> Result<StoredAccount, StorageError>;

    /// Check whether a record exists at `address`.
    fn exists(&self, address: &Address) -> Result<bool, StorageError>;

    /// Validate and apply every op in `batch`, or none of them.
    fn commit(&self, batch: WriteBatch) -> Result<(), StorageError>;

    /// Number of stored records.
    fn len(&self) -> Result<usize, StorageError>;

    fn is_empty(&self) -> Result<bool, StorageError> {
        self.len().map(|n| n == 0)
    }

    /// Create a record, failing with `AlreadyExists` if the address is taken.
    fn create_if_absent(&self, address: Address, data: Vec<u8>) -> Result<(), StorageError> {
        self.commit(WriteOp::Create { address, data }.into())
    }

    /// Overwrite a record, failing with `Conflict` if someone else wrote it
    /// since `expected_version` was read.
    fn update(
        &self,
        address: Address,
        data: Vec<u8>,
        expected_version: u64,
    ) -> Result<(), StorageError> {
        self.commit(
            WriteOp::Update {
                address,
                data,
                expected_version,
            }
            .into(),
        )
    }
}
