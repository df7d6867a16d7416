//! In-memory account store.

use crate::batch::{apply_batch, WriteBatch};
use crate::{AccountStore, StorageError, StoredAccount};
use parking_lot::RwLock;
use quadvote_types::Address;
use std::collections::HashMap;

/// Thread-safe in-memory store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<Address, StoredAccount>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn read(&self, address: &Address) -> Result<StoredAccount, StorageError> {
        self.accounts
            .read()
            .get(address)
            .cloned()
            .ok_or(StorageError::NotFound(*address))
    }

    fn exists(&self, address: &Address) -> Result<bool, StorageError> {
        Ok(self.accounts.read().contains_key(address))
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let mut accounts = self.accounts.write();
        apply_batch(&mut accounts, batch).map(|_| ())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.accounts.read().len())
    }
}
