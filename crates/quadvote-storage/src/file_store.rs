//! File-backed account store.
//!
//! The full account map is kept in memory and rewritten to
//! `<dir>/accounts.json` after every successful commit. The file is replaced
//! by writing a sibling temp file and renaming it over the old one, so a
//! crash mid-write leaves the previous snapshot intact.

use crate::batch::{apply_batch, rollback, WriteBatch};
use crate::{AccountStore, StorageError, StoredAccount};
use parking_lot::RwLock;
use quadvote_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

const ACCOUNTS_FILE: &str = "accounts.json";

/// On-disk form of a stored account.
#[derive(Debug, Serialize, Deserialize)]
struct AccountRecord {
    version: u64,
    /// hex encoded
    data: String,
}

/// Account store persisted as a JSON snapshot.
pub struct FileStore {
    accounts: RwLock<HashMap<Address, StoredAccount>>,
    path: PathBuf,
}

impl FileStore {
    /// Open (or create) a store in `dir`, loading any existing snapshot.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        let store = Self {
            accounts: RwLock::new(HashMap::new()),
            path: dir.to_path_buf(),
        };
        store.load()?;
        Ok(store)
    }

    /// Directory holding the snapshot.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn accounts_file(&self) -> PathBuf {
        self.path.join(ACCOUNTS_FILE)
    }

    fn load(&self) -> Result<(), StorageError> {
        let file = self.accounts_file();
        if !file.exists() {
            tracing::debug!("No account snapshot at {:?}, starting empty", file);
            return Ok(());
        }

        let content = fs::read_to_string(&file)?;
        let records: BTreeMap<String, AccountRecord> = serde_json::from_str(&content)?;

        let mut loaded = HashMap::with_capacity(records.len());
        for (key, record) in records {
            let address: Address = format!("0x{key}")
                .parse()
                .map_err(|e| StorageError::Serialization(format!("bad address {key}: {e}")))?;
            let data = hex::decode(&record.data)
                .map_err(|e| StorageError::Serialization(format!("bad data for {key}: {e}")))?;
            loaded.insert(
                address,
                StoredAccount {
                    data,
                    version: record.version,
                },
            );
        }

        let count = loaded.len();
        *self.accounts.write() = loaded;
        tracing::info!("Loaded {} accounts from disk", count);
        Ok(())
    }

    /// Write the snapshot. Called with the write lock held.
    fn persist(&self, accounts: &HashMap<Address, StoredAccount>) -> Result<(), StorageError> {
        let records: BTreeMap<String, AccountRecord> = accounts
            .iter()
            .map(|(address, account)| {
                (
                    address.to_hex(),
                    AccountRecord {
                        version: account.version,
                        data: hex::encode(&account.data),
                    },
                )
            })
            .collect();

        let json = serde_json::to_string_pretty(&records)?;
        let file = self.accounts_file();
        let tmp = file.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &file)?;

        tracing::debug!("Persisted {} accounts to {:?}", records.len(), file);
        Ok(())
    }
}

impl AccountStore for FileStore {
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
        let undo = apply_batch(&mut accounts, batch)?;
        if let Err(e) = self.persist(&accounts) {
            tracing::warn!("Persist failed, rolling back batch: {}", e);
            rollback(&mut accounts, undo);
            return Err(e);
        }
        Ok(())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.accounts.read().len())
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("accounts", &self.accounts.read().len())
            .finish()
    }
}
