//! Write batches - groups of record writes committed all-or-nothing.

use crate::error::StorageError;
use crate::StoredAccount;
use quadvote_types::Address;
use std::collections::{HashMap, HashSet};

/// A single write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Create a record; fails if the address is occupied.
    Create { address: Address, data: Vec<u8> },
    /// Replace a record's data; fails unless its version is `expected_version`.
    Update {
        address: Address,
        data: Vec<u8>,
        expected_version: u64,
    },
}

impl WriteOp {
    pub fn address(&self) -> &Address {
        match self {
            WriteOp::Create { address, .. } | WriteOp::Update { address, .. } => address,
        }
    }
}

/// Ordered set of writes. Validation reports the first failing op in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, address: Address, data: Vec<u8>) -> &mut Self {
        self.ops.push(WriteOp::Create { address, data });
        self
    }

    pub fn update(&mut self, address: Address, data: Vec<u8>, expected_version: u64) -> &mut Self {
        self.ops.push(WriteOp::Update {
            address,
            data,
            expected_version,
        });
        self
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl From<WriteOp> for WriteBatch {
    fn from(op: WriteOp) -> Self {
        Self { ops: vec![op] }
    }
}

/// Previous state of every address a batch touched, used to roll back.
pub(crate) type Undo = Vec<(Address, Option<StoredAccount>)>;

/// Validate `batch` against `accounts` and apply it.
///
/// Nothing is written unless every op validates. The returned undo log
/// restores the map to its prior state.
pub(crate) fn apply_batch(
    accounts: &mut HashMap<Address, StoredAccount>,
    batch: WriteBatch,
) -> Result<Undo, StorageError> {
    let mut seen = HashSet::with_capacity(batch.len());
    for op in batch.ops() {
        if !seen.insert(*op.address()) {
            return Err(StorageError::InvalidBatch(format!(
                "address {} written twice",
                op.address()
            )));
        }
        match op {
            WriteOp::Create { address, .. } => {
                if accounts.contains_key(address) {
                    return Err(StorageError::AlreadyExists(*address));
                }
            }
            WriteOp::Update {
                address,
                expected_version,
                ..
            } => match accounts.get(address) {
                None => return Err(StorageError::NotFound(*address)),
                Some(current) if current.version != *expected_version => {
                    return Err(StorageError::Conflict {
                        address: *address,
                        expected: *expected_version,
                        actual: current.version,
                    });
                }
                Some(_) => {}
            },
        }
    }

    let mut undo = Vec::with_capacity(batch.len());
    for op in batch.ops {
        match op {
            WriteOp::Create { address, data } => {
                undo.push((address, None));
                accounts.insert(address, StoredAccount { data, version: 1 });
            }
            WriteOp::Update {
                address,
                data,
                expected_version,
            } => {
                let previous = accounts.insert(
                    address,
                    StoredAccount {
                        data,
                        version: expected_version + 1,
                    },
                );
                undo.push((address, previous));
            }
        }
    }
    Ok(undo)
}

/// Reverse an applied batch.
pub(crate) fn rollback(accounts: &mut HashMap<Address, StoredAccount>, undo: Undo) {
    for (address, previous) in undo.into_iter().rev() {
        match previous {
            Some(account) => {
                accounts.insert(address, account);
            }
            None => {
                accounts.remove(&address);
            }
        }
    }
}
