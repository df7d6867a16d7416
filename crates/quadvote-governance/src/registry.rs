//! DAO registry.

use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use crate::state::{load, Dao, LedgerRecord, Versioned};
use quadvote_crypto::AccountDeriver;
use quadvote_storage::{AccountStore, StorageError, WriteOp};
use quadvote_types::Address;
use std::sync::Arc;

/// A reserved proposal index and the DAO write that claims it.
///
/// The increment is only a pending write: it must be committed in the same
/// batch as the proposal it numbers. If another writer claims the index
/// first the commit fails with a version conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSlot {
    /// The DAO as read, before the increment.
    pub dao: Dao,
    pub index: u64,
    write: WriteOp,
}

impl SequenceSlot {
    /// The versioned DAO update that advances `proposal_count`.
    pub fn into_write(self) -> WriteOp {
        self.write
    }
}

/// Creates and reads DAO records.
#[derive(Clone)]
pub struct DaoRegistry {
    store: Arc<dyn AccountStore>,
    deriver: AccountDeriver,
    config: Arc<GovernanceConfig>,
}

impl DaoRegistry {
    pub fn new(
        store: Arc<dyn AccountStore>,
        deriver: AccountDeriver,
        config: Arc<GovernanceConfig>,
    ) -> Self {
        Self {
            store,
            deriver,
            config,
        }
    }

    pub fn dao_address(&self, name: &str, creator: &Address) -> Address {
        self.deriver.dao_address(name, creator)
    }

    /// Create a DAO owned by `creator`.
    ///
    /// The address is derived from the name and creator, so one creator can
    /// register a given name once.
    pub fn initialize_dao(
        &self,
        name: &str,
        creator: Address,
        credential: Address,
    ) -> Result<(Address, Dao), GovernanceError> {
        self.validate_name(name)?;

        let address = self.dao_address(name, &creator);
        let dao = Dao {
            name: name.to_string(),
            authority: creator,
            credential,
            proposal_count: 0,
        };

        self.store
            .create_if_absent(address, dao.encode()?)
            .map_err(|e| match e {
                StorageError::AlreadyExists(a) => GovernanceError::AlreadyExists(a),
                other => other.into(),
            })?;

        tracing::info!(%address, name, authority = %creator, "DAO created");
        Ok((address, dao))
    }

    pub fn get_dao(&self, address: &Address) -> Result<Dao, GovernanceError> {
        self.load_dao(address).map(|v| v.record)
    }

    pub(crate) fn load_dao(&self, address: &Address) -> Result<Versioned<Dao>, GovernanceError> {
        load(self.store.as_ref(), address)?.ok_or(GovernanceError::DaoNotFound(*address))
    }

    /// Reserve the DAO's next proposal index.
    pub fn next_sequence(&self, dao_address: &Address) -> Result<SequenceSlot, GovernanceError> {
        let Versioned { record: dao, version } = self.load_dao(dao_address)?;

        let index = dao.proposal_count;
        let mut next = dao.clone();
        next.proposal_count = index
            .checked_add(1)
            .ok_or(GovernanceError::Overflow("proposal_count"))?;

        Ok(SequenceSlot {
            dao,
            index,
            write: WriteOp::Update {
                address: *dao_address,
                data: next.encode()?,
                expected_version: version,
            },
        })
    }

    fn validate_name(&self, name: &str) -> Result<(), GovernanceError> {
        if name.is_empty() {
            return Err(GovernanceError::InvalidName("name must not be empty".into()));
        }
        if name.chars().any(char::is_control) {
            return Err(GovernanceError::InvalidName(
                "name must not contain control characters".into(),
            ));
        }
        if name.len() > self.config.max_name_len {
            return Err(GovernanceError::NameTooLong {
                len: name.len(),
                max: self.config.max_name_len,
            });
        }
        Ok(())
    }
}
