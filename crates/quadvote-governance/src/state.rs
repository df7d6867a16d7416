//! Ledger records and their stored encoding.
//!
//! Each record is stored as `[kind tag] ++ borsh(record)`. The tag is
//! checked on decode so an address holding one kind of record is never
//! misread as another.

use crate::error::GovernanceError;
use borsh::{BorshDeserialize, BorshSerialize};
use quadvote_crypto::AccountKind;
use quadvote_storage::{AccountStore, StorageError};
use quadvote_types::Address;
use serde::{Deserialize, Serialize};

/// A governance organization.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Dao {
    pub name: String,
    /// Creator; the only identity allowed to open proposals.
    pub authority: Address,
    /// Credential whose balance determines voting credits.
    pub credential: Address,
    /// Index the next proposal will receive.
    pub proposal_count: u64,
}

/// A yes/no question under a DAO.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Proposal {
    pub dao: Address,
    pub metadata: String,
    pub authority: Address,
    pub sequence_index: u64,
    pub yes_vote_count: u64,
    pub no_vote_count: u64,
}

/// Direction of a vote.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum VoteType {
    No = 0,
    Yes = 1,
}

impl TryFrom<u8> for VoteType {
    type Error = GovernanceError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(VoteType::No),
            1 => Ok(VoteType::Yes),
            other => Err(GovernanceError::InvalidVoteType(i64::from(other))),
        }
    }
}

impl From<VoteType> for u8 {
    fn from(vote_type: VoteType) -> Self {
        vote_type as u8
    }
}

/// One voter's weighted choice on one proposal. Never modified once written.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Vote {
    pub authority: Address,
    pub proposal: Address,
    pub vote_type: VoteType,
    pub credits: u64,
}

/// A record type that can live at a derived address.
pub trait LedgerRecord: BorshSerialize + BorshDeserialize + Sized {
    const KIND: AccountKind;

    fn encode(&self) -> Result<Vec<u8>, GovernanceError> {
        let mut out = vec![Self::KIND.tag()];
        self.serialize(&mut out)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(out)
    }

    fn decode(address: &Address, bytes: &[u8]) -> Result<Self, GovernanceError> {
        match bytes.split_first() {
            Some((tag, body)) if *tag == Self::KIND.tag() => borsh::from_slice(body)
                .map_err(|e| GovernanceError::from(StorageError::Serialization(e.to_string()))),
            _ => Err(GovernanceError::kind_mismatch(*address, Self::KIND)),
        }
    }
}

impl LedgerRecord for Dao {
    const KIND: AccountKind = AccountKind::Dao;
}

impl LedgerRecord for Proposal {
    const KIND: AccountKind = AccountKind::Proposal;
}

impl LedgerRecord for Vote {
    const KIND: AccountKind = AccountKind::Vote;
}

/// A decoded record together with the store version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub record: T,
    pub version: u64,
}

/// Read and decode the record at `address`, or `None` if nothing is stored.
pub(crate) fn load<T: LedgerRecord>(
    store: &dyn AccountStore,
    address: &Address,
) -> Result<Option<Versioned<T>>, GovernanceError> {
    match store.read(address) {
        Ok(account) => Ok(Some(Versioned {
            record: T::decode(address, &account.data)?,
            version: account.version,
        })),
        Err(StorageError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
