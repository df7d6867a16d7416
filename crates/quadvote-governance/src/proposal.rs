//! Proposal ledger.
//!
//! Proposals are numbered per DAO. Creating one commits the DAO counter
//! increment and the new proposal record in a single batch, so an index is
//! handed out exactly once even when creators race.

use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use crate::registry::DaoRegistry;
use crate::retry::retry_on_conflict;
use crate::state::{load, LedgerRecord, Proposal, Versioned, VoteType};
use quadvote_crypto::AccountDeriver;
use quadvote_storage::{AccountStore, WriteBatch};
use quadvote_types::Address;
use std::sync::Arc;

impl Proposal {
    /// Add `credits` to the tally matching `vote_type`.
    pub fn apply_vote(&mut self, vote_type: VoteType, credits: u64) -> Result<(), GovernanceError> {
        let tally = match vote_type {
            VoteType::Yes => &mut self.yes_vote_count,
            VoteType::No => &mut self.no_vote_count,
        };
        *tally = tally
            .checked_add(credits)
            .ok_or(GovernanceError::Overflow("vote tally"))?;
        Ok(())
    }

    pub fn total_credits(&self) -> u128 {
        self.yes_vote_count as u128 + self.no_vote_count as u128
    }
}

/// Creates and reads proposals.
#[derive(Clone)]
pub struct ProposalLedger {
    store: Arc<dyn AccountStore>,
    deriver: AccountDeriver,
    config: Arc<GovernanceConfig>,
    registry: DaoRegistry,
}

impl ProposalLedger {
    pub fn new(
        store: Arc<dyn AccountStore>,
        deriver: AccountDeriver,
        config: Arc<GovernanceConfig>,
        registry: DaoRegistry,
    ) -> Self {
        Self {
            store,
            deriver,
            config,
            registry,
        }
    }

    pub fn proposal_address(&self, dao: &Address, sequence_index: u64) -> Address {
        self.deriver.proposal_address(dao, sequence_index)
    }

    /// Open a new proposal under `dao`. Only the DAO authority may do this.
    pub fn initialize_proposal(
        &self,
        dao: &Address,
        creator: Address,
        metadata: &str,
    ) -> Result<(Address, Proposal), GovernanceError> {
        if metadata.len() > self.config.max_metadata_len {
            return Err(GovernanceError::MetadataTooLong {
                len: metadata.len(),
                max: self.config.max_metadata_len,
            });
        }

        let (address, proposal) =
            retry_on_conflict("initialize_proposal", self.config.max_commit_attempts, || {
                let slot = self.registry.next_sequence(dao)?;
                if slot.dao.authority != creator {
                    return Err(GovernanceError::Unauthorized(format!(
                        "{creator} is not the authority of DAO {dao}"
                    )));
                }

                let address = self.proposal_address(dao, slot.index);
                let proposal = Proposal {
                    dao: *dao,
                    metadata: metadata.to_string(),
                    authority: creator,
                    sequence_index: slot.index,
                    yes_vote_count: 0,
                    no_vote_count: 0,
                };

                let mut batch = WriteBatch::new();
                batch
                    .push(slot.into_write())
                    .create(address, proposal.encode()?);
                self.store.commit(batch)?;
                Ok((address, proposal))
            })?;

        tracing::info!(
            %address,
            %dao,
            sequence_index = proposal.sequence_index,
            "Proposal created"
        );
        Ok((address, proposal))
    }

    pub fn get_proposal(&self, address: &Address) -> Result<Proposal, GovernanceError> {
        self.load_proposal(address).map(|v| v.record)
    }

    pub(crate) fn load_proposal(
        &self,
        address: &Address,
    ) -> Result<Versioned<Proposal>, GovernanceError> {
        load(self.store.as_ref(), address)?.ok_or(GovernanceError::ProposalNotFound(*address))
    }

    /// All proposals of `dao`, in sequence order.
    pub fn proposals(&self, dao: &Address) -> Result<Vec<(Address, Proposal)>, GovernanceError> {
        let count = self.registry.get_dao(dao)?.proposal_count;
        (0..count)
            .map(|index| {
                let address = self.proposal_address(dao, index);
                self.get_proposal(&address).map(|p| (address, p))
            })
            .collect()
    }
}
