//! Governance ledger - one handle over registry, proposals and votes.

use crate::config::GovernanceConfig;
use crate::engine::VoteEngine;
use crate::error::GovernanceError;
use crate::oracle::BalanceOracle;
use crate::proposal::ProposalLedger;
use crate::registry::DaoRegistry;
use crate::state::{Dao, Proposal, Vote};
use quadvote_crypto::AccountDeriver;
use quadvote_storage::AccountStore;
use quadvote_types::Address;
use std::sync::Arc;

/// Shared, thread-safe entry point to the governance ledger.
///
/// Cloning is cheap; clones share the same store, oracle and config.
#[derive(Clone)]
pub struct GovernanceLedger {
    config: Arc<GovernanceConfig>,
    registry: DaoRegistry,
    proposals: ProposalLedger,
    engine: VoteEngine,
}

impl GovernanceLedger {
    pub fn new(
        store: Arc<dyn AccountStore>,
        oracle: Arc<dyn BalanceOracle>,
        config: GovernanceConfig,
    ) -> Result<Self, GovernanceError> {
        config.validate()?;

        let deriver = AccountDeriver::new(&config.ledger_id);
        let config = Arc::new(config);
        let registry = DaoRegistry::new(store.clone(), deriver, config.clone());
        let proposals =
            ProposalLedger::new(store.clone(), deriver, config.clone(), registry.clone());
        let engine = VoteEngine::new(
            store,
            deriver,
            config.clone(),
            registry.clone(),
            proposals.clone(),
            oracle,
        );

        tracing::debug!(ledger_id = %config.ledger_id, "Governance ledger ready");
        Ok(Self {
            config,
            registry,
            proposals,
            engine,
        })
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn registry(&self) -> &DaoRegistry {
        &self.registry
    }

    pub fn proposal_ledger(&self) -> &ProposalLedger {
        &self.proposals
    }

    pub fn engine(&self) -> &VoteEngine {
        &self.engine
    }

    pub fn initialize_dao(
        &self,
        name: &str,
        creator: Address,
        credential: Address,
    ) -> Result<(Address, Dao), GovernanceError> {
        self.registry.initialize_dao(name, creator, credential)
    }

    pub fn get_dao(&self, address: &Address) -> Result<Dao, GovernanceError> {
        self.registry.get_dao(address)
    }

    pub fn initialize_proposal(
        &self,
        dao: &Address,
        creator: Address,
        metadata: &str,
    ) -> Result<(Address, Proposal), GovernanceError> {
        self.proposals.initialize_proposal(dao, creator, metadata)
    }

    pub fn get_proposal(&self, address: &Address) -> Result<Proposal, GovernanceError> {
        self.proposals.get_proposal(address)
    }

    pub fn proposals(&self, dao: &Address) -> Result<Vec<(Address, Proposal)>, GovernanceError> {
        self.proposals.proposals(dao)
    }

    pub fn cast_vote(
        &self,
        voter: Address,
        dao: &Address,
        proposal: &Address,
        raw_vote_type: u8,
    ) -> Result<(Address, Vote), GovernanceError> {
        self.engine.cast_vote(voter, dao, proposal, raw_vote_type)
    }

    pub fn get_vote(
        &self,
        voter: &Address,
        proposal: &Address,
    ) -> Result<Option<Vote>, GovernanceError> {
        self.engine.get_vote(voter, proposal)
    }
}
