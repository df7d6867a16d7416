//! Vote engine.
//!
//! For each (voter, proposal) pair a vote moves `NoVote -> Voted` exactly
//! once. The vote record lives at an address derived from the pair, so
//! creating it is the test-and-set that rejects double votes. The tally
//! update rides in the same batch at the proposal's read version; a racing
//! voter causes a version conflict and a retry against the fresh tally.

use crate::config::GovernanceConfig;
use crate::credits::credits;
use crate::error::GovernanceError;
use crate::oracle::{BalanceOracle, OracleError};
use crate::proposal::ProposalLedger;
use crate::registry::DaoRegistry;
use crate::retry::retry_on_conflict;
use crate::state::{load, LedgerRecord, Vote, VoteType};
use quadvote_crypto::AccountDeriver;
use quadvote_storage::{AccountStore, StorageError, WriteBatch};
use quadvote_types::Address;
use std::sync::Arc;

/// Records votes and keeps proposal tallies in step with them.
#[derive(Clone)]
pub struct VoteEngine {
    store: Arc<dyn AccountStore>,
    deriver: AccountDeriver,
    config: Arc<GovernanceConfig>,
    registry: DaoRegistry,
    proposals: ProposalLedger,
    oracle: Arc<dyn BalanceOracle>,
}

impl VoteEngine {
    pub fn new(
        store: Arc<dyn AccountStore>,
        deriver: AccountDeriver,
        config: Arc<GovernanceConfig>,
        registry: DaoRegistry,
        proposals: ProposalLedger,
        oracle: Arc<dyn BalanceOracle>,
    ) -> Self {
        Self {
            store,
            deriver,
            config,
            registry,
            proposals,
            oracle,
        }
    }

    pub fn vote_address(&self, voter: &Address, proposal: &Address) -> Address {
        self.deriver.vote_address(voter, proposal)
    }

    /// Cast `voter`'s vote on `proposal` with weight `floor(sqrt(balance))`.
    pub fn cast_vote(
        &self,
        voter: Address,
        dao_address: &Address,
        proposal_address: &Address,
        raw_vote_type: u8,
    ) -> Result<(Address, Vote), GovernanceError> {
        let vote_type = VoteType::try_from(raw_vote_type)?;

        let dao = self.registry.get_dao(dao_address)?;
        let proposal = self.proposals.get_proposal(proposal_address)?;
        if proposal.dao != *dao_address {
            return Err(GovernanceError::ProposalDaoMismatch {
                proposal: *proposal_address,
                dao: *dao_address,
            });
        }

        let already_voted = GovernanceError::AlreadyVoted {
            voter,
            proposal: *proposal_address,
        };
        let vote_address = self.vote_address(&voter, proposal_address);
        if self.store.exists(&vote_address)? {
            return Err(already_voted);
        }

        let balance = self
            .oracle
            .get_balance(&voter, &dao.credential)
            .map_err(|e| match e {
                OracleError::NotFound { holder, credential } => {
                    GovernanceError::InsufficientBalanceAccount { holder, credential }
                }
                OracleError::Unavailable(msg) => GovernanceError::OracleUnavailable(msg),
            })?;

        let credits = credits(balance);
        if credits == 0 && !self.config.allow_zero_credit_votes {
            return Err(GovernanceError::ZeroCredits(voter));
        }

        let vote = Vote {
            authority: voter,
            proposal: *proposal_address,
            vote_type,
            credits,
        };
        let vote_bytes = vote.encode()?;

        retry_on_conflict("cast_vote", self.config.max_commit_attempts, || {
            let current = self.proposals.load_proposal(proposal_address)?;
            let mut tallied = current.record;
            tallied.apply_vote(vote_type, credits)?;

            let mut batch = WriteBatch::new();
            batch
                .create(vote_address, vote_bytes.clone())
                .update(*proposal_address, tallied.encode()?, current.version);

            match self.store.commit(batch) {
                Ok(()) => Ok(()),
                Err(StorageError::AlreadyExists(a)) if a == vote_address => {
                    Err(already_voted.clone())
                }
                Err(e) => Err(e.into()),
            }
        })?;

        tracing::info!(
            %voter,
            proposal = %proposal_address,
            ?vote_type,
            credits,
            "Vote cast"
        );
        Ok((vote_address, vote))
    }

    /// The vote `voter` cast on `proposal`, if any.
    pub fn get_vote(
        &self,
        voter: &Address,
        proposal: &Address,
    ) -> Result<Option<Vote>, GovernanceError> {
        let address = self.vote_address(voter, proposal);
        Ok(load(self.store.as_ref(), &address)?.map(|v| v.record))
    }

    /// Credits `voter` would receive in `dao` right now.
    pub fn credits_for(
        &self,
        voter: &Address,
        dao_address: &Address,
    ) -> Result<u64, GovernanceError> {
        let dao = self.registry.get_dao(dao_address)?;
        match self.oracle.get_balance(voter, &dao.credential) {
            Ok(balance) => Ok(credits(balance)),
            Err(OracleError::NotFound { holder, credential }) => {
                Err(GovernanceError::InsufficientBalanceAccount { holder, credential })
            }
            Err(OracleError::Unavailable(msg)) => Err(GovernanceError::OracleUnavailable(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::MemoryBalanceOracle;
    use quadvote_storage::MemoryStore;

    struct Fixture {
        store: Arc<dyn AccountStore>,
        engine: VoteEngine,
        proposals: ProposalLedger,
        oracle: Arc<MemoryBalanceOracle>,
        dao: Address,
        proposal: Address,
    }

    const CREDENTIAL: Address = Address::from_bytes([9u8; 32]);

    fn identity(seed: u8) -> Address {
        Address::from_bytes([seed; 32])
    }

    fn fixture(config: GovernanceConfig) -> Fixture {
        let store: Arc<dyn AccountStore> = Arc::new(MemoryStore::new());
        let deriver = AccountDeriver::default();
        let config = Arc::new(config);
        let oracle = Arc::new(MemoryBalanceOracle::new());
        let registry = DaoRegistry::new(store.clone(), deriver, config.clone());
        let proposals =
            ProposalLedger::new(store.clone(), deriver, config.clone(), registry.clone());
        let engine = VoteEngine::new(
            store.clone(),
            deriver,
            config,
            registry.clone(),
            proposals.clone(),
            oracle.clone(),
        );

        let (dao, _) = registry
            .initialize_dao("Test DAO", identity(1), CREDENTIAL)
            .unwrap();
        let (proposal, _) = proposals
            .initialize_proposal(&dao, identity(1), "Should we?")
            .unwrap();

        Fixture {
            store,
            engine,
            proposals,
            oracle,
            dao,
            proposal,
        }
    }

    #[test]
    fn test_yes_vote_adds_credits() {
        let f = fixture(GovernanceConfig::default());
        f.oracle.set_balance(identity(2), CREDENTIAL, 100);

        let (address, vote) = f.engine.cast_vote(identity(2), &f.dao, &f.proposal, 1).unwrap();
        assert_eq!(vote.credits, 10);
        assert_eq!(vote.vote_type, VoteType::Yes);
        assert_eq!(address, f.engine.vote_address(&identity(2), &f.proposal));

        let proposal = f.proposals.get_proposal(&f.proposal).unwrap();
        assert_eq!(proposal.yes_vote_count, 10);
        assert_eq!(proposal.no_vote_count, 0);
        assert_eq!(f.engine.get_vote(&identity(2), &f.proposal).unwrap(), Some(vote));
    }

    #[test]
    fn test_no_vote_adds_to_no_tally() {
        let f = fixture(GovernanceConfig::default());
        f.oracle.set_balance(identity(2), CREDENTIAL, 25);
        f.engine.cast_vote(identity(2), &f.dao, &f.proposal, 0).unwrap();

        let proposal = f.proposals.get_proposal(&f.proposal).unwrap();
        assert_eq!(proposal.yes_vote_count, 0);
        assert_eq!(proposal.no_vote_count, 5);
    }

    #[test]
    fn test_invalid_vote_type_touches_nothing() {
        let f = fixture(GovernanceConfig::default());
        f.oracle.set_balance(identity(2), CREDENTIAL, 100);

        assert_eq!(
            f.engine.cast_vote(identity(2), &f.dao, &f.proposal, 2),
            Err(GovernanceError::InvalidVoteType(2))
        );
        assert_eq!(f.engine.get_vote(&identity(2), &f.proposal).unwrap(), None);
        let proposal = f.proposals.get_proposal(&f.proposal).unwrap();
        assert_eq!(proposal.total_credits(), 0);
    }

    #[test]
    fn test_vote_type_checked_before_lookups() {
        let f = fixture(GovernanceConfig::default());
        assert_eq!(
            f.engine.cast_vote(identity(2), &identity(70), &identity(71), 2),
            Err(GovernanceError::InvalidVoteType(2))
        );
    }

    #[test]
    fn test_tally_overflow_leaves_no_vote() {
        let f = fixture(GovernanceConfig::default());
        let current = f.proposals.load_proposal(&f.proposal).unwrap();
        let mut saturated = current.record;
        saturated.yes_vote_count = u64::MAX;
        f.store
            .update(f.proposal, saturated.encode().unwrap(), current.version)
            .unwrap();
        f.oracle.set_balance(identity(2), CREDENTIAL, 100);

        assert_eq!(
            f.engine.cast_vote(identity(2), &f.dao, &f.proposal, 1),
            Err(GovernanceError::Overflow("vote tally"))
        );
        assert_eq!(f.engine.get_vote(&identity(2), &f.proposal).unwrap(), None);
        let proposal = f.proposals.get_proposal(&f.proposal).unwrap();
        assert_eq!(proposal.yes_vote_count, u64::MAX);
        assert_eq!(proposal.no_vote_count, 0);
    }

    #[test]
    fn test_double_vote_rejected() {
        let f = fixture(GovernanceConfig::default());
        f.oracle.set_balance(identity(2), CREDENTIAL, 16);
        f.engine.cast_vote(identity(2), &f.dao, &f.proposal, 1).unwrap();

        f.oracle.set_balance(identity(2), CREDENTIAL, 10_000);
        assert_eq!(
            f.engine.cast_vote(identity(2), &f.dao, &f.proposal, 0),
            Err(GovernanceError::AlreadyVoted {
                voter: identity(2),
                proposal: f.proposal,
            })
        );

        let proposal = f.proposals.get_proposal(&f.proposal).unwrap();
        assert_eq!(proposal.yes_vote_count, 4);
        assert_eq!(proposal.no_vote_count, 0);
    }

    #[test]
    fn test_missing_balance_account() {
        let f = fixture(GovernanceConfig::default());
        assert_eq!(
            f.engine.cast_vote(identity(3), &f.dao, &f.proposal, 1),
            Err(GovernanceError::InsufficientBalanceAccount {
                holder: identity(3),
                credential: CREDENTIAL,
            })
        );
        assert_eq!(f.engine.get_vote(&identity(3), &f.proposal).unwrap(), None);
    }

    #[test]
    fn test_zero_credit_votes() {
        let f = fixture(GovernanceConfig::default());
        f.oracle.set_balance(identity(2), CREDENTIAL, 0);
        let (_, vote) = f.engine.cast_vote(identity(2), &f.dao, &f.proposal, 1).unwrap();
        assert_eq!(vote.credits, 0);

        let strict = fixture(GovernanceConfig {
            allow_zero_credit_votes: false,
            ..Default::default()
        });
        strict.oracle.set_balance(identity(2), CREDENTIAL, 0);
        assert_eq!(
            strict.engine.cast_vote(identity(2), &strict.dao, &strict.proposal, 1),
            Err(GovernanceError::ZeroCredits(identity(2)))
        );
        assert_eq!(strict.engine.get_vote(&identity(2), &strict.proposal).unwrap(), None);
    }

    #[test]
    fn test_proposal_must_belong_to_dao() {
        let f = fixture(GovernanceConfig::default());
        f.oracle.set_balance(identity(2), CREDENTIAL, 100);
        let other_dao = f
            .engine
            .registry
            .initialize_dao("Other DAO", identity(1), CREDENTIAL)
            .unwrap()
            .0;

        assert_eq!(
            f.engine.cast_vote(identity(2), &other_dao, &f.proposal, 1),
            Err(GovernanceError::ProposalDaoMismatch {
                proposal: f.proposal,
                dao: other_dao,
            })
        );
    }

    #[test]
    fn test_unknown_proposal() {
        let f = fixture(GovernanceConfig::default());
        assert_eq!(
            f.engine.cast_vote(identity(2), &f.dao, &identity(77), 1),
            Err(GovernanceError::ProposalNotFound(identity(77)))
        );
    }

    #[test]
    fn test_dao_address_is_not_a_proposal() {
        let f = fixture(GovernanceConfig::default());
        assert!(matches!(
            f.engine.cast_vote(identity(2), &f.dao, &f.dao, 1),
            Err(GovernanceError::AccountKindMismatch { expected: "proposal", .. })
        ));
    }

    #[test]
    fn test_credits_for() {
        let f = fixture(GovernanceConfig::default());
        f.oracle.set_balance(identity(2), CREDENTIAL, 100_000_000_000);
        assert_eq!(f.engine.credits_for(&identity(2), &f.dao).unwrap(), 316_227);
    }
}
