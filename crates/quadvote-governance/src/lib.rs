//! quadvote Governance - Quadratic voting over DAOs and proposals.
//!
//! This crate provides:
//! - DAO registry with per-DAO proposal numbering
//! - Proposal ledger with atomic counter-and-create commits
//! - Vote engine with one vote per (voter, proposal) and credit-weighted tallies
//! - Credit calculation: `floor(sqrt(balance))`
//!
//! All state lives in an [`AccountStore`](quadvote_storage::AccountStore) at
//! derived addresses. Writers never take a ledger-wide lock; concurrent
//! updates are resolved by versioned commits and bounded retries.

pub mod config;
pub mod credits;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod proposal;
pub mod registry;
mod retry;
pub mod state;

pub use config::GovernanceConfig;
pub use credits::{credits, F64_EXACT_BALANCE_LIMIT};
pub use engine::VoteEngine;
pub use error::GovernanceError;
pub use ledger::GovernanceLedger;
pub use oracle::{BalanceOracle, MemoryBalanceOracle, OracleError};
pub use proposal::ProposalLedger;
pub use registry::{DaoRegistry, SequenceSlot};
pub use state::{Dao, LedgerRecord, Proposal, Versioned, Vote, VoteType};
