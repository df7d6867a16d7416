//! quadvote Crypto - Hashing and address derivation.
//!
//! This crate provides:
//! - Blake3 hashing with domain separation
//! - Deterministic account address derivation for DAO, proposal and vote records

pub mod hash;
pub mod derive;

pub use hash::{hash_with_domain, IncrementalHasher};
pub use derive::{AccountDeriver, AccountKind, DEFAULT_LEDGER_ID};
