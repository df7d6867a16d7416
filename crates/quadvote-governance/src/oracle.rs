//! Balance oracle - read-only view of credential holdings.

use parking_lot::RwLock;
use quadvote_types::Address;
use std::collections::HashMap;
use thiserror::Error;

/// Errors reported by a balance oracle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The holder has no account for this credential.
    #[error("No balance account for {holder} (credential {credential})")]
    NotFound { holder: Address, credential: Address },

    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
}

/// Reports how much of a credential a holder owns.
pub trait BalanceOracle: Send + Sync {
    fn get_balance(&self, holder: &Address, credential: &Address) -> Result<u64, OracleError>;
}

/// In-memory oracle for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryBalanceOracle {
    balances: RwLock<HashMap<(Address, Address), u64>>,
}

impl MemoryBalanceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or open) `holder`'s balance of `credential`.
    pub fn set_balance(&self, holder: Address, credential: Address, amount: u64) {
        self.balances.write().insert((holder, credential), amount);
    }

    /// Close `holder`'s balance account for `credential`.
    pub fn remove(&self, holder: &Address, credential: &Address) -> Option<u64> {
        self.balances.write().remove(&(*holder, *credential))
    }
}

impl BalanceOracle for MemoryBalanceOracle {
    fn get_balance(&self, holder: &Address, credential: &Address) -> Result<u64, OracleError> {
        self.balances
            .read()
            .get(&(*holder, *credential))
            .copied()
            .ok_or(OracleError::NotFound {
                holder: *holder,
                credential: *credential,
            })
    }
}
