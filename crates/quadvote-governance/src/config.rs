//! Governance configuration.

use crate::error::GovernanceError;
use quadvote_crypto::DEFAULT_LEDGER_ID;
use serde::{Deserialize, Serialize};

/// Hard upper bound on DAO name length in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Hard upper bound on proposal metadata length in bytes.
pub const MAX_METADATA_LEN: usize = 200;

/// Tunables for the governance ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Namespace for derived addresses. Ledgers with different ids never
    /// alias each other's records.
    pub ledger_id: String,
    /// Commits attempted before an optimistic write gives up with `Conflict`.
    pub max_commit_attempts: u32,
    /// Record votes worth zero credits instead of rejecting them.
    pub allow_zero_credit_votes: bool,
    pub max_name_len: usize,
    pub max_metadata_len: usize,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            ledger_id: DEFAULT_LEDGER_ID.to_string(),
            max_commit_attempts: 32,
            allow_zero_credit_votes: true,
            max_name_len: MAX_NAME_LEN,
            max_metadata_len: MAX_METADATA_LEN,
        }
    }
}

impl GovernanceConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.ledger_id.is_empty() {
            return Err(GovernanceError::InvalidConfig("ledger_id must not be empty".into()));
        }
        if self.max_commit_attempts == 0 {
            return Err(GovernanceError::InvalidConfig(
                "max_commit_attempts must be at least 1".into(),
            ));
        }
        if self.max_name_len == 0 || self.max_name_len > MAX_NAME_LEN {
            return Err(GovernanceError::InvalidConfig(format!(
                "max_name_len must be in 1..={MAX_NAME_LEN}"
            )));
        }
        if self.max_metadata_len > MAX_METADATA_LEN {
            return Err(GovernanceError::InvalidConfig(format!(
                "max_metadata_len must be at most {MAX_METADATA_LEN}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GovernanceConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.allow_zero_credit_votes);
        assert_eq!(config.max_name_len, 32);
        assert_eq!(config.max_metadata_len, 200);
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let config = GovernanceConfig {
            max_commit_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GovernanceError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_limits_above_hard_bounds() {
        let config = GovernanceConfig {
            max_name_len: 33,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GovernanceConfig {
            max_metadata_len: 201,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
