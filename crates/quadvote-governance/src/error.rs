use quadvote_crypto::AccountKind;
use quadvote_storage::StorageError;
use quadvote_types::Address;
use thiserror::Error;

/// Errors that can occur in governance operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GovernanceError {
    #[error("Account already exists: {0}")]
    AlreadyExists(Address),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid vote type: {0}")]
    InvalidVoteType(i64),

    #[error("Already voted: {voter} on {proposal}")]
    AlreadyVoted { voter: Address, proposal: Address },

    #[error("No credential balance for {holder} (credential {credential})")]
    InsufficientBalanceAccount { holder: Address, credential: Address },

    #[error("Arithmetic overflow: {0}")]
    Overflow(&'static str),

    #[error("Write conflict persisted after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error("DAO not found: {0}")]
    DaoNotFound(Address),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(Address),

    #[error("Proposal {proposal} does not belong to DAO {dao}")]
    ProposalDaoMismatch { proposal: Address, dao: Address },

    #[error("Name too long: {len} bytes (max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Metadata too long: {len} bytes (max {max})")]
    MetadataTooLong { len: usize, max: usize },

    #[error("Voter {0} has zero credits")]
    ZeroCredits(Address),

    #[error("Account {address} does not hold a {expected} record")]
    AccountKindMismatch {
        address: Address,
        expected: &'static str,
    },

    #[error("Balance oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl GovernanceError {
    pub(crate) fn kind_mismatch(address: Address, expected: AccountKind) -> Self {
        GovernanceError::AccountKindMismatch {
            address,
            expected: expected.name(),
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GovernanceError::Conflict { .. } | GovernanceError::OracleUnavailable(_) => true,
            GovernanceError::Storage(e) => matches!(e, StorageError::Io(_)),
            _ => false,
        }
    }

    /// Stable identifier for this error, used by API layers.
    pub fn code(&self) -> &'static str {
        match self {
            GovernanceError::AlreadyExists(_) => "already_exists",
            GovernanceError::Unauthorized(_) => "unauthorized",
            GovernanceError::InvalidVoteType(_) => "invalid_vote_type",
            GovernanceError::AlreadyVoted { .. } => "already_voted",
            GovernanceError::InsufficientBalanceAccount { .. } => "insufficient_balance_account",
            GovernanceError::Overflow(_) => "overflow",
            GovernanceError::Conflict { .. } => "conflict",
            GovernanceError::DaoNotFound(_) => "dao_not_found",
            GovernanceError::ProposalNotFound(_) => "proposal_not_found",
            GovernanceError::ProposalDaoMismatch { .. } => "proposal_dao_mismatch",
            GovernanceError::NameTooLong { .. } => "name_too_long",
            GovernanceError::InvalidName(_) => "invalid_name",
            GovernanceError::MetadataTooLong { .. } => "metadata_too_long",
            GovernanceError::ZeroCredits(_) => "zero_credits",
            GovernanceError::AccountKindMismatch { .. } => "account_kind_mismatch",
            GovernanceError::OracleUnavailable(_) => "oracle_unavailable",
            GovernanceError::InvalidConfig(_) => "invalid_config",
            GovernanceError::Storage(_) => "storage",
        }
    }
}
