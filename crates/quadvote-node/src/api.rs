//! Request and response types for the governance operations.
//!
//! `caller` is never part of a request body: it is the identity the
//! embedding transport has already authenticated.

use quadvote_governance::{Dao, GovernanceError, Proposal, Vote};
use quadvote_types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeDaoRequest {
    pub name: String,
    /// Falls back to the node's default credential when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeDaoResponse {
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeProposalRequest {
    pub dao: Address,
    pub metadata: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeProposalResponse {
    pub address: Address,
    pub sequence_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVoteRequest {
    pub dao: Address,
    pub proposal: Address,
    /// 0 = no, 1 = yes. Any other integer is rejected as `invalid_vote_type`.
    pub vote_type: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVoteResponse {
    pub address: Address,
    pub credits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDaoRequest {
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProposalRequest {
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVoteRequest {
    pub voter: Address,
    pub proposal: Address,
}

/// A request addressed by method name, as carried in a JSON envelope:
/// `{"method": "cast_vote", "params": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum Request {
    InitializeDao(InitializeDaoRequest),
    InitializeProposal(InitializeProposalRequest),
    CastVote(CastVoteRequest),
    GetDao(GetDaoRequest),
    GetProposal(GetProposalRequest),
    GetVote(GetVoteRequest),
}

impl Request {
    pub fn method(&self) -> &'static str {
        match self {
            Request::InitializeDao(_) => "initialize_dao",
            Request::InitializeProposal(_) => "initialize_proposal",
            Request::CastVote(_) => "cast_vote",
            Request::GetDao(_) => "get_dao",
            Request::GetProposal(_) => "get_proposal",
            Request::GetVote(_) => "get_vote",
        }
    }
}

/// Successful result of a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    InitializeDao(InitializeDaoResponse),
    InitializeProposal(InitializeProposalResponse),
    CastVote(CastVoteResponse),
    Dao(Dao),
    Proposal(Proposal),
    Vote(Option<Vote>),
}

/// Serializable error returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Stable machine-readable identifier
    pub code: String,
    pub message: String,
    /// Whether resubmitting the same request may succeed
    pub transient: bool,
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: "invalid_request".to_string(),
            message: message.into(),
            transient: false,
        }
    }
}

impl From<GovernanceError> for ApiError {
    fn from(err: GovernanceError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            transient: err.is_transient(),
        }
    }
}
