//! Governance node: storage, ledger and metrics behind the request surface.

use crate::api::{
    ApiError, CastVoteRequest, CastVoteResponse, GetDaoRequest, GetProposalRequest,
    GetVoteRequest, InitializeDaoRequest, InitializeDaoResponse, InitializeProposalRequest,
    InitializeProposalResponse, Request, Response,
};
use crate::config::{NodeConfig, StorageBackend};
use crate::metrics::Metrics;
use quadvote_governance::{BalanceOracle, Dao, GovernanceError, GovernanceLedger, Proposal, Vote};
use quadvote_storage::{AccountStore, FileStore, MemoryStore};
use quadvote_types::Address;
use std::sync::Arc;
use tracing::{info, warn};

/// The quadvote governance node.
///
/// Cheap to share behind an `Arc`; every operation takes `&self` and may be
/// called from any number of threads.
pub struct GovernanceNode {
    config: NodeConfig,
    ledger: GovernanceLedger,
    metrics: Option<Arc<Metrics>>,
}

impl GovernanceNode {
    /// Create a node from validated configuration.
    pub fn new(config: NodeConfig, oracle: Arc<dyn BalanceOracle>) -> anyhow::Result<Self> {
        config.validate()?;
        info!("Initializing quadvote node: {}", config.name);

        let store: Arc<dyn AccountStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => {
                let path = config.storage_path();
                let store = FileStore::open(&path)?;
                info!("Opened ledger at {:?} ({} accounts)", path, store.len()?);
                Arc::new(store)
            }
        };

        let ledger = GovernanceLedger::new(store, oracle, config.governance.clone())?;
        let metrics = if config.metrics.enabled {
            Some(Metrics::new()?)
        } else {
            None
        };

        Ok(Self {
            config,
            ledger,
            metrics,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn ledger(&self) -> &GovernanceLedger {
        &self.ledger
    }

    pub fn metrics(&self) -> Option<&Arc<Metrics>> {
        self.metrics.as_ref()
    }

    pub fn initialize_dao(
        &self,
        caller: Address,
        request: InitializeDaoRequest,
    ) -> Result<InitializeDaoResponse, ApiError> {
        let credential = request
            .credential
            .or(self.config.default_credential)
            .ok_or_else(|| {
                ApiError::invalid_request("no credential given and no default configured")
            });
        let credential = self.observe("initialize_dao", credential)?;

        let result = self.ledger.initialize_dao(&request.name, caller, credential);
        let (address, _) = self.observe("initialize_dao", result.map_err(ApiError::from))?;
        if let Some(m) = &self.metrics {
            m.daos_created.inc();
        }
        Ok(InitializeDaoResponse { address })
    }

    pub fn initialize_proposal(
        &self,
        caller: Address,
        request: InitializeProposalRequest,
    ) -> Result<InitializeProposalResponse, ApiError> {
        let result = self
            .ledger
            .initialize_proposal(&request.dao, caller, &request.metadata);
        let (address, proposal) =
            self.observe("initialize_proposal", result.map_err(ApiError::from))?;
        if let Some(m) = &self.metrics {
            m.proposals_created.inc();
        }
        Ok(InitializeProposalResponse {
            address,
            sequence_index: proposal.sequence_index,
        })
    }

    pub fn cast_vote(
        &self,
        caller: Address,
        request: CastVoteRequest,
    ) -> Result<CastVoteResponse, ApiError> {
        let result = u8::try_from(request.vote_type)
            .map_err(|_| GovernanceError::InvalidVoteType(request.vote_type))
            .and_then(|vote_type| {
                self.ledger
                    .cast_vote(caller, &request.dao, &request.proposal, vote_type)
            });
        let (address, vote) = self.observe("cast_vote", result.map_err(ApiError::from))?;
        if let Some(m) = &self.metrics {
            m.record_vote(vote.credits);
        }
        Ok(CastVoteResponse {
            address,
            credits: vote.credits,
        })
    }

    pub fn get_dao(&self, request: GetDaoRequest) -> Result<Dao, ApiError> {
        let result = self.ledger.get_dao(&request.address);
        self.observe("get_dao", result.map_err(ApiError::from))
    }

    pub fn get_proposal(&self, request: GetProposalRequest) -> Result<Proposal, ApiError> {
        let result = self.ledger.get_proposal(&request.address);
        self.observe("get_proposal", result.map_err(ApiError::from))
    }

    pub fn get_vote(&self, request: GetVoteRequest) -> Result<Option<Vote>, ApiError> {
        let result = self.ledger.get_vote(&request.voter, &request.proposal);
        self.observe("get_vote", result.map_err(ApiError::from))
    }

    /// Dispatch a request on behalf of `caller`.
    pub fn handle(&self, caller: Address, request: Request) -> Result<Response, ApiError> {
        match request {
            Request::InitializeDao(r) => self
                .initialize_dao(caller, r)
                .map(Response::InitializeDao),
            Request::InitializeProposal(r) => self
                .initialize_proposal(caller, r)
                .map(Response::InitializeProposal),
            Request::CastVote(r) => self.cast_vote(caller, r).map(Response::CastVote),
            Request::GetDao(r) => self.get_dao(r).map(Response::Dao),
            Request::GetProposal(r) => self.get_proposal(r).map(Response::Proposal),
            Request::GetVote(r) => self.get_vote(r).map(Response::Vote),
        }
    }

    /// Decode a JSON request envelope, dispatch it, and encode the outcome as
    /// `{"result": ...}` or `{"error": {...}}`.
    pub fn handle_json(&self, caller: Address, body: &str) -> String {
        let outcome = serde_json::from_str::<Request>(body)
            .map_err(|e| ApiError::invalid_request(e.to_string()))
            .and_then(|request| self.handle(caller, request));

        let envelope = match outcome {
            Ok(result) => serde_json::json!({ "result": result }),
            Err(error) => serde_json::json!({ "error": error }),
        };
        envelope.to_string()
    }

    fn observe<T>(&self, operation: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &result {
            warn!(
                operation,
                code = %e.code,
                transient = e.transient,
                "Request rejected: {}",
                e.message
            );
            if let Some(m) = &self.metrics {
                m.record_rejection(operation, &e.code);
            }
        }
        result
    }
}
