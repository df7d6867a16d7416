//! quadvote Node - embeddable host for the governance ledger.
//!
//! Wires configuration, storage, logging and metrics around a
//! [`GovernanceLedger`](quadvote_governance::GovernanceLedger) and exposes
//! the ledger operations as serde request/response types. Transport and
//! caller authentication belong to the embedder.

pub mod api;
pub mod config;
pub mod metrics;
pub mod node;
pub mod telemetry;

pub use api::{ApiError, Request, Response};
pub use config::{NodeConfig, StorageBackend};
pub use metrics::Metrics;
pub use node::GovernanceNode;
