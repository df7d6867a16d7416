//! Metrics collection and reporting.
//!
//! Uses Prometheus for metrics collection; [`Metrics::export`] renders the
//! text exposition format for whatever transport the embedder runs.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector.
pub struct Metrics {
    registry: Registry,
    pub daos_created: IntCounter,
    pub proposals_created: IntCounter,
    pub votes_cast: IntCounter,
    /// Sum of credits over all recorded votes
    pub credits_cast: IntCounter,
    /// Failed requests by operation and error code
    pub rejections: IntCounterVec,
}

impl Metrics {
    /// Create new metrics collector.
    pub fn new() -> anyhow::Result<Arc<Self>> {
        let registry = Registry::new();

        let daos_created = IntCounter::new("quadvote_daos_created_total", "Total DAOs created")?;
        registry.register(Box::new(daos_created.clone()))?;

        let proposals_created = IntCounter::new(
            "quadvote_proposals_created_total",
            "Total proposals created",
        )?;
        registry.register(Box::new(proposals_created.clone()))?;

        let votes_cast = IntCounter::new("quadvote_votes_cast_total", "Total votes recorded")?;
        registry.register(Box::new(votes_cast.clone()))?;

        let credits_cast = IntCounter::new(
            "quadvote_credits_cast_total",
            "Total credits across recorded votes",
        )?;
        registry.register(Box::new(credits_cast.clone()))?;

        let rejections = IntCounterVec::new(
            Opts::new("quadvote_rejections_total", "Failed requests"),
            &["operation", "code"],
        )?;
        registry.register(Box::new(rejections.clone()))?;

        Ok(Arc::new(Self {
            registry,
            daos_created,
            proposals_created,
            votes_cast,
            credits_cast,
            rejections,
        }))
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn record_vote(&self, credits: u64) {
        self.votes_cast.inc();
        self.credits_cast.inc_by(credits);
    }

    pub fn record_rejection(&self, operation: &str, code: &str) {
        self.rejections.with_label_values(&[operation, code]).inc();
    }
}
