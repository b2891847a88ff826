//! Prometheus metrics for the node.
//!
//! Counters and gauges covering mining, chain sync and peer sessions. The
//! [`NodeMetrics`] struct owns a dedicated [`Registry`] that
//! [`NodeMetrics::encode`] renders in the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::NodeError;

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Blocks mined locally and appended to the chain.
    pub blocks_mined: IntCounter,
    /// NEW_BLOCK messages accepted onto the tip.
    pub blocks_accepted: IntCounter,
    /// NEW_BLOCK messages rejected.
    pub blocks_rejected: IntCounter,
    /// Received chains that replaced the local chain.
    pub chains_replaced: IntCounter,
    /// Received chains that were shorter, equal or invalid.
    pub chains_rejected: IntCounter,
    /// Frames that failed to decode.
    pub malformed_messages: IntCounter,
    /// Replies not sent because they exceeded the frame cap.
    pub oversized_replies: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub chain_length: IntGauge,
    pub peer_count: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall time of the nonce search, in milliseconds.
    pub mining_time_ms: Histogram,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        // Counters
        let blocks_mined = register_int_counter_with_registry!(
            Opts::new("powchain_blocks_mined_total", "Blocks mined by this node"),
            registry
        )
        .expect("failed to register blocks_mined counter");

        let blocks_accepted = register_int_counter_with_registry!(
            Opts::new(
                "powchain_blocks_accepted_total",
                "Propagated blocks appended to the chain"
            ),
            registry
        )
        .expect("failed to register blocks_accepted counter");

        let blocks_rejected = register_int_counter_with_registry!(
            Opts::new(
                "powchain_blocks_rejected_total",
                "Propagated blocks that did not extend the tip"
            ),
            registry
        )
        .expect("failed to register blocks_rejected counter");

        let chains_replaced = register_int_counter_with_registry!(
            Opts::new(
                "powchain_chains_replaced_total",
                "Received chains adopted as the local chain"
            ),
            registry
        )
        .expect("failed to register chains_replaced counter");

        let chains_rejected = register_int_counter_with_registry!(
            Opts::new(
                "powchain_chains_rejected_total",
                "Received chains that were not longer or not valid"
            ),
            registry
        )
        .expect("failed to register chains_rejected counter");

        let malformed_messages = register_int_counter_with_registry!(
            Opts::new(
                "powchain_malformed_messages_total",
                "Peer messages that could not be decoded"
            ),
            registry
        )
        .expect("failed to register malformed_messages counter");

        let oversized_replies = register_int_counter_with_registry!(
            Opts::new(
                "powchain_oversized_replies_total",
                "Replies skipped because they exceeded the frame cap"
            ),
            registry
        )
        .expect("failed to register oversized_replies counter");

        // Gauges
        let chain_length = register_int_gauge_with_registry!(
            Opts::new("powchain_chain_length", "Current number of blocks in the chain"),
            registry
        )
        .expect("failed to register chain_length gauge");

        let peer_count = register_int_gauge_with_registry!(
            Opts::new("powchain_peer_count", "Current number of connected peers"),
            registry
        )
        .expect("failed to register peer_count gauge");

        // Exponential buckets, 1 ms to ~16 s.
        let mining_time_ms = register_histogram_with_registry!(
            HistogramOpts::new("powchain_mining_time_ms", "Nonce search time in milliseconds")
                .buckets(prometheus::exponential_buckets(1.0, 2.0, 15).unwrap_or_default()),
            registry
        )
        .expect("failed to register mining_time_ms histogram");

        Self {
            registry,
            blocks_mined,
            blocks_accepted,
            blocks_rejected,
            chains_replaced,
            chains_rejected,
            malformed_messages,
            oversized_replies,
            chain_length,
            peer_count,
            mining_time_ms,
        }
    }

    /// Render every metric in the text exposition format.
    pub fn encode(&self) -> Result<String, NodeError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| NodeError::Config(format!("metrics not UTF-8: {e}")))
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}
