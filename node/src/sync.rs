//! Chain synchronisation: how received chains, lengths and blocks change
//! the local ledger.
//!
//! Every method takes the ledger lock for exactly one read or one
//! read-modify-write and releases it before returning, so callers can send
//! replies without holding it. Whole-chain verification runs on the
//! blocking pool with the lock moved into it.

use std::sync::Arc;

use tokio::sync::Mutex;

use powchain_consensus::{accept_new_block, apply_chain, ChainDecision, ConsensusError};
use powchain_ledger::{Block, Ledger};

use crate::error::NodeError;
use crate::metrics::NodeMetrics;

/// The ledger shared by the node, its sessions and the miner.
pub type SharedLedger = Arc<Mutex<Ledger>>;

#[derive(Clone)]
pub struct SyncCoordinator {
    ledger: SharedLedger,
    metrics: Arc<NodeMetrics>,
}

impl SyncCoordinator {
    pub fn new(ledger: SharedLedger, metrics: Arc<NodeMetrics>) -> Self {
        Self { ledger, metrics }
    }

    /// Copy of the full chain, for a CHAIN reply.
    pub async fn chain_snapshot(&self) -> Vec<Block> {
        self.ledger.lock().await.blocks().to_vec()
    }

    pub async fn chain_length(&self) -> u64 {
        self.ledger.lock().await.len() as u64
    }

    /// Whether a peer reporting `remote_len` blocks has something we want.
    pub async fn wants_chain(&self, remote_len: u64) -> bool {
        remote_len > self.chain_length().await
    }

    /// Offer a received chain to the fork-choice rule.
    ///
    /// Fails only if the verification task panics.
    pub async fn on_chain(&self, candidate: Vec<Block>) -> Result<ChainDecision, NodeError> {
        let mut ledger = Arc::clone(&self.ledger).lock_owned().await;
        let (decision, len) = tokio::task::spawn_blocking(move || {
            let decision = apply_chain(&mut ledger, candidate);
            (decision, ledger.len())
        })
        .await?;
        self.metrics.chain_length.set(len as i64);

        match &decision {
            ChainDecision::Adopted { old_len, new_len } => {
                self.metrics.chains_replaced.inc();
                tracing::info!(old_len, new_len, "adopted longer chain from peer");
            }
            ChainDecision::Rejected(_) => self.metrics.chains_rejected.inc(),
        }
        Ok(decision)
    }

    /// Try to append a propagated block to the tip.
    pub async fn on_new_block(&self, block: Block) -> Result<(), ConsensusError> {
        let index = block.index;
        let hash = block.hash;
        let mut ledger = self.ledger.lock().await;
        let result = accept_new_block(&mut ledger, block);
        self.metrics.chain_length.set(ledger.len() as i64);
        drop(ledger);

        match &result {
            Ok(()) => {
                self.metrics.blocks_accepted.inc();
                tracing::info!(index, hash = %hash, "accepted block from peer");
            }
            Err(reason) => {
                self.metrics.blocks_rejected.inc();
                tracing::debug!(index, hash = %hash, %reason, "ignored block from peer");
            }
        }
        result
    }
}
