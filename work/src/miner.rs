//! Proof-of-work search (single-threaded CPU).

use std::time::{Duration, Instant};

use powchain_types::BlockHash;

use crate::{meets_difficulty, WorkError};

/// Attempts between progress log lines.
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// Anything whose hash depends on a nonce the miner may bump.
///
/// Implemented by the ledger's block type; kept as a trait so this crate
/// does not depend on the ledger.
pub trait Mineable {
    fn nonce(&self) -> u64;
    fn set_nonce(&mut self, nonce: u64);
    /// Recompute the hash from the current fields.
    fn calculate_hash(&self) -> BlockHash;
    fn set_hash(&mut self, hash: BlockHash);
}

/// Outcome of a successful search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MiningStats {
    /// The winning nonce (also stored on the block).
    pub nonce: u64,
    /// Number of hashes computed, including the winning one.
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Mines blocks against a fixed difficulty.
#[derive(Clone, Copy, Debug)]
pub struct Miner {
    difficulty: usize,
}

impl Miner {
    pub fn new(difficulty: usize) -> Result<Self, WorkError> {
        if difficulty > BlockHash::HEX_LEN {
            return Err(WorkError::UnreachableDifficulty {
                difficulty,
                max: BlockHash::HEX_LEN,
            });
        }
        Ok(Self { difficulty })
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Increment the block's nonce from its current value until the hash
    /// meets the difficulty, then store the winning hash on the block.
    ///
    /// Occupies the calling thread until a nonce is found.
    pub fn mine<B: Mineable>(&self, block: &mut B) -> Result<MiningStats, WorkError> {
        let started = Instant::now();
        let mut attempts: u64 = 1;
        let mut hash = block.calculate_hash();

        while !meets_difficulty(&hash, self.difficulty) {
            let nonce = block
                .nonce()
                .checked_add(1)
                .ok_or(WorkError::NonceSpaceExhausted {
                    difficulty: self.difficulty,
                })?;
            block.set_nonce(nonce);
            if nonce % PROGRESS_INTERVAL == 0 {
                tracing::debug!(nonce, difficulty = self.difficulty, "mining in progress");
            }
            hash = block.calculate_hash();
            attempts += 1;
        }

        block.set_hash(hash);
        Ok(MiningStats {
            nonce: block.nonce(),
            attempts,
            elapsed: started.elapsed(),
        })
    }
}
