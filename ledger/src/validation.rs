//! Chain validity checks.
//!
//! Every adjacent pair `(i-1, i)` with `i >= 1` must satisfy, in order:
//! 1. block `i`'s stored hash equals its recomputed hash (tamper detection),
//! 2. block `i`'s `previous_hash` equals block `i-1`'s stored hash (linkage),
//! 3. block `i`'s stored hash meets the difficulty prefix.
//!
//! Genesis is exempt from the pairwise checks. An empty chain is invalid.

use rayon::prelude::*;
use thiserror::Error;

use crate::block::Block;

/// The first rule a chain breaks.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("chain is empty")]
    EmptyChain,

    #[error("block at position {position} has been tampered with")]
    HashMismatch { position: usize },

    #[error("block at position {position} does not link to its predecessor")]
    BrokenLink { position: usize },

    #[error("block at position {position} does not meet difficulty {difficulty}")]
    InsufficientWork { position: usize, difficulty: usize },
}

/// Check that `block` may follow `previous` at `position`.
pub fn verify_successor(
    previous: &Block,
    block: &Block,
    position: usize,
    difficulty: usize,
) -> Result<(), ValidationError> {
    if !block.has_valid_hash() {
        return Err(ValidationError::HashMismatch { position });
    }
    if block.previous_hash != previous.hash {
        return Err(ValidationError::BrokenLink { position });
    }
    if !block.meets_difficulty(difficulty) {
        return Err(ValidationError::InsufficientWork {
            position,
            difficulty,
        });
    }
    Ok(())
}

/// Verify a whole chain without mutating it.
///
/// Pairs are checked in parallel; the reported error is always the one at
/// the lowest position, matching a sequential scan.
pub fn verify_chain(blocks: &[Block], difficulty: usize) -> Result<(), ValidationError> {
    if blocks.is_empty() {
        return Err(ValidationError::EmptyChain);
    }

    match blocks
        .par_windows(2)
        .enumerate()
        .find_map_first(|(i, pair)| verify_successor(&pair[0], &pair[1], i + 1, difficulty).err())
    {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powchain_types::{Amount, BlockHash, Timestamp};
    use powchain_work::Miner;

    use crate::transaction::Transaction;

    const DIFFICULTY: usize = 1;

    fn mined_chain(len: usize) -> Vec<Block> {
        let miner = Miner::new(DIFFICULTY).unwrap();
        let mut chain: Vec<Block> = Vec::with_capacity(len);
        for i in 0..len {
            let previous = chain.last().map(|b| b.hash).unwrap_or(BlockHash::ZERO);
            let mut block = Block::with_timestamp(
                i as u64,
                previous,
                vec![Transaction::with_timestamp(
                    "SYSTEM",
                    "MINER",
                    Amount::new(100),
                    Timestamp::new(i as u64),
                )],
                Timestamp::new(1_000 + i as u64),
            );
            miner.mine(&mut block).unwrap();
            chain.push(block);
        }
        chain
    }

    #[test]
    fn empty_chain_is_invalid() {
        assert_eq!(verify_chain(&[], DIFFICULTY), Err(ValidationError::EmptyChain));
    }

    #[test]
    fn single_block_is_valid_without_checks() {
        let mut chain = mined_chain(1);
        chain[0].nonce += 1;
        assert_eq!(verify_chain(&chain, DIFFICULTY), Ok(()));
    }

    #[test]
    fn mined_chain_is_valid() {
        assert_eq!(verify_chain(&mined_chain(5), DIFFICULTY), Ok(()));
    }

    #[test]
    fn tampered_block_detected() {
        let mut chain = mined_chain(4);
        chain[2].timestamp = Timestamp::new(9_999);
        assert_eq!(
            verify_chain(&chain, DIFFICULTY),
            Err(ValidationError::HashMismatch { position: 2 })
        );
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = mined_chain(4);
        chain[3].previous_hash = BlockHash::new([1u8; 32]);
        Miner::new(DIFFICULTY).unwrap().mine(&mut chain[3]).unwrap();
        assert_eq!(
            verify_chain(&chain, DIFFICULTY),
            Err(ValidationError::BrokenLink { position: 3 })
        );
    }

    #[test]
    fn insufficient_work_detected() {
        let chain = mined_chain(3);
        let harder = BlockHash::HEX_LEN;
        assert_eq!(
            verify_chain(&chain, harder),
            Err(ValidationError::InsufficientWork {
                position: 1,
                difficulty: harder
            })
        );
    }

    #[test]
    fn lowest_position_reported_first() {
        let mut chain = mined_chain(6);
        chain[4].nonce += 1;
        chain[2].nonce += 1;
        assert_eq!(
            verify_chain(&chain, DIFFICULTY),
            Err(ValidationError::HashMismatch { position: 2 })
        );
    }
}
