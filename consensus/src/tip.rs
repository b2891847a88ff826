//! Acceptance of single propagated blocks.

use powchain_ledger::{Block, Ledger};

use crate::error::ConsensusError;

/// Check that `block` directly extends the ledger's tip.
///
/// The block must sit at the next index, link to the tip's hash, carry a
/// stored hash that meets the difficulty, and that hash must match its
/// contents.
pub fn check_new_block(ledger: &Ledger, block: &Block) -> Result<(), ConsensusError> {
    let tip = ledger.tip().ok_or(ConsensusError::EmptyChain)?;
    let expected = ledger.len() as u64;

    if block.index != expected {
        return Err(ConsensusError::UnexpectedIndex {
            expected,
            got: block.index,
        });
    }
    if block.previous_hash != tip.hash {
        return Err(ConsensusError::UnknownParent { tip: tip.hash });
    }
    if !block.meets_difficulty(ledger.difficulty()) {
        return Err(ConsensusError::InsufficientWork {
            difficulty: ledger.difficulty(),
        });
    }
    if !block.has_valid_hash() {
        return Err(ConsensusError::HashMismatch);
    }
    Ok(())
}

/// Append `block` if [`check_new_block`] passes.
pub fn accept_new_block(ledger: &mut Ledger, block: Block) -> Result<(), ConsensusError> {
    check_new_block(ledger, &block)?;
    ledger.add_existing_block(block);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use powchain_ledger::Transaction;
    use powchain_types::{Amount, BlockHash, ChainParams};
    use powchain_work::Miner;

    fn params() -> ChainParams {
        ChainParams::with_difficulty(1).unwrap()
    }

    /// A block mined by another ledger sharing our genesis.
    fn next_block(ledger: &Ledger) -> Block {
        let mut other = ledger.clone();
        other.add_block(Vec::new()).unwrap().block
    }

    #[test]
    fn extending_block_accepted() {
        let mut ledger = Ledger::new(params()).unwrap();
        let block = next_block(&ledger);
        accept_new_block(&mut ledger, block.clone()).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.tip(), Some(&block));
        assert!(ledger.is_chain_valid());
    }

    #[test]
    fn wrong_previous_hash_rejected() {
        let mut ledger = Ledger::new(params()).unwrap();
        let mut block = next_block(&ledger);
        block.previous_hash = BlockHash::new([3u8; 32]);
        Miner::new(1).unwrap().mine(&mut block).unwrap();

        let err = accept_new_block(&mut ledger, block).unwrap_err();
        assert!(matches!(err, ConsensusError::UnknownParent { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn wrong_index_rejected() {
        let mut ledger = Ledger::new(params()).unwrap();
        let mut block = next_block(&ledger);
        block.index = 5;
        Miner::new(1).unwrap().mine(&mut block).unwrap();
        assert_eq!(
            check_new_block(&ledger, &block),
            Err(ConsensusError::UnexpectedIndex { expected: 1, got: 5 })
        );
    }

    #[test]
    fn stale_block_rejected() {
        let mut ledger = Ledger::new(params()).unwrap();
        let block = next_block(&ledger);
        ledger.add_block(Vec::new()).unwrap();
        assert!(check_new_block(&ledger, &block).is_err());
    }

    #[test]
    fn forged_contents_rejected() {
        let ledger = Ledger::new(params()).unwrap();
        let mut block = next_block(&ledger);
        block.add_transaction(Transaction::new("Bob", "Alice", Amount::new(1)));
        assert_eq!(check_new_block(&ledger, &block), Err(ConsensusError::HashMismatch));
    }

    #[test]
    fn unmined_block_rejected() {
        let ledger = Ledger::new(ChainParams::with_difficulty(4).unwrap()).unwrap();
        let tip = ledger.tip().unwrap();
        let mut block = Block::new(1, tip.hash, Vec::new());
        block.hash = block.calculate_hash();
        if block.meets_difficulty(4) {
            return;
        }
        assert_eq!(
            check_new_block(&ledger, &block),
            Err(ConsensusError::InsufficientWork { difficulty: 4 })
        );
    }
}
