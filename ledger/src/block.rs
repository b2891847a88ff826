//! Blocks: ordered transaction batches sealed by proof-of-work.

use serde::{Deserialize, Serialize};
use std::fmt;

use powchain_crypto::hash_block;
use powchain_types::{BlockHash, Timestamp};
use powchain_work::{meets_difficulty, Mineable};

use crate::transaction::Transaction;

/// A block in the chain.
///
/// `hash` is derived: it must equal [`Block::calculate_hash`] over the other
/// fields, and is only meaningful once the block has been mined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Position in the chain (0 = genesis).
    pub index: u64,
    /// Hash of the predecessor ([`BlockHash::ZERO`] for genesis).
    pub previous_hash: BlockHash,
    /// The stored (mined) hash of this block.
    pub hash: BlockHash,
    /// Creation time.
    pub timestamp: Timestamp,
    /// Proof-of-work counter.
    pub nonce: u64,
    /// Ordered transactions; for mined blocks the first is the reward.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create an unmined block stamped with the current time.
    pub fn new(index: u64, previous_hash: BlockHash, transactions: Vec<Transaction>) -> Self {
        Self::with_timestamp(index, previous_hash, transactions, Timestamp::now())
    }

    pub fn with_timestamp(
        index: u64,
        previous_hash: BlockHash,
        transactions: Vec<Transaction>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            index,
            previous_hash,
            hash: BlockHash::ZERO,
            timestamp,
            nonce: 0,
            transactions,
        }
    }

    /// Canonical hash preimage: index, timestamp, nonce, transactions, previous hash.
    pub fn preimage(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + self.transactions.len() * 48);
        buf.extend_from_slice(&self.index.to_be_bytes());
        buf.extend_from_slice(&self.timestamp.as_secs().to_be_bytes());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(&(self.transactions.len() as u32).to_be_bytes());
        for tx in &self.transactions {
            tx.write_preimage(&mut buf);
        }
        buf.extend_from_slice(self.previous_hash.as_bytes());
        buf
    }

    /// Recompute the hash from the current fields. Pure and deterministic.
    pub fn calculate_hash(&self) -> BlockHash {
        hash_block(&self.preimage())
    }

    /// Whether the stored hash still matches the contents.
    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.calculate_hash()
    }

    /// Whether the stored hash carries `difficulty` leading zero digits.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        meets_difficulty(&self.hash, difficulty)
    }

    /// Append a transaction before mining. Invalidates any stored hash.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

impl Mineable for Block {
    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    fn calculate_hash(&self) -> BlockHash {
        Block::calculate_hash(self)
    }

    fn set_hash(&mut self, hash: BlockHash) {
        self.hash = hash;
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block {}", self.index)?;
        writeln!(f, "  previous:  {}", self.previous_hash)?;
        writeln!(f, "  hash:      {}", self.hash)?;
        writeln!(f, "  timestamp: {}", self.timestamp)?;
        writeln!(f, "  nonce:     {}", self.nonce)?;
        writeln!(f, "  transactions:")?;
        for tx in &self.transactions {
            writeln!(
                f,
                "    {} -> {}  {}  @{}",
                tx.sender(),
                tx.receiver(),
                tx.amount(),
                tx.timestamp()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powchain_types::Amount;
    use powchain_work::Miner;

    fn sample_block() -> Block {
        Block::with_timestamp(
            1,
            BlockHash::new([7u8; 32]),
            vec![
                Transaction::with_timestamp("SYSTEM", "MINER", Amount::new(100), Timestamp::new(5)),
                Transaction::with_timestamp("Alice", "Bob", Amount::new(10), Timestamp::new(5)),
            ],
            Timestamp::new(42),
        )
    }

    #[test]
    fn new_block_starts_unmined() {
        let block = sample_block();
        assert_eq!(block.nonce, 0);
        assert!(block.hash.is_zero());
        assert!(!block.has_valid_hash());
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(sample_block().calculate_hash(), sample_block().calculate_hash());
    }

    #[test]
    fn hash_covers_every_field() {
        let base = sample_block().calculate_hash();

        let mut b = sample_block();
        b.index = 2;
        assert_ne!(b.calculate_hash(), base);

        let mut b = sample_block();
        b.previous_hash = BlockHash::new([8u8; 32]);
        assert_ne!(b.calculate_hash(), base);

        let mut b = sample_block();
        b.timestamp = Timestamp::new(43);
        assert_ne!(b.calculate_hash(), base);

        let mut b = sample_block();
        b.nonce = 1;
        assert_ne!(b.calculate_hash(), base);

        let mut b = sample_block();
        b.transactions.reverse();
        assert_ne!(b.calculate_hash(), base);
    }

    #[test]
    fn stored_hash_excluded_from_preimage() {
        let mut b = sample_block();
        let before = b.calculate_hash();
        b.hash = BlockHash::new([9u8; 32]);
        assert_eq!(b.calculate_hash(), before);
    }

    #[test]
    fn mining_sets_hash_and_nonce() {
        let mut block = sample_block();
        let stats = Miner::new(2).unwrap().mine(&mut block).unwrap();
        assert!(block.has_valid_hash());
        assert!(block.meets_difficulty(2));
        assert_eq!(stats.nonce, block.nonce);
    }

    #[test]
    fn add_transaction_invalidates_hash() {
        let mut block = sample_block();
        Miner::new(1).unwrap().mine(&mut block).unwrap();
        block.add_transaction(Transaction::with_timestamp(
            "Bob",
            "Alice",
            Amount::new(1),
            Timestamp::new(6),
        ));
        assert!(!block.has_valid_hash());
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = serde_json::to_value(sample_block()).unwrap();
        for key in ["index", "previousHash", "hash", "timestamp", "nonce", "transactions"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_block());
    }

    #[test]
    fn display_lists_transactions() {
        let text = sample_block().to_string();
        assert!(text.contains("Block 1"));
        assert!(text.contains("Alice -> Bob"));
    }
}
