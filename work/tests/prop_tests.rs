use proptest::prelude::*;

use powchain_crypto::sha256_multi;
use powchain_types::BlockHash;
use powchain_work::{meets_difficulty, Mineable, Miner};

struct Candidate {
    seed: [u8; 32],
    nonce: u64,
    hash: BlockHash,
}

impl Mineable for Candidate {
    fn nonce(&self) -> u64 {
        self.nonce
    }
    fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }
    fn calculate_hash(&self) -> BlockHash {
        BlockHash::new(sha256_multi(&[&self.seed[..], &self.nonce.to_be_bytes()[..]]))
    }
    fn set_hash(&mut self, hash: BlockHash) {
        self.hash = hash;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Mined candidates always pass their own validation.
    #[test]
    fn mined_hash_always_meets_difficulty(
        seed in prop::array::uniform32(0u8..),
        difficulty in 0usize..3,
    ) {
        let miner = Miner::new(difficulty).unwrap();
        let mut candidate = Candidate { seed, nonce: 0, hash: BlockHash::ZERO };
        miner.mine(&mut candidate).unwrap();
        prop_assert!(meets_difficulty(&candidate.hash, difficulty));
        prop_assert_eq!(candidate.hash, candidate.calculate_hash());
    }

    /// Zero difficulty always passes regardless of hash.
    #[test]
    fn zero_difficulty_always_passes(bytes in prop::array::uniform32(0u8..)) {
        prop_assert!(meets_difficulty(&BlockHash::new(bytes), 0));
    }

    /// Lower difficulty is easier to meet: if valid at D, then valid at D-1.
    #[test]
    fn lower_difficulty_is_easier(
        bytes in prop::array::uniform32(0u8..),
        difficulty in 1usize..=64,
    ) {
        let hash = BlockHash::new(bytes);
        if meets_difficulty(&hash, difficulty) {
            prop_assert!(meets_difficulty(&hash, difficulty - 1));
        }
    }
}
