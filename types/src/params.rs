//! Chain parameters: fixed for the lifetime of a ledger.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::Amount;
use crate::block::BlockHash;
use crate::error::TypesError;

/// Default proof-of-work difficulty (leading zero hex digits).
pub const DEFAULT_DIFFICULTY: usize = 2;

/// Default reward credited to the miner for every mined block.
pub const DEFAULT_MINING_REWARD: u64 = 100;

/// Parameters every block in a ledger is mined and validated against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Required count of leading `'0'` hex digits in a block hash.
    pub difficulty: usize,
    /// Value credited by the reward transaction of each mined block.
    pub mining_reward: Amount,
    /// Beneficiary of the reward transaction.
    pub miner_address: Address,
}

impl ChainParams {
    /// Build parameters, rejecting a difficulty wider than the hash itself
    /// (such a target can never be met).
    pub fn new(
        difficulty: usize,
        mining_reward: Amount,
        miner_address: Address,
    ) -> Result<Self, TypesError> {
        if difficulty > BlockHash::HEX_LEN {
            return Err(TypesError::DifficultyTooHigh {
                difficulty,
                max: BlockHash::HEX_LEN,
            });
        }
        Ok(Self {
            difficulty,
            mining_reward,
            miner_address,
        })
    }

    /// Same defaults with a different difficulty (handy in tests).
    pub fn with_difficulty(difficulty: usize) -> Result<Self, TypesError> {
        Self::new(
            difficulty,
            Amount::new(DEFAULT_MINING_REWARD),
            Address::miner(),
        )
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining_reward: Amount::new(DEFAULT_MINING_REWARD),
            miner_address: Address::miner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let params = ChainParams::default();
        assert_eq!(params.difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(params.mining_reward, Amount::new(100));
        assert_eq!(params.miner_address.as_str(), Address::MINER);
    }

    #[test]
    fn rejects_unreachable_difficulty() {
        let err = ChainParams::with_difficulty(65).unwrap_err();
        assert!(matches!(err, TypesError::DifficultyTooHigh { difficulty: 65, .. }));
        assert!(ChainParams::with_difficulty(64).is_ok());
    }
}
