//! Genesis block creation: the first block of every chain.
//!
//! The genesis block has `previous_hash: BlockHash::ZERO`, seeds a fixed set
//! of system-issued allocations so balance queries are well-defined from
//! block 0, and uses a fixed timestamp so that every node built with the same
//! parameters derives the same genesis hash.

use powchain_types::{Address, Amount, BlockHash, ChainParams, Timestamp};
use powchain_work::Miner;

use crate::block::Block;
use crate::error::LedgerError;
use crate::transaction::Transaction;

/// Genesis timestamp shared by all nodes: 2024-01-01 00:00:00 UTC.
pub const GENESIS_TIMESTAMP: Timestamp = Timestamp::new(1_704_067_200);

/// Accounts credited in the genesis block.
pub const GENESIS_ACCOUNTS: [&str; 3] = ["Alice", "Bob", "Charlie"];

/// Configuration for creating a genesis block.
#[derive(Clone, Debug)]
pub struct GenesisConfig {
    /// System-issued credits, in block order.
    pub allocations: Vec<(Address, Amount)>,
    pub timestamp: Timestamp,
}

impl GenesisConfig {
    /// The standard allocation: each genesis account receives one mining reward.
    pub fn standard(params: &ChainParams) -> Self {
        Self {
            allocations: GENESIS_ACCOUNTS
                .iter()
                .map(|name| (Address::new(*name), params.mining_reward))
                .collect(),
            timestamp: GENESIS_TIMESTAMP,
        }
    }
}

/// Create and mine the genesis block.
pub fn create_genesis_block(
    config: &GenesisConfig,
    params: &ChainParams,
) -> Result<Block, LedgerError> {
    let transactions = config
        .allocations
        .iter()
        .map(|(receiver, amount)| {
            Transaction::with_timestamp(Address::system(), receiver.clone(), *amount, config.timestamp)
        })
        .collect();

    let mut block = Block::with_timestamp(0, BlockHash::ZERO, transactions, config.timestamp);
    Miner::new(params.difficulty)?.mine(&mut block)?;
    Ok(block)
}
