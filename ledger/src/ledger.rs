//! The chain itself: an ordered, append-only block sequence plus the
//! parameters it was built under.
//!
//! Balances are never cached. Every query scans the full history, so the
//! chain is the only state and replacing it replaces everything.

use std::collections::HashMap;

use powchain_types::{Address, Amount, ChainParams};
use powchain_work::{Miner, MiningStats};

use crate::block::Block;
use crate::error::LedgerError;
use crate::genesis::{create_genesis_block, GenesisConfig};
use crate::transaction::Transaction;
use crate::validation::{verify_chain, ValidationError};

/// Result of mining a batch of transactions onto the tip.
#[derive(Clone, Debug)]
pub struct BlockReceipt {
    /// The block as appended (reward first).
    pub block: Block,
    /// Submitted transactions that failed the balance check and were dropped.
    pub rejected: Vec<Transaction>,
    pub stats: MiningStats,
}

/// An in-memory proof-of-work chain.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    params: ChainParams,
    miner: Miner,
}

impl Ledger {
    /// Create a ledger holding only the standard genesis block.
    pub fn new(params: ChainParams) -> Result<Self, LedgerError> {
        let genesis = GenesisConfig::standard(&params);
        Self::with_genesis(params, &genesis)
    }

    /// Create a ledger from a custom genesis allocation.
    pub fn with_genesis(params: ChainParams, genesis: &GenesisConfig) -> Result<Self, LedgerError> {
        let block = create_genesis_block(genesis, &params)?;
        tracing::info!(
            hash = %block.hash,
            difficulty = params.difficulty,
            "genesis block created"
        );
        Self::from_blocks(params, vec![block])
    }

    /// Wrap an existing block sequence. The blocks are not validated.
    pub fn from_blocks(params: ChainParams, blocks: Vec<Block>) -> Result<Self, LedgerError> {
        let miner = Miner::new(params.difficulty)?;
        Ok(Self {
            chain: blocks,
            params,
            miner,
        })
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    pub fn difficulty(&self) -> usize {
        self.params.difficulty
    }

    pub fn mining_reward(&self) -> Amount {
        self.params.mining_reward
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// The most recent block, if any.
    pub fn tip(&self) -> Option<&Block> {
        self.chain.last()
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.chain.get(index)
    }

    /// Credits minus debits for `address` over the whole history.
    ///
    /// The system sentinel goes arbitrarily negative; every other address
    /// stays non-negative as long as blocks come through [`Ledger::add_block`].
    pub fn get_balance(&self, address: &Address) -> i128 {
        let mut balance: i128 = 0;
        for tx in self.chain.iter().flat_map(|b| b.transactions.iter()) {
            if tx.sender() == address {
                balance -= tx.amount().as_i128();
            }
            if tx.receiver() == address {
                balance += tx.amount().as_i128();
            }
        }
        balance
    }

    /// Whether the sender can cover `tx` from its confirmed balance.
    /// System-issued transactions always pass.
    pub fn validate_transaction(&self, tx: &Transaction) -> bool {
        tx.is_system_issued() || self.get_balance(tx.sender()) >= tx.amount().as_i128()
    }

    /// Filter `transactions`, prepend the mining reward, mine the block onto
    /// the tip and append it.
    ///
    /// Each transaction is checked against the confirmed balance minus what
    /// earlier entries in the same batch already debit, so a batch never
    /// overdraws. Credits within the batch are not spendable until mined.
    /// Blocks the calling thread for the duration of the nonce search.
    pub fn add_block(&mut self, transactions: Vec<Transaction>) -> Result<BlockReceipt, LedgerError> {
        let previous_hash = self.tip().ok_or(LedgerError::EmptyChain)?.hash;

        let mut accepted = Vec::with_capacity(transactions.len() + 1);
        accepted.push(Transaction::system_credit(
            self.params.miner_address.clone(),
            self.params.mining_reward,
        ));

        let mut rejected = Vec::new();
        let mut pending_debits: HashMap<Address, i128> = HashMap::new();
        for tx in transactions {
            if tx.is_system_issued() {
                accepted.push(tx);
                continue;
            }
            let committed = pending_debits.get(tx.sender()).copied().unwrap_or(0);
            let available = self.get_balance(tx.sender()) - committed;
            if available >= tx.amount().as_i128() {
                *pending_debits.entry(tx.sender().clone()).or_insert(0) += tx.amount().as_i128();
                accepted.push(tx);
            } else {
                tracing::info!(
                    sender = %tx.sender(),
                    receiver = %tx.receiver(),
                    amount = %tx.amount(),
                    available,
                    "invalid transaction skipped"
                );
                rejected.push(tx);
            }
        }

        let mut block = Block::new(self.chain.len() as u64, previous_hash, accepted);
        let stats = self.miner.mine(&mut block)?;
        tracing::info!(
            index = block.index,
            hash = %block.hash,
            nonce = stats.nonce,
            attempts = stats.attempts,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "block mined"
        );

        self.chain.push(block.clone());
        Ok(BlockReceipt {
            block,
            rejected,
            stats,
        })
    }

    /// Check the local chain against the ledger's difficulty.
    pub fn verify(&self) -> Result<(), ValidationError> {
        verify_chain(&self.chain, self.params.difficulty)
    }

    pub fn is_chain_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Check a candidate chain against this ledger's difficulty.
    pub fn is_valid_chain(&self, candidate: &[Block]) -> bool {
        verify_chain(candidate, self.params.difficulty).is_ok()
    }

    /// Overwrite the chain. Callers decide whether the candidate deserves it.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) {
        tracing::info!(
            old_len = self.chain.len(),
            new_len = candidate.len(),
            "chain replaced"
        );
        self.chain = candidate;
    }

    /// Append a block received from elsewhere. Callers verify it first.
    pub fn add_existing_block(&mut self, block: Block) {
        tracing::debug!(index = block.index, hash = %block.hash, "block appended");
        self.chain.push(block);
    }
}
