use thiserror::Error;

use powchain_ledger::ValidationError;
use powchain_types::BlockHash;

/// Why a received chain or block was not applied.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConsensusError {
    #[error("candidate chain of length {candidate} is not longer than local length {local}")]
    NotLonger { candidate: usize, local: usize },

    #[error("candidate chain is invalid: {0}")]
    InvalidChain(#[from] ValidationError),

    #[error("block index {got} does not extend chain of length {expected}")]
    UnexpectedIndex { expected: u64, got: u64 },

    #[error("block does not link to tip {tip}")]
    UnknownParent { tip: BlockHash },

    #[error("block hash does not meet difficulty {difficulty}")]
    InsufficientWork { difficulty: usize },

    #[error("block hash does not match its contents")]
    HashMismatch,

    #[error("local chain is empty")]
    EmptyChain,
}
