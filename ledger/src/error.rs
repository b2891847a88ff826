use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("chain has no blocks to extend")]
    EmptyChain,

    #[error("invalid chain parameters: {0}")]
    Params(#[from] powchain_types::TypesError),

    #[error("mining failed: {0}")]
    Work(#[from] powchain_work::WorkError),

    #[error("snapshot IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
