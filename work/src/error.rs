use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkError {
    #[error("difficulty {difficulty} can never be met by a {max}-digit hash")]
    UnreachableDifficulty { difficulty: usize, max: usize },

    #[error("nonce space exhausted without meeting difficulty {difficulty}")]
    NonceSpaceExhausted { difficulty: usize },
}
