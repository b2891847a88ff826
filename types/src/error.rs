//! Errors raised while constructing fundamental types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid block hash: {0}")]
    InvalidHash(String),

    #[error("difficulty {difficulty} exceeds the {max} hex digits of a hash")]
    DifficultyTooHigh { difficulty: usize, max: usize },
}
