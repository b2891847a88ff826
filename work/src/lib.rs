//! Proof-of-work.
//!
//! A block is mined by searching nonces until its hash carries the required
//! number of leading zero hex digits. The search is CPU-bound, single-threaded
//! per block, and has no upper bound beyond the nonce space.

pub mod error;
pub mod miner;
pub mod validator;

pub use error::WorkError;
pub use miner::{Mineable, Miner, MiningStats, PROGRESS_INTERVAL};
pub use validator::meets_difficulty;
