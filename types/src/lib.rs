//! Fundamental types for the powchain ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, block hashes, amounts, timestamps and chain parameters.

pub mod address;
pub mod amount;
pub mod block;
pub mod error;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use block::BlockHash;
pub use error::TypesError;
pub use params::{ChainParams, DEFAULT_DIFFICULTY, DEFAULT_MINING_REWARD};
pub use time::Timestamp;
