//! Append-only proof-of-work chain.
//!
//! A single ordered sequence of blocks, each linked to its predecessor by
//! hash and sealed by a nonce search. Balances are derived by scanning the
//! full history; there is no account index.

pub mod block;
pub mod error;
pub mod genesis;
pub mod ledger;
pub mod snapshot;
pub mod transaction;
pub mod validation;

pub use block::Block;
pub use error::LedgerError;
pub use genesis::{create_genesis_block, GenesisConfig, GENESIS_TIMESTAMP};
pub use ledger::{BlockReceipt, Ledger};
pub use snapshot::{read_snapshot, write_snapshot};
pub use transaction::Transaction;
pub use validation::{verify_chain, verify_successor, ValidationError};
