//! Consensus: deciding which chain a node keeps.
//!
//! - [`fork_choice`] adopts a received chain iff it is strictly longer than
//!   the local one and valid. Equal lengths never replace the local chain.
//! - [`tip`] accepts a single propagated block iff it extends the local tip.
//! - [`error`] rejection reasons.

pub mod error;
pub mod fork_choice;
pub mod tip;

pub use error::ConsensusError;
pub use fork_choice::{apply_chain, evaluate_chain, ChainDecision};
pub use tip::{accept_new_block, check_new_block};
