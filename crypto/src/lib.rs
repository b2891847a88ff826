//! Cryptographic primitives for powchain.
//!
//! - **SHA-256** for block hashes (the proof-of-work target) and transaction hashes

pub mod hash;

pub use hash::{hash_block, sha256, sha256_multi};
