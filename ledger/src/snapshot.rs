//! Chain snapshots: the full block sequence as a JSON array on disk.
//!
//! Loading does not validate. Callers that care run [`Ledger::verify`]
//! on the result.

use std::fs;
use std::path::Path;

use powchain_types::ChainParams;

use crate::block::Block;
use crate::error::LedgerError;
use crate::ledger::Ledger;

/// Write `blocks` to `path` as pretty-printed JSON, replacing any existing file.
pub fn write_snapshot(path: impl AsRef<Path>, blocks: &[Block]) -> Result<(), LedgerError> {
    let json = serde_json::to_string_pretty(blocks)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a block sequence previously written by [`write_snapshot`].
pub fn read_snapshot(path: impl AsRef<Path>) -> Result<Vec<Block>, LedgerError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

impl Ledger {
    /// Serialize the chain to a JSON string.
    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(self.blocks())?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), LedgerError> {
        let path = path.as_ref();
        write_snapshot(path, self.blocks())?;
        tracing::info!(path = %path.display(), blocks = self.len(), "snapshot saved");
        Ok(())
    }

    /// Build a ledger from a snapshot file. The chain is taken as-is.
    pub fn load_from_file(path: impl AsRef<Path>, params: ChainParams) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let blocks = read_snapshot(path)?;
        tracing::info!(path = %path.display(), blocks = blocks.len(), "snapshot loaded");
        Self::from_blocks(params, blocks)
    }
}
