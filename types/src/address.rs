//! Account identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An account identifier appearing as a transaction's sender or receiver.
///
/// Identifiers are free-form names; the only reserved value is
/// [`Address::SYSTEM`], the issuer of genesis allocations and mining rewards.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Sender used for system-issued value. Exempt from balance checks.
    pub const SYSTEM: &'static str = "SYSTEM";

    /// Default beneficiary of mining rewards.
    pub const MINER: &'static str = "MINER";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The system sentinel address.
    pub fn system() -> Self {
        Self::new(Self::SYSTEM)
    }

    /// The default miner sentinel address.
    pub fn miner() -> Self {
        Self::new(Self::MINER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the system sentinel.
    pub fn is_system(&self) -> bool {
        self.0 == Self::SYSTEM
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
