//! Value-transfer records.

use serde::{Deserialize, Serialize};

use powchain_crypto::sha256;
use powchain_types::{Address, Amount, BlockHash, Timestamp};

/// A transfer of `amount` from `sender` to `receiver`.
///
/// Immutable once built: fields are only readable, and a block's hash
/// commits to every one of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    sender: Address,
    receiver: Address,
    amount: Amount,
    timestamp: Timestamp,
}

impl Transaction {
    /// Create a transaction stamped with the current time.
    pub fn new(sender: impl Into<Address>, receiver: impl Into<Address>, amount: Amount) -> Self {
        Self::with_timestamp(sender, receiver, amount, Timestamp::now())
    }

    pub fn with_timestamp(
        sender: impl Into<Address>,
        receiver: impl Into<Address>,
        amount: Amount,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            timestamp,
        }
    }

    /// A system-issued credit (genesis allocation or mining reward).
    pub fn system_credit(receiver: impl Into<Address>, amount: Amount) -> Self {
        Self::new(Address::system(), receiver, amount)
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Whether the sender is the system sentinel (exempt from balance checks).
    pub fn is_system_issued(&self) -> bool {
        self.sender.is_system()
    }

    /// Append the canonical byte encoding used in block hash preimages.
    ///
    /// Strings are length-prefixed so adjacent fields cannot alias.
    pub fn write_preimage(&self, buf: &mut Vec<u8>) {
        write_str(buf, self.sender.as_str());
        write_str(buf, self.receiver.as_str());
        buf.extend_from_slice(&self.amount.raw().to_be_bytes());
        buf.extend_from_slice(&self.timestamp.as_secs().to_be_bytes());
    }

    /// SHA-256 over amount, timestamp, sender and receiver.
    pub fn calculate_hash(&self) -> BlockHash {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&self.amount.raw().to_be_bytes());
        buf.extend_from_slice(&self.timestamp.as_secs().to_be_bytes());
        write_str(&mut buf, self.sender.as_str());
        write_str(&mut buf, self.receiver.as_str());
        BlockHash::new(sha256(&buf))
    }
}

fn write_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}
