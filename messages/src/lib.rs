//! Peer-to-peer message envelope.
//!
//! Every message on the wire is a JSON object `{"type": TAG, "data": payload}`.
//! Requests carry no `data`.

use std::fmt;

use powchain_ledger::Block;
use serde::{Deserialize, Serialize};

/// A message exchanged between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Ask the peer for its full chain.
    GetChain,
    /// A full chain, in reply to `GetChain` or pushed unsolicited.
    Chain(Vec<Block>),
    /// Ask the peer for its chain length.
    GetLength,
    /// Reply to `GetLength`.
    Length(u64),
    /// A freshly mined block.
    NewBlock(Block),
}

/// Payload-free discriminant of [`Message`], for logging and metrics labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    GetChain,
    Chain,
    GetLength,
    Length,
    NewBlock,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::GetChain,
        MessageKind::Chain,
        MessageKind::GetLength,
        MessageKind::Length,
        MessageKind::NewBlock,
    ];

    /// The wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::GetChain => "GET_CHAIN",
            MessageKind::Chain => "CHAIN",
            MessageKind::GetLength => "GET_LENGTH",
            MessageKind::Length => "LENGTH",
            MessageKind::NewBlock => "NEW_BLOCK",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::GetChain => MessageKind::GetChain,
            Message::Chain(_) => MessageKind::Chain,
            Message::GetLength => MessageKind::GetLength,
            Message::Length(_) => MessageKind::Length,
            Message::NewBlock(_) => MessageKind::NewBlock,
        }
    }
}
