//! Per-connection peer records.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use powchain_types::Timestamp;

/// Shared write half of a peer's TCP stream.
///
/// The session task and broadcasters each hold a clone; the inner mutex keeps
/// frames from interleaving.
pub type PeerWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Locally unique identifier for one connection. Never reused within a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(u64);

impl PeerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// Which side opened the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

/// Snapshot of a peer's metadata, safe to hand out of the peer set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: PeerId,
    pub addr: SocketAddr,
    pub direction: Direction,
    pub connected_at: Timestamp,
}

/// A live connection owned by the peer set.
#[derive(Debug)]
pub struct PeerHandle {
    pub info: PeerInfo,
    pub writer: PeerWriter,
    /// The session task reading from this peer, once spawned.
    pub task: Option<JoinHandle<()>>,
}
