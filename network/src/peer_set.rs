//! Peer set: maps peer ids to their connection handles.
//!
//! Shared behind a mutex by the acceptor (which registers inbound peers),
//! outbound connects, session tasks (which remove themselves on exit) and
//! broadcasters (which snapshot writers and release the lock before
//! writing).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use powchain_types::Timestamp;

use crate::peer::{Direction, PeerHandle, PeerId, PeerInfo, PeerWriter};

#[derive(Debug, Default)]
pub struct PeerSet {
    peers: HashMap<PeerId, PeerHandle>,
    next_id: u64,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection and assign it a fresh id.
    pub fn register(
        &mut self,
        addr: SocketAddr,
        direction: Direction,
        writer: OwnedWriteHalf,
    ) -> (PeerId, PeerWriter) {
        self.next_id += 1;
        let id = PeerId::new(self.next_id);
        let writer = Arc::new(Mutex::new(writer));
        self.peers.insert(
            id,
            PeerHandle {
                info: PeerInfo {
                    id,
                    addr,
                    direction,
                    connected_at: Timestamp::now(),
                },
                writer: writer.clone(),
                task: None,
            },
        );
        (id, writer)
    }

    /// Record the session task for `id`.
    ///
    /// Returns the handle back if the peer has already been removed, so the
    /// caller can still await it.
    pub fn attach_task(&mut self, id: PeerId, task: JoinHandle<()>) -> Option<JoinHandle<()>> {
        match self.peers.get_mut(&id) {
            Some(peer) => {
                peer.task = Some(task);
                None
            }
            None => Some(task),
        }
    }

    pub fn remove(&mut self, id: PeerId) -> Option<PeerHandle> {
        self.peers.remove(&id)
    }

    /// Look up a peer's writer (returns a cheaply cloned `Arc`).
    pub fn writer(&self, id: PeerId) -> Option<PeerWriter> {
        self.peers.get(&id).map(|p| p.writer.clone())
    }

    /// Clone every writer, for writing after the lock is released.
    pub fn writers(&self) -> Vec<(PeerId, PeerWriter)> {
        self.peers
            .iter()
            .map(|(id, p)| (*id, p.writer.clone()))
            .collect()
    }

    pub fn info(&self) -> Vec<PeerInfo> {
        let mut infos: Vec<PeerInfo> = self.peers.values().map(|p| p.info.clone()).collect();
        infos.sort_by_key(|i| i.id);
        infos
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Remove and return every peer.
    pub fn drain(&mut self) -> Vec<PeerHandle> {
        self.peers.drain().map(|(_, p)| p).collect()
    }
}
