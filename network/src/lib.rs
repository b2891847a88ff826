//! P2P networking layer.
//!
//! Tracks live peer connections and writes framed messages to them. Reading
//! and dispatching belong to the node's session tasks.

pub mod broadcast;
pub mod error;
pub mod peer;
pub mod peer_set;

pub use broadcast::{broadcast, send_message, write_framed, BroadcastResult};
pub use error::NetworkError;
pub use peer::{Direction, PeerHandle, PeerId, PeerInfo, PeerWriter};
pub use peer_set::PeerSet;
