use thiserror::Error;

use crate::peer::PeerId;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("connection to {addr} failed: {source}")]
    ConnectionFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("peer {0} not found")]
    PeerNotFound(PeerId),

    #[error("protocol error: {0}")]
    Protocol(#[from] powchain_protocol::ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
