//! Framed writes to one peer or to many.
//!
//! Writers are passed in already cloned out of the [`PeerSet`](crate::PeerSet),
//! so no peer-set lock is held while bytes go out.

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use powchain_messages::Message;
use powchain_protocol::encode;

use crate::error::NetworkError;
use crate::peer::{PeerId, PeerWriter};

/// Outcome of a broadcast.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastResult {
    /// Number of peers the frame was written to.
    pub sent: usize,
    /// Peers whose write failed. Their sessions will notice and clean up.
    pub failed: Vec<PeerId>,
}

/// Write an already-encoded frame to the given write half and flush.
pub async fn write_framed(writer: &Mutex<OwnedWriteHalf>, frame: &[u8]) -> std::io::Result<()> {
    let mut w = writer.lock().await;
    w.write_all(frame).await?;
    w.flush().await?;
    Ok(())
}

/// Encode and send one message to one peer.
pub async fn send_message(writer: &PeerWriter, message: &Message) -> Result<(), NetworkError> {
    let frame = encode(message)?;
    write_framed(writer, &frame).await?;
    Ok(())
}

/// Send `message` to every target. The message is encoded once.
///
/// A failed write is logged and recorded; it does not stop delivery to the
/// remaining peers.
pub async fn broadcast(
    targets: &[(PeerId, PeerWriter)],
    message: &Message,
) -> Result<BroadcastResult, NetworkError> {
    let frame = encode(message)?;
    let mut result = BroadcastResult::default();

    for (id, writer) in targets {
        match write_framed(writer, &frame).await {
            Ok(()) => result.sent += 1,
            Err(e) => {
                tracing::warn!(peer = %id, error = %e, kind = %message.kind(), "broadcast write failed");
                result.failed.push(*id);
            }
        }
    }

    tracing::debug!(
        kind = %message.kind(),
        sent = result.sent,
        failed = result.failed.len(),
        "broadcast complete"
    );
    Ok(result)
}
