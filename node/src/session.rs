//! Peer sessions: one task per connection that reads frames, dispatches
//! them and replies on the same connection.
//!
//! A session ends when the peer closes, a read or reply fails, the framing
//! breaks, or shutdown is signalled. Bodies that fail to decode are skipped.
//! On exit it removes itself from the peer set.

use std::sync::Arc;

use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use powchain_messages::Message;
use powchain_network::{send_message, write_framed, NetworkError, PeerId, PeerSet, PeerWriter};
use powchain_protocol::{decode, encode_with_limit, read_frame_with_limit, ProtocolError};

use crate::metrics::NodeMetrics;
use crate::sync::SyncCoordinator;

/// The peer set shared by the acceptor, sessions and broadcasters.
pub type SharedPeers = Arc<Mutex<PeerSet>>;

/// Everything a session needs besides its own connection.
#[derive(Clone)]
pub struct SessionContext {
    pub sync: SyncCoordinator,
    pub peers: SharedPeers,
    pub metrics: Arc<NodeMetrics>,
    /// Frame body cap for reads and CHAIN replies.
    pub max_message_size: usize,
}

/// Spawn the read/dispatch loop for one connection.
pub fn spawn_session(
    ctx: SessionContext,
    peer: PeerId,
    reader: OwnedReadHalf,
    writer: PeerWriter,
    shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match session_loop(&ctx, peer, reader, &writer, shutdown_rx).await {
            Ok(()) => tracing::info!(peer = %peer, "peer disconnected"),
            Err(e) => tracing::warn!(peer = %peer, error = %e, "peer disconnected with error"),
        }

        let mut peers = ctx.peers.lock().await;
        peers.remove(peer);
        ctx.metrics.peer_count.set(peers.len() as i64);
        drop(peers);
        tracing::debug!(peer = %peer, "peer cleaned up after disconnect");
    })
}

async fn session_loop(
    ctx: &SessionContext,
    peer: PeerId,
    mut reader: OwnedReadHalf,
    writer: &PeerWriter,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), NetworkError> {
    loop {
        let frame = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                tracing::debug!(peer = %peer, "session shutting down");
                return Ok(());
            }
            frame = read_frame_with_limit(&mut reader, ctx.max_message_size) => frame,
        };

        match frame.and_then(|body| body.map(|b| decode(&b)).transpose()) {
            Ok(Some(message)) => handle_message(ctx, peer, writer, message).await?,
            Ok(None) => return Ok(()),
            Err(ProtocolError::UnknownType(tag)) => {
                ctx.metrics.malformed_messages.inc();
                tracing::warn!(peer = %peer, tag = %tag, "unknown message type ignored");
            }
            Err(e) if e.is_recoverable() => {
                ctx.metrics.malformed_messages.inc();
                tracing::warn!(peer = %peer, error = %e, "malformed message ignored");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Act on one decoded message. Only a failed reply is an error.
pub async fn handle_message(
    ctx: &SessionContext,
    peer: PeerId,
    writer: &PeerWriter,
    message: Message,
) -> Result<(), NetworkError> {
    tracing::debug!(peer = %peer, kind = %message.kind(), "message received");

    match message {
        Message::GetChain => {
            let chain = ctx.sync.chain_snapshot().await;
            let blocks = chain.len();
            // Nothing has been written yet, so a failed encode leaves the
            // stream usable.
            match encode_with_limit(&Message::Chain(chain), ctx.max_message_size) {
                Ok(frame) => write_framed(writer, &frame).await?,
                Err(e) => {
                    ctx.metrics.oversized_replies.inc();
                    tracing::warn!(peer = %peer, blocks, error = %e, "CHAIN reply skipped");
                }
            }
        }
        Message::Chain(blocks) => {
            if let Err(e) = ctx.sync.on_chain(blocks).await {
                tracing::error!(peer = %peer, error = %e, "chain evaluation failed");
            }
        }
        Message::GetLength => {
            let len = ctx.sync.chain_length().await;
            send_message(writer, &Message::Length(len)).await?;
        }
        Message::Length(remote_len) => {
            if ctx.sync.wants_chain(remote_len).await {
                tracing::info!(peer = %peer, remote_len, "peer has a longer chain, requesting it");
                send_message(writer, &Message::GetChain).await?;
            }
        }
        Message::NewBlock(block) => {
            // Rejections are logged and counted by the coordinator.
            let _ = ctx.sync.on_new_block(block).await;
        }
    }
    Ok(())
}
