//! Connection setup shared by the acceptor and outbound dials.
//!
//! Both paths split the stream, register the write half in the peer set,
//! spawn a session for the read half and record its handle.

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tokio::sync::broadcast;

use powchain_messages::Message;
use powchain_network::{send_message, Direction, NetworkError, PeerId};

use crate::session::{spawn_session, SessionContext};

/// Register a connected stream and start its session.
pub async fn attach_connection(
    ctx: &SessionContext,
    stream: TcpStream,
    addr: SocketAddr,
    direction: Direction,
    shutdown_rx: broadcast::Receiver<()>,
) -> PeerId {
    let (reader, writer) = stream.into_split();

    let (peer, writer) = {
        let mut peers = ctx.peers.lock().await;
        let registered = peers.register(addr, direction, writer);
        ctx.metrics.peer_count.set(peers.len() as i64);
        registered
    };

    let task = spawn_session(ctx.clone(), peer, reader, writer, shutdown_rx);
    // A session that already ended has removed itself; its handle is done.
    let _ = ctx.peers.lock().await.attach_task(peer, task);

    tracing::info!(peer = %peer, addr = %addr, direction = %direction, "peer connected");
    peer
}

/// Dial `addr`, attach the connection and ask the peer for its length.
///
/// A LENGTH reply larger than ours triggers a GET_CHAIN from the session.
pub async fn connect_to_peer(
    ctx: &SessionContext,
    addr: &str,
    shutdown_rx: broadcast::Receiver<()>,
) -> Result<PeerId, NetworkError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| NetworkError::ConnectionFailed {
            addr: addr.to_string(),
            source,
        })?;
    let remote = stream.peer_addr()?;

    let peer = attach_connection(ctx, stream, remote, Direction::Outbound, shutdown_rx).await;

    let writer = ctx
        .peers
        .lock()
        .await
        .writer(peer)
        .ok_or(NetworkError::PeerNotFound(peer))?;
    send_message(&writer, &Message::GetLength).await?;
    Ok(peer)
}
