//! The node runtime: owns the ledger, the peer set and every background task.
//!
//! Tasks:
//! - one acceptor, registering inbound peers until shutdown;
//! - one session per peer (inbound or outbound), tracked in the peer set;
//! - mining, run on the blocking pool while holding the ledger lock.
//!
//! The ledger lock and the peer-set lock are never held together.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use powchain_ledger::{write_snapshot, Block, BlockReceipt, Ledger, Transaction};
use powchain_messages::Message;
use powchain_network::{broadcast, send_message, Direction, NetworkError, PeerId, PeerInfo, PeerSet};
use powchain_types::Address;

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::metrics::NodeMetrics;
use crate::peer_connector::{attach_connection, connect_to_peer};
use crate::session::{SessionContext, SharedPeers};
use crate::shutdown::ShutdownController;
use crate::sync::{SharedLedger, SyncCoordinator};

pub struct NodeRuntime {
    config: NodeConfig,
    ledger: SharedLedger,
    peers: SharedPeers,
    metrics: Arc<NodeMetrics>,
    shutdown: Arc<ShutdownController>,
    local_addr: Option<SocketAddr>,
    /// Handles for node-level tasks (the acceptor). Session handles live in
    /// the peer set.
    task_handles: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    /// Create a node with a fresh chain holding only genesis.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let ledger = Ledger::new(config.chain_params()?)?;
        Ok(Self::with_ledger(config, ledger))
    }

    /// Create a node around an existing ledger (e.g. loaded from a snapshot).
    pub fn with_ledger(config: NodeConfig, ledger: Ledger) -> Self {
        let metrics = Arc::new(NodeMetrics::new());
        metrics.chain_length.set(ledger.len() as i64);
        Self {
            config,
            ledger: Arc::new(Mutex::new(ledger)),
            peers: Arc::new(Mutex::new(PeerSet::new())),
            metrics,
            shutdown: Arc::new(ShutdownController::new()),
            local_addr: None,
            task_handles: Vec::new(),
        }
    }

    fn session_context(&self) -> SessionContext {
        SessionContext {
            sync: SyncCoordinator::new(Arc::clone(&self.ledger), Arc::clone(&self.metrics)),
            peers: Arc::clone(&self.peers),
            metrics: Arc::clone(&self.metrics),
            max_message_size: self.config.max_message_size,
        }
    }

    /// Bind the listener and spawn the acceptor. Returns the bound address.
    pub async fn start(&mut self) -> Result<SocketAddr, NodeError> {
        if self.local_addr.is_some() {
            return Err(NodeError::AlreadyRunning);
        }

        let endpoint = self.config.listen_endpoint();
        let listener = TcpListener::bind(&endpoint)
            .await
            .map_err(|source| NetworkError::Bind {
                addr: endpoint.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        self.local_addr = Some(local_addr);
        tracing::info!(addr = %local_addr, "P2P listener started");

        let ctx = self.session_context();
        let shutdown = Arc::clone(&self.shutdown);
        let mut shutdown_rx = self.shutdown.subscribe();

        let acceptor = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        tracing::info!("P2P listener shutting down");
                        break;
                    }
                    result = listener.accept() => {
                        match result {
                            Ok((stream, addr)) => {
                                attach_connection(
                                    &ctx,
                                    stream,
                                    addr,
                                    Direction::Inbound,
                                    shutdown.subscribe(),
                                )
                                .await;
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "P2P accept error");
                            }
                        }
                    }
                }
            }
        });
        self.task_handles.push(acceptor);

        Ok(local_addr)
    }

    /// Dial a peer and start syncing with it.
    ///
    /// Only a started node dials out, so that every session it spawns is
    /// reached by the next `stop()`.
    pub async fn connect(&self, addr: &str) -> Result<PeerId, NodeError> {
        if self.local_addr.is_none() {
            return Err(NodeError::NotRunning);
        }
        let peer = connect_to_peer(&self.session_context(), addr, self.shutdown.subscribe()).await?;
        Ok(peer)
    }

    /// Dial every configured bootstrap peer. Failures are logged and skipped.
    pub async fn connect_bootstrap_peers(&self) -> Vec<PeerId> {
        let mut connected = Vec::new();
        for addr in &self.config.bootstrap_peers {
            match self.connect(addr).await {
                Ok(peer) => connected.push(peer),
                Err(e) => tracing::warn!(addr = %addr, error = %e, "bootstrap peer unreachable"),
            }
        }
        connected
    }

    /// Mine `transactions` into a new block and send it to every peer.
    ///
    /// The ledger stays locked for the whole nonce search, so sessions that
    /// need it wait until the block has landed.
    pub async fn mine_and_broadcast(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<BlockReceipt, NodeError> {
        let mut ledger = Arc::clone(&self.ledger).lock_owned().await;
        let count = transactions.len();
        tracing::info!(transactions = count, "mining new block");

        let (receipt, len) = tokio::task::spawn_blocking(move || {
            let receipt = ledger.add_block(transactions);
            (receipt, ledger.len())
        })
        .await?;
        let receipt = receipt?;

        self.metrics.blocks_mined.inc();
        self.metrics.chain_length.set(len as i64);
        self.metrics
            .mining_time_ms
            .observe(receipt.stats.elapsed.as_secs_f64() * 1000.0);

        let targets = self.peers.lock().await.writers();
        let result = broadcast(&targets, &Message::NewBlock(receipt.block.clone())).await?;
        tracing::info!(
            index = receipt.block.index,
            hash = %receipt.block.hash,
            peers = result.sent,
            "block mined and broadcast"
        );
        Ok(receipt)
    }

    /// Ask one peer for its full chain.
    pub async fn request_chain(&self, peer: PeerId) -> Result<(), NodeError> {
        let writer = self
            .peers
            .lock()
            .await
            .writer(peer)
            .ok_or(NetworkError::PeerNotFound(peer))?;
        send_message(&writer, &Message::GetChain).await?;
        Ok(())
    }

    pub async fn peer_count(&self) -> usize {
        self.peers.lock().await.len()
    }

    pub async fn peers(&self) -> Vec<PeerInfo> {
        self.peers.lock().await.info()
    }

    /// The bound listener address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub async fn chain_length(&self) -> usize {
        self.ledger.lock().await.len()
    }

    pub async fn chain(&self) -> Vec<Block> {
        self.ledger.lock().await.blocks().to_vec()
    }

    pub async fn balance(&self, address: &Address) -> i128 {
        self.ledger.lock().await.get_balance(address)
    }

    pub async fn is_chain_valid(&self) -> bool {
        self.ledger.lock().await.is_chain_valid()
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Controller that stops this node's tasks when triggered.
    pub fn shutdown_handle(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Write the chain to the configured snapshot path.
    pub async fn save_snapshot(&self) -> Result<PathBuf, NodeError> {
        let path = self
            .config
            .snapshot_path
            .clone()
            .ok_or(NodeError::NoSnapshotPath)?;
        let blocks = self.chain().await;
        write_snapshot(&path, &blocks)?;
        tracing::info!(path = %path.display(), blocks = blocks.len(), "snapshot saved");
        Ok(path)
    }

    /// Stop accepting, close every peer and wait for all tasks.
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        tracing::info!("node stopping");
        self.shutdown.shutdown();

        let timeout = self.config.shutdown_timeout();
        join_all(self.task_handles.drain(..).collect(), timeout).await;

        // Close every write half so remote ends see EOF.
        let drained = self.peers.lock().await.drain();
        self.metrics.peer_count.set(0);
        let mut sessions = Vec::with_capacity(drained.len());
        for peer in drained {
            {
                let mut w = peer.writer.lock().await;
                let _ = w.shutdown().await;
            }
            if let Some(task) = peer.task {
                sessions.push(task);
            }
        }
        tracing::info!(sessions = sessions.len(), "all peers disconnected");
        join_all(sessions, timeout).await;

        self.local_addr = None;
        tracing::info!("node stopped");
        Ok(())
    }
}

/// Await every handle, giving up after `timeout`.
async fn join_all(handles: Vec<JoinHandle<()>>, timeout: Duration) {
    let wait_all = async {
        for handle in handles {
            let _ = handle.await;
        }
    };
    if tokio::time::timeout(timeout, wait_all).await.is_err() {
        tracing::warn!(?timeout, "shutdown timeout, some tasks may still be running");
    }
}
