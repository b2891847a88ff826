//! Node-wide stop signal.
//!
//! `NodeRuntime` owns one [`ShutdownController`]. The acceptor subscribes
//! when `start()` spawns it, and every peer session is handed its own
//! receiver when its connection is attached. Each runs a biased `select!`
//! with the receiver ahead of its accept or frame read, so a pending signal
//! wins over queued input. `stop()` fires the signal, then joins the
//! acceptor and the session handles drained from the peer set. The daemon
//! ties the same controller to SIGINT/SIGTERM via
//! [`ShutdownController::wait_for_signal`].
//!
//! The signal is a one-shot `broadcast` send: a receiver created after it
//! fired never sees it, which is why a stopped node refuses to dial.

use tokio::signal;
use tokio::sync::broadcast;

#[derive(Debug)]
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver that resolves once [`shutdown`](Self::shutdown) is called.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify every current subscriber. Safe to call more than once.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// Block until the process receives SIGINT or SIGTERM, then notify.
    pub async fn wait_for_signal(&self) {
        tokio::select! {
            _ = signal::ctrl_c() => tracing::info!(signal = "SIGINT", "stop requested"),
            _ = terminate() => tracing::info!(signal = "SIGTERM", "stop requested"),
        }
        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on SIGTERM. Never resolves where SIGTERM cannot be observed.
#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut sig) => {
            sig.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, only SIGINT stops the node");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
