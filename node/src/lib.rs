//! powchain full node.
//!
//! The node:
//! - accepts and dials peers, one session task per connection
//! - answers chain and length requests
//! - adopts longer valid chains and blocks that extend its tip
//! - mines blocks and propagates them to every connected peer

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod peer_connector;
pub mod session;
pub mod shutdown;
pub mod sync;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::NodeRuntime;
pub use peer_connector::{attach_connection, connect_to_peer};
pub use session::{handle_message, spawn_session, SessionContext, SharedPeers};
pub use shutdown::ShutdownController;
pub use sync::{SharedLedger, SyncCoordinator};
