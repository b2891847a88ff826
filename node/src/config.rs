//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use powchain_protocol::MAX_MESSAGE_SIZE;
use powchain_types::{Address, Amount, ChainParams, DEFAULT_DIFFICULTY, DEFAULT_MINING_REWARD};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Interface to accept peer connections on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port to listen on for P2P connections. `0` picks a free port.
    #[serde(default = "default_p2p_port")]
    pub port: u16,

    /// Leading zero hex digits every block hash must carry.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,

    /// Value credited to the miner for each block.
    #[serde(default = "default_mining_reward")]
    pub mining_reward: u64,

    /// Beneficiary of mining rewards.
    #[serde(default = "default_miner_address")]
    pub miner_address: String,

    /// Peer addresses ("host:port") to dial on startup.
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,

    /// Where the chain is loaded from and saved to, if anywhere.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How long `stop` waits for peer sessions to finish.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Largest frame body accepted from or sent to a peer, in bytes. A CHAIN
    /// reply above it is skipped, so raise it once the chain outgrows it.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_p2p_port() -> u16 {
    6001
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}

fn default_mining_reward() -> u64 {
    DEFAULT_MINING_REWARD
}

fn default_miner_address() -> String {
    Address::MINER.to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_max_message_size() -> usize {
    MAX_MESSAGE_SIZE
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Chain parameters derived from this configuration.
    pub fn chain_params(&self) -> Result<ChainParams, NodeError> {
        Ok(ChainParams::new(
            self.difficulty,
            Amount::new(self.mining_reward),
            Address::new(self.miner_address.clone()),
        )?)
    }

    /// `listen_addr:port`, ready for binding.
    pub fn listen_endpoint(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_p2p_port(),
            difficulty: default_difficulty(),
            mining_reward: default_mining_reward(),
            miner_address: default_miner_address(),
            bootstrap_peers: Vec::new(),
            snapshot_path: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            max_message_size: default_max_message_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig {
            snapshot_path: Some(PathBuf::from("/tmp/chain.json")),
            bootstrap_peers: vec!["127.0.0.1:6002".into()],
            ..NodeConfig::default()
        };
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.difficulty, 2);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.max_message_size, MAX_MESSAGE_SIZE);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            port = 7100
            difficulty = 3
            miner_address = "Dana"
            max_message_size = 67108864
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.port, 7100);
        assert_eq!(config.listen_endpoint(), "0.0.0.0:7100");
        assert_eq!(config.max_message_size, 64 * 1024 * 1024);

        let params = config.chain_params().unwrap();
        assert_eq!(params.difficulty, 3);
        assert_eq!(params.miner_address.as_str(), "Dana");
        assert_eq!(params.mining_reward, Amount::new(100));
    }

    #[test]
    fn impossible_difficulty_rejected() {
        let config = NodeConfig {
            difficulty: 65,
            ..NodeConfig::default()
        };
        assert!(matches!(config.chain_params(), Err(NodeError::Params(_))));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/powchain.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "log_format = \"json\"\nshutdown_timeout_secs = 1\n").unwrap();
        let config = NodeConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(1));
    }
}
