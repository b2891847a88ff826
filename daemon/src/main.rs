//! powchain daemon: runs a node, or inspects a chain snapshot offline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use powchain_ledger::Ledger;
use powchain_node::{init_logging, NodeConfig, NodeRuntime};
use powchain_types::Address;

#[derive(Parser)]
#[command(name = "powchain-daemon", about = "powchain proof-of-work node daemon")]
struct Cli {
    /// Interface to accept peer connections on.
    #[arg(long, env = "POWCHAIN_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Port for P2P connections.
    #[arg(long, env = "POWCHAIN_PORT")]
    port: Option<u16>,

    /// Leading zero hex digits required in every block hash.
    #[arg(long, env = "POWCHAIN_DIFFICULTY")]
    difficulty: Option<usize>,

    /// Value credited to the miner per block.
    #[arg(long, env = "POWCHAIN_MINING_REWARD")]
    reward: Option<u64>,

    /// Beneficiary of mining rewards.
    #[arg(long, env = "POWCHAIN_MINER_ADDRESS")]
    miner: Option<String>,

    /// Bootstrap peer addresses (comma-separated: "10.0.0.2:6001,10.0.0.3:6001").
    #[arg(long, env = "POWCHAIN_BOOTSTRAP_PEERS", value_delimiter = ',')]
    bootstrap_peers: Vec<String>,

    /// Chain snapshot loaded on start and written on exit.
    #[arg(long, env = "POWCHAIN_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "POWCHAIN_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "POWCHAIN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the node until SIGINT/SIGTERM.
    Run {
        /// Mine a reward-only block every N seconds.
        #[arg(long, env = "POWCHAIN_MINE_INTERVAL")]
        mine_interval: Option<u64>,
    },
    /// Print the length and validity of a snapshot.
    Inspect {
        snapshot: PathBuf,
        /// Also print every block.
        #[arg(long)]
        blocks: bool,
    },
    /// Print the balance of an address in a snapshot.
    Balance { snapshot: PathBuf, address: String },
}

impl Cli {
    /// Layer CLI flags and env vars over `base`.
    fn apply(&self, base: NodeConfig) -> NodeConfig {
        NodeConfig {
            listen_addr: self.listen_addr.clone().unwrap_or(base.listen_addr),
            port: self.port.unwrap_or(base.port),
            difficulty: self.difficulty.unwrap_or(base.difficulty),
            mining_reward: self.reward.unwrap_or(base.mining_reward),
            miner_address: self.miner.clone().unwrap_or(base.miner_address),
            bootstrap_peers: if self.bootstrap_peers.is_empty() {
                base.bootstrap_peers
            } else {
                self.bootstrap_peers.clone()
            },
            snapshot_path: self.snapshot.clone().or(base.snapshot_path),
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            ..base
        }
    }

    fn resolve_config(&self) -> anyhow::Result<NodeConfig> {
        let base = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => NodeConfig::default(),
        };
        Ok(self.apply(base))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(config.log_format()?, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config file");
    }

    match cli.command {
        Command::Run { mine_interval } => {
            let period = mine_interval.filter(|secs| *secs > 0).map(Duration::from_secs);
            run(config, period).await
        }
        Command::Inspect { snapshot, blocks } => inspect(&config, &snapshot, blocks),
        Command::Balance { snapshot, address } => balance(&config, &snapshot, &address),
    }
}

/// Load the configured snapshot, falling back to a fresh chain when it is
/// missing or fails validation.
fn initial_ledger(config: &NodeConfig) -> anyhow::Result<Ledger> {
    let params = config.chain_params()?;
    let Some(path) = config.snapshot_path.as_ref().filter(|p| p.exists()) else {
        return Ok(Ledger::new(params)?);
    };

    let ledger = Ledger::load_from_file(path, params.clone())
        .with_context(|| format!("loading snapshot {}", path.display()))?;
    match ledger.verify() {
        Ok(()) => {
            tracing::info!(path = %path.display(), blocks = ledger.len(), "snapshot is valid");
            Ok(ledger)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "snapshot invalid, starting from genesis");
            Ok(Ledger::new(params)?)
        }
    }
}

async fn run(config: NodeConfig, mine_interval: Option<Duration>) -> anyhow::Result<()> {
    tracing::info!(
        endpoint = %config.listen_endpoint(),
        difficulty = config.difficulty,
        reward = config.mining_reward,
        miner = %config.miner_address,
        "starting powchain node"
    );
    if !config.bootstrap_peers.is_empty() {
        tracing::info!(peers = %config.bootstrap_peers.join(", "), "bootstrap peers");
    }

    let ledger = initial_ledger(&config)?;
    let mut node = NodeRuntime::with_ledger(config, ledger);
    node.start().await?;
    let dialed = node.connect_bootstrap_peers().await;
    tracing::info!(connected = dialed.len(), "bootstrap complete");

    let shutdown = node.shutdown_handle();
    let mut shutdown_rx = shutdown.subscribe();
    let signals = tokio::spawn({
        let shutdown = Arc::clone(&shutdown);
        async move { shutdown.wait_for_signal().await }
    });

    match mine_interval {
        Some(period) => {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = node.mine_and_broadcast(Vec::new()).await {
                            tracing::warn!(error = %e, "periodic mining failed");
                        }
                    }
                }
            }
        }
        None => {
            let _ = shutdown_rx.recv().await;
        }
    }

    tracing::info!("shutdown signal received, stopping node");
    node.stop().await?;
    signals.abort();

    if node.config().snapshot_path.is_some() {
        node.save_snapshot().await?;
    }
    tracing::info!("powchain daemon exited cleanly");
    Ok(())
}

fn inspect(config: &NodeConfig, snapshot: &Path, blocks: bool) -> anyhow::Result<()> {
    let ledger = Ledger::load_from_file(snapshot, config.chain_params()?)
        .with_context(|| format!("loading snapshot {}", snapshot.display()))?;

    if blocks {
        for block in ledger.blocks() {
            println!("{block}");
        }
    }
    println!("length: {}", ledger.len());
    if let Some(tip) = ledger.tip() {
        println!("tip:    {}", tip.hash);
    }
    match ledger.verify() {
        Ok(()) => println!("valid:  yes"),
        Err(e) => println!("valid:  no ({e})"),
    }
    Ok(())
}

fn balance(config: &NodeConfig, snapshot: &Path, address: &str) -> anyhow::Result<()> {
    let ledger = Ledger::load_from_file(snapshot, config.chain_params()?)
        .with_context(|| format!("loading snapshot {}", snapshot.display()))?;
    println!("{}", ledger.get_balance(&Address::new(address)));
    Ok(())
}
