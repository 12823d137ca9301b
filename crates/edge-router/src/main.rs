//! edge-router: latency-aware router that probes a pool of edge nodes per
//! request and serves assets from whichever responds fastest.

mod config;
mod error;
mod forward;
mod probe;
mod select;
mod server;
mod stats;

use std::time::Duration;

use config::RouterConfig;
use server::AppState;
use stats::RouterStats;

fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1).cloned())
        .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
        .or_else(|| std::env::var("ROUTER_CONFIG").ok())
        .unwrap_or_else(|| "edge-router.toml".to_string());

    // Load configuration (rejects an empty edge list up front)
    let config = RouterConfig::load(&config_path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        init_tracing();

        tracing::info!(
            config_path = %config_path,
            listen_address = %config.server.listen_address,
            edges = ?config.edges,
            "Starting edge-router"
        );

        run(config).await
    })
}

async fn run(config: RouterConfig) -> anyhow::Result<()> {
    // One client per timeout class: probes are light liveness pings, asset
    // fetches are heavier and get a longer budget.
    let probe_client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.probe.timeout_ms))
        .build()?;

    let fetch_client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.fetch.timeout_ms))
        .build()?;

    let state = AppState {
        config,
        probe_client,
        fetch_client,
        stats: RouterStats::new(),
    };

    server::run(state).await
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
