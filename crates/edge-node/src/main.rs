//! edge-node: backend node for the edge-router pool. Serves assets from
//! disk through a TTL cache and answers latency-simulating liveness pings.

mod assets;
mod cache;
mod config;
mod server;

use std::sync::Arc;
use std::time::Duration;

use cache::AssetCache;
use config::NodeConfig;
use server::AppState;

fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1).cloned())
        .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
        .or_else(|| std::env::var("EDGE_NODE_CONFIG").ok())
        .unwrap_or_else(|| "edge-node.toml".to_string());

    let config = NodeConfig::load(&config_path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        init_tracing();

        tracing::info!(
            config_path = %config_path,
            node_id = %config.node_id,
            listen_address = %config.server.listen_address,
            base_latency_ms = config.base_latency_ms,
            cache_ttl_seconds = config.cache.ttl_seconds,
            assets_dir = %config.assets_dir,
            "Starting edge-node"
        );

        run(config).await
    })
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    let cache = Arc::new(AssetCache::new(Duration::from_secs(
        config.cache.ttl_seconds,
    )));

    let state = AppState { config, cache };

    server::run(state).await
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
