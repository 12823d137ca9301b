//! Configuration types and loading logic.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

/// Top-level node configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Identity stamped into ping responses and the `x-node` header.
    #[serde(default = "default_node_id")]
    pub node_id: String,

    /// Simulated base latency added to ping and asset responses, so a pool
    /// of nodes exhibits distinguishable RTTs on one host.
    #[serde(default = "default_base_latency_ms")]
    pub base_latency_ms: u64,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Directory the asset namespace maps onto.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
}

/// Server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

/// Asset cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_node_id() -> String {
    "edge".to_string()
}

fn default_base_latency_ms() -> u64 {
    25
}

fn default_cache_ttl_seconds() -> u64 {
    60
}

fn default_assets_dir() -> String {
    "./assets".to_string()
}

impl NodeConfig {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (EDGE_ prefix, __ for nesting)
    /// 2. TOML config file
    /// 3. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let config: NodeConfig = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("EDGE_").split("__"))
            .extract()?;

        Ok(config)
    }
}
