//! Configuration types and loading logic.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer};

/// Top-level router configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Ordered list of edge base URLs. The order is significant: probe-latency
    /// ties resolve in favor of the earlier entry.
    #[serde(deserialize_with = "edge_list")]
    pub edges: Vec<String>,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    /// Permissive CORS, for driving the router from a browser during testing.
    #[serde(default)]
    pub enable_cors: bool,
}

/// Server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

/// Liveness probe configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

/// Asset fetch configuration. The default timeout is longer than the probe
/// timeout since asset fetches are heavier than liveness pings.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

fn default_listen_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_fetch_timeout_ms() -> u64 {
    4000
}

/// Accept the edge list either as a proper array or as a single
/// comma-separated string, so `ROUTER_EDGES=http://a:8080,http://b:8080`
/// works from the environment. Entries are trimmed and trailing slashes
/// stripped; empty entries are dropped.
fn edge_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Csv(String),
    }

    let entries = match Raw::deserialize(deserializer)? {
        Raw::List(list) => list,
        Raw::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(entries
        .iter()
        .map(|e| e.trim().trim_end_matches('/').to_string())
        .filter(|e| !e.is_empty())
        .collect())
}

impl RouterConfig {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (ROUTER_ prefix, __ for nesting)
    /// 2. TOML config file
    /// 3. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let config: RouterConfig = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("ROUTER_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Startup-time validation. An empty edge list is a refusal to start,
    /// not a runtime condition.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.edges.is_empty(),
            "at least one edge base URL is required (set `edges` in the config file or ROUTER_EDGES)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> RouterConfig {
        Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .expect("config should parse")
    }

    #[test]
    fn test_full_config_parses() {
        let config = from_toml(
            r#"
            edges = ["http://edge-a:8080", "http://edge-b:8080"]
            enable_cors = true

            [server]
            listen_address = "127.0.0.1:9000"

            [probe]
            timeout_ms = 500

            [fetch]
            timeout_ms = 1500
            "#,
        );

        assert_eq!(config.edges, vec!["http://edge-a:8080", "http://edge-b:8080"]);
        assert_eq!(config.server.listen_address, "127.0.0.1:9000");
        assert_eq!(config.probe.timeout_ms, 500);
        assert_eq!(config.fetch.timeout_ms, 1500);
        assert!(config.enable_cors);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let config = from_toml(r#"edges = ["http://edge-a:8080"]"#);

        assert_eq!(config.server.listen_address, "0.0.0.0:3000");
        assert_eq!(config.probe.timeout_ms, 2000);
        assert_eq!(config.fetch.timeout_ms, 4000);
        assert!(!config.enable_cors);
    }

    #[test]
    fn test_comma_separated_edges() {
        let config =
            from_toml(r#"edges = " http://edge-a:8080/ ,http://edge-b:8080, ,http://edge-c:8080""#);

        assert_eq!(
            config.edges,
            vec![
                "http://edge-a:8080",
                "http://edge-b:8080",
                "http://edge-c:8080"
            ]
        );
    }

    #[test]
    fn test_trailing_slash_stripped_from_list_entries() {
        let config = from_toml(r#"edges = ["http://edge-a:8080/"]"#);
        assert_eq!(config.edges, vec!["http://edge-a:8080"]);
    }

    #[test]
    fn test_empty_edges_rejected() {
        let config = from_toml(r#"edges = """#);
        assert!(config.edges.is_empty());
        assert!(config.validate().is_err());
    }
}
