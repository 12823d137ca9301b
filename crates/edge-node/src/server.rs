//! Axum HTTP server: router, listener, graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::assets;
use crate::cache::AssetCache;
use crate::config::NodeConfig;

/// Response header reporting cache disposition (`HIT` or `MISS`).
pub const CACHE_HEADER: &str = "x-cache";

/// Response header naming this node.
pub const NODE_HEADER: &str = "x-node";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: NodeConfig,
    pub cache: Arc<AssetCache>,
}

/// Build and run the HTTP server.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let listen_addr = state.config.server.listen_address.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "edge-node listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("edge-node shut down gracefully");
    Ok(())
}

/// Assemble the route table. Split from `run` so tests can drive the app
/// on an ephemeral port.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(handle_ping))
        .route("/assets", get(handle_bare_assets))
        .route("/assets/{*path}", get(handle_asset))
        .route("/invalidate", post(handle_invalidate))
        .route("/healthz", get(handle_healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Simulated latency before any ping or asset response: the configured
/// base plus 0-5 ms of jitter, so co-hosted nodes stay distinguishable.
async fn simulate_latency(base_latency_ms: u64) {
    let jitter_ms = rand::thread_rng().gen_range(0..6u64);
    tokio::time::sleep(Duration::from_millis(base_latency_ms + jitter_ms)).await;
}

/// GET /ping — liveness with simulated latency. The router measures the
/// wall-clock RTT of this exchange to rank nodes.
async fn handle_ping(State(state): State<Arc<AppState>>) -> Response {
    simulate_latency(state.config.base_latency_ms).await;

    axum::Json(json!({
        "nodeId": state.config.node_id,
        "latencyMs": state.config.base_latency_ms,
    }))
    .into_response()
}

/// GET /assets/{*path} — serve one asset: TTL cache first, disk on a miss.
async fn handle_asset(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    // The wildcard capture drops the leading slash; cache keys and disk
    // lookups both use the absolute form.
    let key = format!("/{path}");

    simulate_latency(state.config.base_latency_ms).await;

    if let Some(entry) = state.cache.get(&key) {
        tracing::debug!(path = %key, "cache hit");
        return asset_response(entry.data, entry.mime, "HIT", &state.config.node_id);
    }

    let Some((data, mime)) = assets::load(&state.config.assets_dir, &key).await else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };

    state.cache.insert(key.clone(), data.clone(), mime);
    tracing::debug!(path = %key, bytes = data.len(), "cache miss, loaded from disk");

    asset_response(data, mime, "MISS", &state.config.node_id)
}

/// GET /assets without a path.
async fn handle_bare_assets() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, "path required")
}

#[derive(Debug, Deserialize)]
struct InvalidateRequest {
    #[serde(default)]
    path: String,
}

/// POST /invalidate — evict one path from this node's cache. The next
/// request for that path reloads it from disk.
async fn handle_invalidate(
    State(state): State<Arc<AppState>>,
    axum::Json(request): axum::Json<InvalidateRequest>,
) -> Response {
    if request.path.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "error": "body {path} required" })),
        )
            .into_response();
    }

    let evicted = state.cache.invalidate(&request.path);
    tracing::info!(path = %request.path, evicted, "cache invalidated");

    axum::Json(json!({ "invalidated": evicted, "path": request.path })).into_response()
}

/// Build an asset response: inferred content type, cache disposition, and
/// this node's identity.
fn asset_response(
    data: Bytes,
    mime: &'static str,
    cache_status: &'static str,
    node_id: &str,
) -> Response {
    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
    headers.insert(CACHE_HEADER, HeaderValue::from_static(cache_status));
    if let Ok(value) = HeaderValue::from_str(node_id) {
        headers.insert(NODE_HEADER, value);
    }
    response
}

/// Liveness endpoint.
async fn handle_healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, draining connections...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, ServerConfig};
    use std::path::PathBuf;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn temp_assets_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("edge-node-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    async fn start_node(assets_dir: &std::path::Path) -> String {
        let config = NodeConfig {
            server: ServerConfig {
                listen_address: "127.0.0.1:0".to_string(),
            },
            node_id: "edge-test".to_string(),
            base_latency_ms: 0,
            cache: CacheConfig { ttl_seconds: 60 },
            assets_dir: assets_dir.to_str().unwrap().to_string(),
        };

        let cache = Arc::new(AssetCache::new(Duration::from_secs(
            config.cache.ttl_seconds,
        )));
        serve(router(AppState { config, cache })).await
    }

    #[tokio::test]
    async fn test_ping_reports_node_identity() {
        let dir = temp_assets_dir();
        let node_url = start_node(&dir).await;

        let response = reqwest::get(format!("{node_url}/ping")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["nodeId"], "edge-test");
        assert_eq!(body["latencyMs"], 0);
    }

    #[tokio::test]
    async fn test_asset_miss_then_hit() {
        let dir = temp_assets_dir();
        std::fs::write(dir.join("hello.txt"), "hi there").unwrap();
        let node_url = start_node(&dir).await;

        let first = reqwest::get(format!("{node_url}/assets/hello.txt"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()[CACHE_HEADER].to_str().unwrap(), "MISS");
        assert_eq!(first.headers()[NODE_HEADER].to_str().unwrap(), "edge-test");
        assert_eq!(
            first.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(first.text().await.unwrap(), "hi there");

        let second = reqwest::get(format!("{node_url}/assets/hello.txt"))
            .await
            .unwrap();
        assert_eq!(second.headers()[CACHE_HEADER].to_str().unwrap(), "HIT");
        assert_eq!(second.text().await.unwrap(), "hi there");
    }

    #[tokio::test]
    async fn test_nested_asset_path() {
        let dir = temp_assets_dir();
        std::fs::create_dir_all(dir.join("img")).unwrap();
        std::fs::write(dir.join("img/logo.png"), [0x89u8, 0x50, 0x4e, 0x47]).unwrap();
        let node_url = start_node(&dir).await;

        let response = reqwest::get(format!("{node_url}/assets/img/logo.png"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "image/png"
        );
        assert_eq!(
            response.bytes().await.unwrap().as_ref(),
            &[0x89u8, 0x50, 0x4e, 0x47]
        );
    }

    #[tokio::test]
    async fn test_missing_asset_is_not_found() {
        let dir = temp_assets_dir();
        let node_url = start_node(&dir).await;

        let response = reqwest::get(format!("{node_url}/assets/missing.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bare_assets_path_rejected() {
        let dir = temp_assets_dir();
        let node_url = start_node(&dir).await;

        let response = reqwest::get(format!("{node_url}/assets")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalidate_evicts_and_serves_fresh_content() {
        let dir = temp_assets_dir();
        std::fs::write(dir.join("hello.txt"), "old").unwrap();
        let node_url = start_node(&dir).await;
        let client = reqwest::Client::new();

        // Prime the cache, then change the file behind it.
        let primed = reqwest::get(format!("{node_url}/assets/hello.txt"))
            .await
            .unwrap();
        assert_eq!(primed.headers()[CACHE_HEADER].to_str().unwrap(), "MISS");
        std::fs::write(dir.join("hello.txt"), "new").unwrap();

        let stale = reqwest::get(format!("{node_url}/assets/hello.txt"))
            .await
            .unwrap();
        assert_eq!(stale.headers()[CACHE_HEADER].to_str().unwrap(), "HIT");
        assert_eq!(stale.text().await.unwrap(), "old");

        let response = client
            .post(format!("{node_url}/invalidate"))
            .json(&json!({ "path": "/hello.txt" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["invalidated"], true);
        assert_eq!(body["path"], "/hello.txt");

        let fresh = reqwest::get(format!("{node_url}/assets/hello.txt"))
            .await
            .unwrap();
        assert_eq!(fresh.headers()[CACHE_HEADER].to_str().unwrap(), "MISS");
        assert_eq!(fresh.text().await.unwrap(), "new");
    }

    #[tokio::test]
    async fn test_invalidate_requires_path() {
        let dir = temp_assets_dir();
        let node_url = start_node(&dir).await;

        let response = reqwest::Client::new()
            .post(format!("{node_url}/invalidate"))
            .json(&json!({}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("path"));
    }

    #[tokio::test]
    async fn test_healthz_ok() {
        let dir = temp_assets_dir();
        let node_url = start_node(&dir).await;

        let response = reqwest::get(format!("{node_url}/healthz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "ok");
    }
}
