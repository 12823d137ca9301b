//! Axum HTTP server: router, listener, graceful shutdown.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::forward::{self, ForwardOutcome};
use crate::select;
use crate::stats::RouterStats;

/// Response header naming the edge that served the asset.
pub const SELECTED_EDGE_HEADER: &str = "x-selected-edge";

/// Response header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state. Everything here is immutable after startup
/// except the stats counters; per-request state lives in the handler.
#[derive(Clone)]
pub struct AppState {
    pub config: RouterConfig,
    pub probe_client: reqwest::Client,
    pub fetch_client: reqwest::Client,
    pub stats: RouterStats,
}

/// Build and run the HTTP server.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let listen_addr = state.config.server.listen_address.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "edge-router listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("edge-router shut down gracefully");
    Ok(())
}

/// Assemble the route table. Split from `run` so tests can drive the app
/// on an ephemeral port.
pub fn router(state: AppState) -> Router {
    let enable_cors = state.config.enable_cors;

    let mut app = Router::new()
        .route("/asset", get(handle_asset))
        .route("/healthz", get(handle_healthz))
        .route("/api/stats", get(handle_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state));

    if enable_cors {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

#[derive(Debug, Deserialize)]
struct AssetParams {
    #[serde(default)]
    path: String,
}

/// Main handler for GET /asset.
///
/// 1. Validate the requested path (absolute, leading slash)
/// 2. Probe all edges concurrently and pick the lowest-latency one
/// 3. Fetch the asset from the winner
/// 4. Relay body, status, content type, and the winner's identity
///
/// Every entity created here is scoped to this request; nothing survives
/// the response.
async fn handle_asset(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AssetParams>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    state.stats.inc_requests();

    let mut response = match route_asset(&state, &params.path).await {
        Ok(outcome) => {
            state.stats.inc_routed();
            tracing::info!(
                request_id = %request_id,
                path = %params.path,
                edge = %outcome.edge,
                status = outcome.status.as_u16(),
                "asset routed"
            );
            relay(outcome)
        }
        Err(err) => {
            match &err {
                RouterError::InvalidPath => state.stats.inc_bad_input(),
                RouterError::NoEdgeReachable => state.stats.inc_no_edge(),
                RouterError::EdgeFetchFailed { .. } => state.stats.inc_fetch_failures(),
            }
            tracing::warn!(
                request_id = %request_id,
                path = %params.path,
                error = %err,
                "asset request failed"
            );
            err.into_response()
        }
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Validate, select, forward. The only network calls in a request's life
/// happen here, and only after the path check passes. All-probes-failed is
/// a first-class outcome; a fetch failure is never retried against the
/// next-best candidate.
async fn route_asset(state: &AppState, path: &str) -> Result<ForwardOutcome, RouterError> {
    if !path.starts_with('/') {
        return Err(RouterError::InvalidPath);
    }

    let edge = select::select(&state.probe_client, &state.config.edges)
        .await
        .ok_or(RouterError::NoEdgeReachable)?;

    forward::forward(&state.fetch_client, &edge, path).await
}

/// Build the caller-facing response from a fetched asset: upstream status
/// verbatim, upstream content type (already defaulted), and the serving
/// edge's identity for observability.
fn relay(outcome: ForwardOutcome) -> Response {
    let mut response = (outcome.status, outcome.body).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&outcome.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    if let Ok(value) = HeaderValue::from_str(&outcome.edge) {
        headers.insert(SELECTED_EDGE_HEADER, value);
    }
    response
}

/// Liveness endpoint.
async fn handle_healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// GET /api/stats — current routing outcome counters.
async fn handle_stats(State(state): State<Arc<AppState>>) -> Response {
    axum::Json(state.stats.snapshot()).into_response()
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, draining connections...");
}
