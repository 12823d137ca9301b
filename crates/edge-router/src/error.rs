//! Per-request error taxonomy.
//!
//! Every probe or fetch failure degrades to one of these classes; nothing
//! here terminates the handler or the process. There is no retry against
//! the next-best edge on a fetch failure — the caller may retry the whole
//! request, which re-runs the full probe-and-select cycle.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    /// Asset path missing or not absolute. Rejected before any probe is sent.
    #[error("invalid asset path")]
    InvalidPath,

    /// Every configured edge failed or timed out during probing.
    #[error("no edges reachable")]
    NoEdgeReachable,

    /// The winning edge failed or timed out during the actual fetch.
    #[error("edge fetch failed: {detail}")]
    EdgeFetchFailed { edge: String, detail: String },
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        match self {
            RouterError::InvalidPath => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "query ?path=/your/file.txt required (leading slash)"
                })),
            )
                .into_response(),
            RouterError::NoEdgeReachable => (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(json!({ "error": "no edges reachable" })),
            )
                .into_response(),
            RouterError::EdgeFetchFailed { detail, .. } => (
                StatusCode::BAD_GATEWAY,
                axum::Json(json!({ "error": "edge fetch failed", "details": detail })),
            )
                .into_response(),
        }
    }
}
