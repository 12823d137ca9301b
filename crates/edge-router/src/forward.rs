//! Asset fetch from the winning edge.

use axum::http::StatusCode;
use bytes::Bytes;

use crate::error::RouterError;

/// Prefix under which every edge exposes its asset namespace.
pub const ASSET_PREFIX: &str = "/assets";

/// A successfully fetched asset: upstream status, content type, raw bytes.
#[derive(Debug)]
pub struct ForwardOutcome {
    pub edge: String,
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
}

/// Fetch `path` from the chosen edge.
///
/// The fetch timeout is carried by `client` and is longer than the probe
/// timeout. The payload is treated as opaque bytes — no content validation,
/// no text decoding. The upstream status passes through verbatim; the
/// content type defaults to `application/octet-stream` when the edge omits
/// it. Transport failures map to `EdgeFetchFailed` and are not retried
/// against the next-best candidate.
pub async fn forward(
    client: &reqwest::Client,
    edge: &str,
    path: &str,
) -> Result<ForwardOutcome, RouterError> {
    let url = format!("{edge}{ASSET_PREFIX}{path}");

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| fetch_failed(edge, &e))?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let body = response.bytes().await.map_err(|e| fetch_failed(edge, &e))?;

    tracing::debug!(
        edge = %edge,
        status = status.as_u16(),
        bytes = body.len(),
        "asset fetched"
    );

    Ok(ForwardOutcome {
        edge: edge.to_string(),
        status: StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
        content_type,
        body,
    })
}

fn fetch_failed(edge: &str, e: &reqwest::Error) -> RouterError {
    if e.is_timeout() {
        tracing::warn!(edge = %edge, "asset fetch timed out");
    } else {
        tracing::warn!(edge = %edge, error = %e, "asset fetch failed");
    }
    RouterError::EdgeFetchFailed {
        edge: edge.to_string(),
        detail: e.to_string(),
    }
}
