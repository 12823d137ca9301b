//! Single-edge liveness probe with round-trip timing.

use std::time::Instant;

/// One successful probe: the edge plus its observed round-trip time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub edge: String,
    pub rtt_ms: u64,
}

/// Probe one edge's `/ping` endpoint and measure wall-clock RTT.
///
/// The probe timeout is carried by `client`. Success requires a 2xx
/// response inside the timeout; an edge answering with an error status is
/// excluded from ranking the same as an unreachable one. Errors and
/// timeouts return `None`; the reason is logged and discarded, only the
/// absence matters downstream. One attempt only — a failed probe stays
/// failed for this request's ranking round.
pub async fn probe(client: &reqwest::Client, edge: &str) -> Option<ProbeResult> {
    let url = format!("{edge}/ping");
    let start = Instant::now();

    // Drain the body so the RTT covers the full response, not just headers.
    let outcome = match client.get(&url).send().await {
        Ok(response) => match response.error_for_status() {
            Ok(response) => response.bytes().await.map(|_| ()),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => {
            let rtt_ms = start.elapsed().as_millis() as u64;
            tracing::debug!(edge = %edge, rtt_ms, "probe ok");
            Some(ProbeResult {
                edge: edge.to_string(),
                rtt_ms,
            })
        }
        Err(e) if e.is_timeout() => {
            tracing::debug!(edge = %edge, "probe timed out");
            None
        }
        Err(e) => {
            tracing::debug!(edge = %edge, error = %e, "probe failed");
            None
        }
    }
}
