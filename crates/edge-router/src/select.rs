//! Edge selection: concurrent probe fan-out, then latency ranking.

use crate::probe::{self, ProbeResult};

/// Probe every configured edge concurrently and pick the lowest-latency one.
///
/// One task per edge, no artificial cap — the edge count is small and fixed
/// by configuration. The fan-in barrier awaits every task before ranking
/// (each probe is bounded by the probe client's timeout, so the barrier is
/// bounded too). Handles are awaited in configuration order, which is what
/// keeps latency ties deterministic. Returns `None` when every probe failed;
/// that is a first-class outcome for the caller, not an error here.
pub async fn select(client: &reqwest::Client, edges: &[String]) -> Option<String> {
    let handles: Vec<_> = edges
        .iter()
        .map(|edge| {
            let client = client.clone();
            let edge = edge.clone();
            tokio::spawn(async move { probe::probe(&client, &edge).await })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        // A panicked probe task counts the same as a failed probe.
        outcomes.push(handle.await.ok().flatten());
    }

    let ranked = rank(outcomes);
    match ranked.first() {
        Some(winner) => {
            tracing::debug!(
                edge = %winner.edge,
                rtt_ms = winner.rtt_ms,
                candidates = ranked.len(),
                "selected edge"
            );
            Some(winner.edge.clone())
        }
        None => {
            tracing::warn!(edges = edges.len(), "no edges reachable");
            None
        }
    }
}

/// Rank probe outcomes: drop failures, stable-sort ascending by RTT.
///
/// Stability is the tie-break rule: two edges with equal RTT keep their
/// configuration order, so ranking is deterministic given the outcome set.
pub fn rank(outcomes: Vec<Option<ProbeResult>>) -> Vec<ProbeResult> {
    let mut candidates: Vec<ProbeResult> = outcomes.into_iter().flatten().collect();
    candidates.sort_by_key(|c| c.rtt_ms);
    candidates
}
