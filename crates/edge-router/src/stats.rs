//! Atomic routing statistics counters.
//!
//! Lock-free counters for tracking request outcomes. All atomics use
//! `Relaxed` ordering — these are monotonic display counters with no
//! synchronization requirements, and they carry no routing state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

struct StatsInner {
    total_requests: AtomicU64,
    routed: AtomicU64,
    no_edge: AtomicU64,
    fetch_failures: AtomicU64,
    bad_input: AtomicU64,
}

/// Thread-safe atomic routing statistics. Cheap to clone (Arc).
#[derive(Clone)]
pub struct RouterStats {
    inner: Arc<StatsInner>,
}

/// Snapshot of current stats values, serializable to JSON.
#[derive(Debug, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub routed: u64,
    pub no_edge: u64,
    pub fetch_failures: u64,
    pub bad_input: u64,
}

impl RouterStats {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatsInner {
                total_requests: AtomicU64::new(0),
                routed: AtomicU64::new(0),
                no_edge: AtomicU64::new(0),
                fetch_failures: AtomicU64::new(0),
                bad_input: AtomicU64::new(0),
            }),
        }
    }

    pub fn inc_requests(&self) {
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_routed(&self) {
        self.inner.routed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_no_edge(&self) {
        self.inner.no_edge.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetch_failures(&self) {
        self.inner.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_bad_input(&self) {
        self.inner.bad_input.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_requests: self.inner.total_requests.load(Ordering::Relaxed),
            routed: self.inner.routed.load(Ordering::Relaxed),
            no_edge: self.inner.no_edge.load(Ordering::Relaxed),
            fetch_failures: self.inner.fetch_failures.load(Ordering::Relaxed),
            bad_input: self.inner.bad_input.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate_across_clones() {
        let stats = RouterStats::new();
        let clone = stats.clone();

        stats.inc_requests();
        clone.inc_requests();
        stats.inc_routed();
        clone.inc_no_edge();
        stats.inc_fetch_failures();
        clone.inc_bad_input();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.routed, 1);
        assert_eq!(snapshot.no_edge, 1);
        assert_eq!(snapshot.fetch_failures, 1);
        assert_eq!(snapshot.bad_input, 1);
    }
}
