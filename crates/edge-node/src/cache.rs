//! TTL in-memory asset cache.
//!
//! Entries expire lazily: an expired entry is evicted by the read that
//! finds it. Eviction also happens eagerly through `invalidate`, driven by
//! the `/invalidate` endpoint.

use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;

/// One cached asset: raw bytes, inferred content type, expiry instant.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Bytes,
    pub mime: &'static str,
    expires_at: Instant,
}

pub struct AssetCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl AssetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fetch a live entry. An expired entry is removed and reported absent.
    pub fn get(&self, path: &str) -> Option<CacheEntry> {
        let entry = self.entries.get(path)?;
        if Instant::now() < entry.expires_at {
            return Some(entry.clone());
        }
        drop(entry);
        self.entries.remove(path);
        None
    }

    pub fn insert(&self, path: String, data: Bytes, mime: &'static str) {
        self.entries.insert(
            path,
            CacheEntry {
                data,
                mime,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Evict one path. Returns whether an entry was present.
    pub fn invalidate(&self, path: &str) -> bool {
        self.entries.remove(path).is_some()
    }
}
