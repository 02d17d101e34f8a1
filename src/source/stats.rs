// Cache statistics: how many requested bytes a caching layer served itself.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy)]
pub struct CacheStatsSnapshot {
    pub requested_bytes: u64,
    pub cache_hit_bytes: u64,
    pub fetched_bytes: u64,
    pub cache_hit_rate: f64,
}

pub struct CacheStats {
    requested_bytes: AtomicU64,
    cache_hit_bytes: AtomicU64,
    fetched_bytes: AtomicU64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self {
            requested_bytes: AtomicU64::new(0),
            cache_hit_bytes: AtomicU64::new(0),
            fetched_bytes: AtomicU64::new(0),
        }
    }

    /// Record a read: `total` bytes were requested, of which `cached` were already in cache.
    pub fn record_request(&self, total: u64, cached: u64) {
        self.requested_bytes.fetch_add(total, Ordering::Relaxed);
        self.cache_hit_bytes.fetch_add(cached, Ordering::Relaxed);
    }

    /// Record bytes pulled from the inner accessor to fill the cache.
    pub fn record_fetched(&self, bytes: u64) {
        self.fetched_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        let requested = self.requested_bytes.load(Ordering::Relaxed);
        let cache_hit = self.cache_hit_bytes.load(Ordering::Relaxed);
        let cache_hit_rate = if requested > 0 {
            cache_hit as f64 / requested as f64
        } else {
            0.0
        };

        CacheStatsSnapshot {
            requested_bytes: requested,
            cache_hit_bytes: cache_hit,
            fetched_bytes: self.fetched_bytes.load(Ordering::Relaxed),
            cache_hit_rate,
        }
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}
