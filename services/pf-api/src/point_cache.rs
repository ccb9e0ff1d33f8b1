//! In-memory cache of result bundles for previously queried points.
//!
//! Keys are points rounded to two decimal places, the precision shown to the
//! user. The first bundle stored for a key is kept for the life of the
//! process; later inserts for the same key are counted and dropped.
//!
//! ## Eviction Strategy
//! None. The cache grows by one entry per distinct rounded point.
//!
//! The cache is not synchronized. The coordinator owns it behind a mutex that
//! is only held for map operations, never across a fetch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use pf_common::{PointKey, QueryPoint};
use pf_data::ResultBundle;

/// Cached bundle for one rounded point.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: PointKey,
    pub bundle: Arc<ResultBundle>,
    pub fetched_at: DateTime<Utc>,
}

/// Statistics for the point cache.
#[derive(Debug, Default)]
pub struct PointCacheStats {
    /// Total cache hits.
    pub hits: AtomicU64,
    /// Total cache misses.
    pub misses: AtomicU64,
    /// Inserts for a key that was already cached.
    pub duplicate_inserts: AtomicU64,
}

impl PointCacheStats {
    /// Calculate cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// Serializable view of the cache for the inspection endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub entries: Vec<CachedPoint>,
    pub hits: u64,
    pub misses: u64,
    pub duplicate_inserts: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CachedPoint {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    pub has_data: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Append-only point → bundle cache.
#[derive(Debug, Default)]
pub struct PointCache {
    /// First-inserted entries in insertion order.
    entries: Vec<CacheEntry>,
    /// Key → position in `entries`.
    index: HashMap<PointKey, usize>,
    stats: PointCacheStats,
}

impl PointCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the bundle stored for a point after rounding.
    pub fn lookup(&self, point: &QueryPoint) -> Option<Arc<ResultBundle>> {
        self.lookup_key(&point.rounded())
    }

    pub fn lookup_key(&self, key: &PointKey) -> Option<Arc<ResultBundle>> {
        match self.index.get(key) {
            Some(&pos) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&self.entries[pos].bundle))
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a bundle for a point after rounding.
    ///
    /// Returns `false` when the key was already present; the earlier bundle
    /// stays authoritative.
    pub fn insert(&mut self, point: &QueryPoint, bundle: Arc<ResultBundle>) -> bool {
        let key = point.rounded();

        if self.index.contains_key(&key) {
            self.stats.duplicate_inserts.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(point = %key, "Ignoring duplicate point cache insert");
            return false;
        }

        self.index.insert(key, self.entries.len());
        self.entries.push(CacheEntry {
            key,
            bundle,
            fetched_at: Utc::now(),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &PointCacheStats {
        &self.stats
    }

    /// Cached entries in insertion order.
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            entries: self
                .entries
                .iter()
                .map(|e| CachedPoint {
                    lat: e.key.lat(),
                    lon: e.key.lon(),
                    label: e.key.to_string(),
                    has_data: e.bundle.has_data(),
                    fetched_at: e.fetched_at,
                })
                .collect(),
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            duplicate_inserts: self.stats.duplicate_inserts.load(Ordering::Relaxed),
            hit_rate: self.stats.hit_rate(),
        }
    }
}
