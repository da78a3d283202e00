//! Cache hit/miss statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by the replacement cache.
///
/// Plain atomic counters: any thread can bump them without touching the
/// cache lock.
///
/// # Memory Ordering
/// Everything here is `Ordering::Relaxed`. The counters carry no
/// synchronization duties, and a momentarily stale read only skews a
/// statistic, so nothing stronger is needed.
///
/// # Example
/// ```
/// use stratadb::CacheStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = CacheStats::new();
/// stats.hits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.hits.load(Ordering::Relaxed), 1);
/// ```
#[derive(Debug)]
pub struct CacheStats {
    /// Number of lookups that found the page in the cache.
    pub hits: AtomicU64,

    /// Number of lookups that did not find the page.
    pub misses: AtomicU64,
}

impl CacheStats {
    /// New tracker with both counters at zero.
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache hit rate as a percentage (0.0 to 100.0).
    ///
    /// Defined as 0 when no accesses have occurred.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64 * 100.0
        }
    }

    /// Copy the counters into a plain [`StatsSnapshot`].
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Zero both counters.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of the counters, free of atomics, so it can be
/// compared, stored, and formatted like any other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
}

impl StatsSnapshot {
    /// Cache hit rate as a percentage (0.0 to 100.0).
    ///
    /// Defined as 0 when no accesses have occurred.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, hit_rate: {:.2}% }}",
            self.hits,
            self.misses,
            self.hit_rate()
        )
    }
}
