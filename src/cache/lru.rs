//! Pin-aware LRU replacement cache.
//!
//! [`LruCache`] is a bounded mapping from [`PageId`] to [`Page`], ordered by
//! recency of use. Eviction selects the least-recently-used entry whose pin
//! count is zero; if every entry is pinned the cache grows past its capacity
//! (capacity is a soft bound, not a hard limit). The cache knows nothing
//! about the backing file: persisting an evicted dirty page is the caller's
//! job, which is why eviction-style operations hand the removed entries back.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::page::Page;
use crate::cache::stats::{CacheStats, StatsSnapshot};
use crate::common::config::DEFAULT_CACHE_CAPACITY;
use crate::common::PageId;

/// A cache entry handed back from eviction and snapshot operations.
///
/// Pairs the identifier with the shared page so the caller can persist the
/// content after the entry has already left the cache.
#[derive(Clone)]
pub struct CacheEntry {
    pub page_id: PageId,
    pub page: Arc<Page>,
}

/// Map plus recency queue, guarded together by one lock.
///
/// Invariant: every id in `recency` has an entry in `entries` and vice
/// versa; each id appears in `recency` exactly once.
struct LruInner {
    entries: HashMap<PageId, Arc<Page>>,
    /// Recency order: front = least recently used, back = most recently used.
    recency: VecDeque<PageId>,
}

impl LruInner {
    /// Move `page_id` to the most-recently-used position.
    fn touch(&mut self, page_id: PageId) {
        self.recency.retain(|&id| id != page_id);
        self.recency.push_back(page_id);
    }

    /// Evict the least-recently-used unpinned entry, if any.
    ///
    /// Scans from the LRU end, skipping pinned entries; skipped entries
    /// keep their recency position.
    fn evict_lru(&mut self) -> Option<CacheEntry> {
        let idx = self
            .recency
            .iter()
            .position(|id| self.entries.get(id).map_or(false, |p| !p.is_pinned()))?;
        let page_id = self.recency.remove(idx)?;
        let page = self.entries.remove(&page_id)?;
        Some(CacheEntry { page_id, page })
    }
}

/// A bounded page cache with strict-LRU eviction restricted to unpinned
/// entries, and running hit/miss counters.
///
/// All methods take `&self`: the map and recency queue live behind one
/// `RwLock` (exclusive for mutation, shared for pure lookups), and the
/// counters are atomics. The page store holds its own lock while calling in
/// here, so this lock is a second layer of protection that also makes the
/// cache safe to use on its own.
pub struct LruCache {
    capacity: usize,
    inner: RwLock<LruInner>,
    stats: CacheStats,
}

impl LruCache {
    /// Create a cache that holds up to `capacity` pages.
    ///
    /// A capacity of zero selects [`DEFAULT_CACHE_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CACHE_CAPACITY
        } else {
            capacity
        };
        Self {
            capacity,
            inner: RwLock::new(LruInner {
                entries: HashMap::with_capacity(capacity),
                recency: VecDeque::with_capacity(capacity),
            }),
            stats: CacheStats::new(),
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Look up a page, refreshing its recency.
    ///
    /// Counts a hit when present and a miss otherwise; a miss has no other
    /// side effect.
    pub fn get(&self, page_id: PageId) -> Option<Arc<Page>> {
        let mut inner = self.inner.write();
        match inner.entries.get(&page_id) {
            Some(page) => {
                let page = Arc::clone(page);
                inner.touch(page_id);
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(page)
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Look up a page without touching recency or statistics.
    ///
    /// Maintenance paths (targeted flush, bulk flush) use this so
    /// bookkeeping I/O does not skew the hit rate or the eviction order.
    pub fn peek(&self, page_id: PageId) -> Option<Arc<Page>> {
        self.inner.read().entries.get(&page_id).map(Arc::clone)
    }

    /// Whether `page_id` is currently cached. No recency or stats effect.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.inner.read().entries.contains_key(&page_id)
    }

    // ========================================================================
    // Insertion and eviction
    // ========================================================================

    /// Insert a page, evicting the LRU unpinned entry if at capacity.
    ///
    /// If `page_id` is already present its page is replaced and refreshed to
    /// most-recently-used with no eviction. Otherwise, at capacity, the
    /// least-recently-used unpinned entry is evicted and returned so the
    /// caller can persist it; when every entry is pinned nothing is evicted
    /// and the cache exceeds its capacity.
    pub fn put(&self, page_id: PageId, page: Arc<Page>) -> Option<CacheEntry> {
        let mut inner = self.inner.write();

        if inner.entries.contains_key(&page_id) {
            inner.entries.insert(page_id, page);
            inner.touch(page_id);
            return None;
        }

        let evicted = if inner.entries.len() >= self.capacity {
            inner.evict_lru()
        } else {
            None
        };

        inner.entries.insert(page_id, page);
        inner.recency.push_back(page_id);
        evicted
    }

    /// Remove an entry outright, returning it if present.
    pub fn remove(&self, page_id: PageId) -> Option<CacheEntry> {
        let mut inner = self.inner.write();
        let page = inner.entries.remove(&page_id)?;
        inner.recency.retain(|&id| id != page_id);
        Some(CacheEntry { page_id, page })
    }

    /// Forcibly evict every unpinned entry regardless of capacity.
    ///
    /// Returns the dirty ones (in LRU order) so the caller can persist
    /// them; clean entries are simply dropped. Pinned entries stay cached.
    pub fn evict_unpinned(&self) -> Vec<CacheEntry> {
        let mut inner = self.inner.write();
        let mut dirty = Vec::new();

        let order = std::mem::take(&mut inner.recency);
        for page_id in order {
            let pinned = inner
                .entries
                .get(&page_id)
                .map_or(false, |p| p.is_pinned());
            if pinned {
                inner.recency.push_back(page_id);
            } else if let Some(page) = inner.entries.remove(&page_id) {
                if page.is_dirty() {
                    dirty.push(CacheEntry { page_id, page });
                }
            }
        }
        dirty
    }

    /// Remove every entry unconditionally, pinned or not.
    ///
    /// Returns the dirty ones so the caller can persist them.
    pub fn clear(&self) -> Vec<CacheEntry> {
        let mut inner = self.inner.write();
        inner.recency.clear();
        let mut dirty = Vec::new();
        for (page_id, page) in inner.entries.drain() {
            if page.is_dirty() {
                dirty.push(CacheEntry { page_id, page });
            }
        }
        dirty
    }

    // ========================================================================
    // Per-entry bookkeeping
    // ========================================================================

    /// Refresh an entry's recency without returning its content.
    ///
    /// Returns whether the entry was present.
    pub fn touch(&self, page_id: PageId) -> bool {
        let mut inner = self.inner.write();
        if inner.entries.contains_key(&page_id) {
            inner.touch(page_id);
            true
        } else {
            false
        }
    }

    /// Increment an entry's pin count. Returns whether it was present.
    pub fn pin(&self, page_id: PageId) -> bool {
        let inner = self.inner.write();
        match inner.entries.get(&page_id) {
            Some(page) => {
                page.pin();
                true
            }
            None => false,
        }
    }

    /// Decrement an entry's pin count, flooring at zero.
    ///
    /// Returns whether the entry was present.
    pub fn unpin(&self, page_id: PageId) -> bool {
        let inner = self.inner.write();
        match inner.entries.get(&page_id) {
            Some(page) => {
                page.unpin();
                true
            }
            None => false,
        }
    }

    /// Mark an entry dirty. Returns whether it was present.
    pub fn mark_dirty(&self, page_id: PageId) -> bool {
        let inner = self.inner.write();
        match inner.entries.get(&page_id) {
            Some(page) => {
                page.mark_dirty();
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Bulk access
    // ========================================================================

    /// Snapshot of every currently dirty entry, for bulk flush.
    pub fn all_dirty(&self) -> Vec<CacheEntry> {
        let inner = self.inner.read();
        inner
            .entries
            .iter()
            .filter(|(_, page)| page.is_dirty())
            .map(|(&page_id, page)| CacheEntry {
                page_id,
                page: Arc::clone(page),
            })
            .collect()
    }

    /// Visit every entry in unspecified order.
    ///
    /// The visitor returns `false` to stop early. Consumers needing a
    /// deterministic order must impose one themselves.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(PageId, &Arc<Page>) -> bool,
    {
        let inner = self.inner.read();
        for (&page_id, page) in &inner.entries {
            if !visitor(page_id, page) {
                break;
            }
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Configured capacity (a soft bound, see [`LruCache::put`]).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the hit/miss counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Hit rate as a percentage, 0 when there have been no accesses.
    pub fn hit_rate(&self) -> f64 {
        self.stats.hit_rate()
    }
}
