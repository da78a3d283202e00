//! Pin-aware LRU page cache.
//!
//! The replacement cache is the in-memory layer the page store serves reads
//! and writes through. It maps page identifiers to shared pages, tracks
//! recency of use, and evicts only unpinned entries.
//!
//! # Components
//! - [`LruCache`] - Bounded mapping with LRU eviction and hit/miss counters
//! - [`Page`] / [`PageBuf`] - A cached page and its raw 4KB content
//! - [`CacheEntry`] - An (identifier, page) pair returned by evictions
//! - [`CacheStats`] - Hit/miss statistics

mod lru;
mod page;
mod stats;

pub use lru::{CacheEntry, LruCache};
pub use page::{Page, PageBuf};
pub use stats::{CacheStats, StatsSnapshot};
