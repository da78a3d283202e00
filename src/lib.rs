//! StrataDB - A disk-backed page store with a pin-aware LRU buffer cache.
//!
//! # Architecture
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        StrataDB                           │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │              Page Store (pager/)                    │  │
//! │  │   Pager + PageReadGuard/PageWriteGuard              │  │
//! │  │   id → offset mapping, dirty write-back, flush      │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! │                            ↓                              │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │           Replacement Cache (cache/)                │  │
//! │  │   LruCache + Page + CacheStats                      │  │
//! │  │   pin-aware LRU eviction, hit/miss counters         │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! │                            ↓                              │
//! │                      backing file                         │
//! │            page i at [i·PAGE_SIZE, (i+1)·PAGE_SIZE)       │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, config)
//! - [`cache`] - Pin-aware LRU page cache with hit/miss statistics
//! - [`pager`] - Disk-backed page store and RAII page guards
//!
//! # Quick Start
//! ```no_run
//! use stratadb::{Pager, PageId, PAGE_SIZE};
//!
//! // Open (or create) a database file with a 100-page cache
//! let pager = Pager::open("my_database.db", 100).unwrap();
//!
//! // Write a page and make it durable
//! let data = [0xABu8; PAGE_SIZE];
//! pager.write_page(PageId::new(0), &data).unwrap();
//! pager.flush().unwrap();
//!
//! // Read it back through a pinning guard
//! let guard = pager.read_page(PageId::new(0)).unwrap();
//! assert_eq!(guard.data().as_slice()[0], 0xAB);
//! drop(guard); // releases the pin
//!
//! pager.close().unwrap();
//! ```

pub mod cache;
pub mod common;
pub mod pager;

// Flat re-exports of the public surface
pub use common::config::{DEFAULT_CACHE_CAPACITY, HEADER_PAGE_NUM, MAX_PAGES, PAGE_SIZE};
pub use common::{Error, PageId, Result};

pub use cache::{CacheEntry, CacheStats, LruCache, Page, PageBuf, StatsSnapshot};
pub use pager::{PageReadGuard, PageWriteGuard, Pager};
