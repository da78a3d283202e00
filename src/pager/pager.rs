//! Pager - the disk-backed page store.
//!
//! The [`Pager`] is the sole gateway between callers and the backing file:
//! - Maps page identifiers to byte offsets (`id × PAGE_SIZE`)
//! - Serves reads and writes through the replacement cache
//! - Writes evicted and explicitly-flushed dirty pages back to the file
//! - Enforces the pin contract through RAII guards

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{LruCache, Page, PageBuf, StatsSnapshot};
use crate::common::config::{MAX_PAGES, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::pager::{PageReadGuard, PageWriteGuard};

/// State behind the store's coarse lock: the file handle and the logical
/// page count. The handle is `None` once the store has been closed.
struct PagerInner {
    file: Option<File>,
    /// One past the highest page identifier known to exist.
    num_pages: u32,
}

impl PagerInner {
    fn ensure_open(&self) -> Result<()> {
        if self.file.is_some() {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(Error::Closed)
    }
}

/// A disk-backed page store with an LRU buffer cache.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │                       Pager                         │
/// │  ┌───────────────────┐   ┌───────────────────────┐  │
/// │  │ inner: Mutex      │   │   cache: LruCache     │  │
/// │  │  file handle      │   │  PageId → Arc<Page>   │  │
/// │  │  logical count    │   │  recency + stats      │  │
/// │  └───────────────────┘   └───────────────────────┘  │
/// │            │                        │               │
/// │            ▼                        ▼               │
/// │       backing file          pinned working set      │
/// └─────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// Every operation runs inside one coarse critical section on `inner`:
/// reads, writes, flushes, and allocation are mutually exclusive. The cache
/// keeps its own lock underneath (redundant here, load-bearing for
/// standalone cache use), and guard release is pure atomics, so dropping a
/// guard never contends on the store lock.
///
/// `flush`/`flush_page` block until outstanding content borrows on the
/// pages they write are released; do not hold a `data_mut()` borrow while
/// calling them from the same thread.
///
/// # Usage
/// ```no_run
/// use stratadb::{Pager, PageId, PAGE_SIZE};
///
/// let pager = Pager::open("app.db", 100)?;
///
/// let data = [7u8; PAGE_SIZE];
/// pager.write_page(PageId::new(0), &data)?;
///
/// let guard = pager.read_page(PageId::new(0))?;
/// assert_eq!(guard.data().as_slice()[0], 7);
/// drop(guard);
///
/// pager.close()?;
/// # Ok::<(), stratadb::Error>(())
/// ```
pub struct Pager {
    /// Coarse store lock over file handle and logical page count.
    inner: Mutex<PagerInner>,

    /// The replacement cache, exclusively owned by this store.
    cache: LruCache,

    /// Path the backing file was opened with.
    path: PathBuf,
}

impl Pager {
    /// Open the backing file at `path`, creating it if absent.
    ///
    /// The logical page count is derived from the file size; a trailing
    /// partial page is silently dropped from the count. A `cache_capacity`
    /// of zero selects the default of 100 pages.
    ///
    /// # Errors
    /// I/O errors from opening or inspecting the file.
    pub fn open<P: AsRef<Path>>(path: P, cache_capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let metadata = file.metadata()?;
        let num_pages = (metadata.len() / PAGE_SIZE as u64) as u32;

        let cache = LruCache::new(cache_capacity);
        debug!(
            path = %path.display(),
            num_pages,
            cache_capacity = cache.capacity(),
            "opened page store"
        );

        Ok(Self {
            inner: Mutex::new(PagerInner {
                file: Some(file),
                num_pages,
            }),
            cache,
            path,
        })
    }

    // ========================================================================
    // Public API: Fetch pages
    // ========================================================================

    /// Fetch a page with read intent.
    ///
    /// The returned guard holds a pin; dropping it releases the pin and
    /// leaves the page clean. A page beyond the current logical extent is
    /// legitimately zeroed, not an error.
    ///
    /// # Errors
    /// - [`Error::PageOutOfBounds`] if `page_id` is at or past `MAX_PAGES`
    /// - [`Error::Closed`] if the store has been closed
    /// - [`Error::ReadFailed`] if the disk read fails or comes up short
    pub fn read_page(&self, page_id: PageId) -> Result<PageReadGuard<'_>> {
        let page = self.fetch(page_id)?;
        Ok(PageReadGuard::new(self, page_id, page))
    }

    /// Fetch a page with write intent.
    ///
    /// Same pin contract as [`Pager::read_page`]; dropping the returned
    /// guard additionally marks the page dirty.
    ///
    /// # Errors
    /// As [`Pager::read_page`].
    pub fn get_page(&self, page_id: PageId) -> Result<PageWriteGuard<'_>> {
        let page = self.fetch(page_id)?;
        Ok(PageWriteGuard::new(self, page_id, page))
    }

    // ========================================================================
    // Public API: Write pages
    // ========================================================================

    /// Replace a page's entire content, marking it dirty.
    ///
    /// The page is not pinned by this call. Writing at or beyond the
    /// current logical extent extends the logical page count; the file
    /// itself grows on the next flush of that page.
    ///
    /// # Errors
    /// - [`Error::Closed`] if the store has been closed
    /// - [`Error::InvalidPageSize`] if `data` is not exactly `PAGE_SIZE` bytes
    /// - [`Error::PageOutOfBounds`] if `page_id` is at or past `MAX_PAGES`
    /// - [`Error::WriteFailed`] if fetching the page into cache evicts a
    ///   dirty page whose write-back fails (hard on this path: the caller
    ///   is actively persisting content)
    pub fn write_page(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;

        if data.len() != PAGE_SIZE {
            return Err(Error::InvalidPageSize {
                expected: PAGE_SIZE,
                actual: data.len(),
            });
        }
        if page_id.0 >= MAX_PAGES {
            return Err(Error::PageOutOfBounds {
                page: page_id.0,
                max: MAX_PAGES,
            });
        }

        let page = match self.cache.get(page_id) {
            Some(page) => page,
            None => {
                // The whole page is being overwritten, so there is no need
                // to read existing content from disk first.
                let page = Arc::new(Page::new());
                if let Some(evicted) = self.cache.put(page_id, Arc::clone(&page)) {
                    if evicted.page.is_dirty() {
                        flush_page_at(inner.file_mut()?, evicted.page_id, &evicted.page)?;
                    }
                }
                page
            }
        };

        page.data_mut().as_mut_slice().copy_from_slice(data);
        page.mark_dirty();

        if page_id.0 >= inner.num_pages {
            inner.num_pages = page_id.0 + 1;
        }

        Ok(())
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write one page to disk if it is cached and dirty, clearing its
    /// dirty flag. Absent or clean pages are a no-op, not an error.
    ///
    /// # Errors
    /// - [`Error::Closed`] if the store has been closed
    /// - [`Error::WriteFailed`] if the disk write fails
    pub fn flush_page(&self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;

        match self.cache.peek(page_id) {
            Some(page) if page.is_dirty() => flush_page_at(inner.file_mut()?, page_id, &page),
            _ => Ok(()),
        }
    }

    /// Write every dirty cached page to disk, then issue a durability
    /// barrier (`sync_all`).
    ///
    /// Fails on the first write that fails, leaving the remaining pages
    /// still marked dirty so a retry can resume where it stopped.
    ///
    /// # Errors
    /// - [`Error::Closed`] if the store has been closed
    /// - [`Error::WriteFailed`] / [`Error::Io`] on write or sync failure
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;
        self.flush_all_locked(&mut inner)
    }

    // ========================================================================
    // Public API: Allocation and shutdown
    // ========================================================================

    /// Reserve the next unused page identifier and advance the logical
    /// count. Touches neither the cache nor the file; the page is
    /// materialized lazily on first write.
    ///
    /// # Errors
    /// - [`Error::Closed`] if the store has been closed
    /// - [`Error::PageOutOfBounds`] if the identifier space is exhausted
    pub fn allocate_page(&self) -> Result<PageId> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;

        if inner.num_pages >= MAX_PAGES {
            return Err(Error::PageOutOfBounds {
                page: inner.num_pages,
                max: MAX_PAGES,
            });
        }

        let page_id = PageId::new(inner.num_pages);
        inner.num_pages += 1;
        Ok(page_id)
    }

    /// Flush all dirty pages and release the file handle.
    ///
    /// Idempotent: closing an already-closed store succeeds with no
    /// effect. If the flush fails the store stays open so the caller can
    /// retry. Pages still pinned by guards are flushed in their current
    /// state; dirty marks applied by guard drops after this point are
    /// never written back.
    ///
    /// # Errors
    /// - [`Error::WriteFailed`] / [`Error::Io`] on write or sync failure
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.file.is_none() {
            return Ok(());
        }

        self.flush_all_locked(&mut inner)?;
        inner.file = None;
        debug!(path = %self.path.display(), "closed page store");
        Ok(())
    }

    // ========================================================================
    // Public API: Introspection
    // ========================================================================

    /// Logical page count: one past the highest page known to exist.
    pub fn num_pages(&self) -> u32 {
        self.inner.lock().num_pages
    }

    /// Path of the backing file.
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the cache's hit/miss counters.
    pub fn cache_stats(&self) -> StatsSnapshot {
        self.cache.stats()
    }

    /// Number of pages currently cached.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Configured cache capacity.
    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    // ========================================================================
    // Internal: Called by guards on drop
    // ========================================================================

    /// Release a fetch's pin, optionally marking the page dirty first.
    ///
    /// Pure atomics: safe to run while the store lock is held elsewhere,
    /// and a no-op in effect if the page has already left the cache.
    pub(crate) fn release_page(&self, page: &Page, dirty: bool) {
        if dirty {
            page.mark_dirty();
        }
        page.unpin();
    }

    // ========================================================================
    // Internal: Core fetch logic
    // ========================================================================

    /// Fetch a page into the cache and pin it.
    ///
    /// On a hit the cached page gains a pin. On a miss a zeroed page is
    /// materialized with one pin, filled from disk when the identifier is
    /// inside the logical extent, and inserted into the cache; a dirty
    /// page evicted by the insertion is written back first. A write-back
    /// failure on this path is logged and swallowed: the page has already
    /// left the cache, so surfacing the error would not let the caller
    /// retry meaningfully.
    fn fetch(&self, page_id: PageId) -> Result<Arc<Page>> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;

        if page_id.0 >= MAX_PAGES {
            return Err(Error::PageOutOfBounds {
                page: page_id.0,
                max: MAX_PAGES,
            });
        }

        if let Some(page) = self.cache.get(page_id) {
            page.pin();
            return Ok(page);
        }

        let page = Arc::new(Page::new());
        page.pin();

        if page_id.0 < inner.num_pages {
            read_page_at(inner.file_mut()?, page_id, &mut page.data_mut())?;
        }

        if let Some(evicted) = self.cache.put(page_id, Arc::clone(&page)) {
            if evicted.page.is_dirty() {
                if let Err(err) = flush_page_at(inner.file_mut()?, evicted.page_id, &evicted.page)
                {
                    warn!(page = evicted.page_id.0, %err, "failed to flush evicted page");
                }
            }
        }

        Ok(page)
    }

    /// Write every dirty cached page back and sync the file.
    ///
    /// The caller holds the store lock and has verified the store is open.
    fn flush_all_locked(&self, inner: &mut PagerInner) -> Result<()> {
        let dirty = self.cache.all_dirty();
        let file = inner.file_mut()?;

        for entry in &dirty {
            flush_page_at(file, entry.page_id, &entry.page)?;
        }
        file.sync_all()?;

        debug!(flushed = dirty.len(), "flushed dirty pages");
        Ok(())
    }
}

/// Read exactly one page at `page_id`'s offset into `buf`.
///
/// A short read is an error here; reads beyond the logical extent never
/// reach this function.
fn read_page_at(file: &mut File, page_id: PageId, buf: &mut PageBuf) -> Result<()> {
    file.seek(SeekFrom::Start(page_id.offset()))
        .and_then(|_| file.read_exact(buf.as_mut_slice()))
        .map_err(|source| Error::ReadFailed {
            page: page_id.0,
            source,
        })
}

/// Write a page's content at its offset, clearing the dirty flag on
/// success.
///
/// The content read-lock is held until the flag is cleared, so a write
/// guard released mid-flush cannot have its dirty mark lost.
fn flush_page_at(file: &mut File, page_id: PageId, page: &Page) -> Result<()> {
    let data = page.data();
    file.seek(SeekFrom::Start(page_id.offset()))
        .and_then(|_| file.write_all(data.as_slice()))
        .map_err(|source| Error::WriteFailed {
            page: page_id.0,
            source,
        })?;
    page.clear_dirty();
    Ok(())
}
