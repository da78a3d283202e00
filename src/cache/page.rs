//! Page - the fundamental 4KB unit of caching and I/O.
//!
//! A [`PageBuf`] is the raw byte array that moves between disk and memory.
//! A [`Page`] wraps one `PageBuf` with the metadata the cache needs:
//! - A pin count holding the page in cache while nonzero
//! - A dirty flag driving write-back
//!
//! Cache entries share `Page`s via `Arc`, so a handle returned to a caller
//! stays valid for as long as the caller holds it.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::config::PAGE_SIZE;

/// A raw page buffer (4KB).
///
/// This is the unit of I/O between disk and memory. The content is opaque
/// to this layer: no header, no checksum, no interpretation.
///
/// # Example
/// ```
/// use stratadb::PageBuf;
///
/// let mut buf = PageBuf::new();
/// buf.as_mut_slice()[0] = 0xFF;
/// assert_eq!(buf.as_slice()[0], 0xFF);
/// ```
pub struct PageBuf {
    data: [u8; PAGE_SIZE],
}

impl PageBuf {
    /// Create a new zeroed buffer.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// View the content as a byte slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// View the content as a mutable byte slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the entire buffer.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Size of every page buffer, in bytes.
    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }
}

impl Default for PageBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// A cached page: content plus pin/dirty bookkeeping.
///
/// # Thread Safety
/// Every field is interior-mutable, so pages are shared as `Arc<Page>`
/// with no outer lock: the content sits behind an `RwLock` while the pin
/// count and dirty flag are plain atomics.
///
/// A page with `pin_count > 0` must never be evicted; the eviction scan in
/// the cache checks this flag, and guard release is the only path that
/// brings the count back down.
///
/// # Example
/// ```
/// use stratadb::Page;
///
/// let page = Page::new();
/// page.data_mut().as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.data().as_slice()[0], 0xFF);
/// assert!(!page.is_dirty());
/// ```
pub struct Page {
    /// The page content, protected by RwLock.
    data: RwLock<PageBuf>,

    /// Number of active holders of this page.
    pin_count: AtomicU32,

    /// Whether the content has been modified since it was loaded.
    dirty: AtomicBool,
}

impl Page {
    /// Create a new zeroed, unpinned, clean page.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(PageBuf::new()),
            pin_count: AtomicU32::new(0),
            dirty: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Content access (RwLock)
    // ========================================================================

    /// Acquire a read lock on the content.
    #[inline]
    pub fn data(&self) -> RwLockReadGuard<'_, PageBuf> {
        self.data.read()
    }

    /// Acquire a write lock on the content.
    #[inline]
    pub fn data_mut(&self) -> RwLockWriteGuard<'_, PageBuf> {
        self.data.write()
    }

    // ========================================================================
    // Pin count operations (Atomic)
    // ========================================================================

    /// Increment the pin count, returning the new value.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement the pin count, flooring at zero. Returns the new pin count.
    ///
    /// Releasing an already-unpinned page is a no-op rather than an error:
    /// the page may have been force-evicted, and release after eviction is
    /// part of the cache contract.
    #[inline]
    pub fn unpin(&self) -> u32 {
        let mut current = self.pin_count.load(Ordering::Relaxed);
        while current > 0 {
            match self.pin_count.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return current - 1,
                Err(observed) => current = observed,
            }
        }
        0
    }

    /// Current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Relaxed)
    }

    /// Check if the page is currently pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    // ========================================================================
    // Dirty flag operations (Atomic)
    // ========================================================================

    /// Mark the page as dirty (modified since load).
    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// Clear the dirty flag.
    #[inline]
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Relaxed);
    }

    /// Check if the page is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
