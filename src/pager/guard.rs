//! RAII handles for pinned pages.
//!
//! These guards hold the pin a fetch acquired:
//! - [`PageReadGuard`] - read-intent access (many may coexist)
//! - [`PageWriteGuard`] - write-intent access (marks the page dirty on drop)
//!
//! Dropping a guard is the only path that releases its pin, so a caller can
//! never forget to unpin. The guard keeps the page alive through an `Arc`,
//! and content access goes through short-lived lock borrows, so no reader
//! can observe a page mid-write.

use std::sync::Arc;

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::cache::{Page, PageBuf};
use crate::common::PageId;

use super::pager::Pager;

/// Guard for read-intent page access.
///
/// Any number of read guards may target the same page at once. The pin is
/// released when the guard is dropped; the page stays clean.
///
/// # Example
/// ```ignore
/// let guard = pager.read_page(page_id)?;
/// let first = guard.data().as_slice()[0];
/// // guard drops here, pin released
/// ```
pub struct PageReadGuard<'a> {
    /// Reference back to the pager for release on drop.
    pager: &'a Pager,
    /// Identifier this guard was fetched for.
    page_id: PageId,
    /// The pinned page, kept alive independently of the cache.
    page: Arc<Page>,
}

impl<'a> PageReadGuard<'a> {
    /// Called by [`Pager::read_page`].
    pub(crate) fn new(pager: &'a Pager, page_id: PageId, page: Arc<Page>) -> Self {
        Self {
            pager,
            page_id,
            page,
        }
    }

    /// Identifier of the guarded page.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Current pin count of the page (this guard included).
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.page.pin_count()
    }

    /// Borrow the page content for reading.
    #[inline]
    pub fn data(&self) -> RwLockReadGuard<'_, PageBuf> {
        self.page.data()
    }
}

impl Drop for PageReadGuard<'_> {
    fn drop(&mut self) {
        // Read intent: not dirty
        self.pager.release_page(&self.page, false);
    }
}

/// Guard for write-intent page access.
///
/// Dropping the guard releases the pin and marks the page dirty, so the
/// next flush writes it back; declaring intent at fetch time replaces a
/// separate "unpin dirty" call.
///
/// # Example
/// ```ignore
/// let guard = pager.get_page(page_id)?;
/// guard.data_mut().as_mut_slice()[0] = 0xFF;
/// // guard drops here, page marked dirty, pin released
/// ```
pub struct PageWriteGuard<'a> {
    /// Reference back to the pager for release on drop.
    pager: &'a Pager,
    /// Identifier this guard was fetched for.
    page_id: PageId,
    /// The pinned page, kept alive independently of the cache.
    page: Arc<Page>,
}

impl<'a> PageWriteGuard<'a> {
    /// Called by [`Pager::get_page`].
    pub(crate) fn new(pager: &'a Pager, page_id: PageId, page: Arc<Page>) -> Self {
        Self {
            pager,
            page_id,
            page,
        }
    }

    /// Identifier of the guarded page.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Current pin count of the page (this guard included).
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.page.pin_count()
    }

    /// Borrow the page content for reading.
    #[inline]
    pub fn data(&self) -> RwLockReadGuard<'_, PageBuf> {
        self.page.data()
    }

    /// Borrow the page content for writing.
    ///
    /// Holding the returned borrow gives exclusive access to the content;
    /// release it before calling back into the pager or its flush paths
    /// will block on this page.
    #[inline]
    pub fn data_mut(&self) -> RwLockWriteGuard<'_, PageBuf> {
        self.page.data_mut()
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        // Write intent: always dirty
        self.pager.release_page(&self.page, true);
    }
}
