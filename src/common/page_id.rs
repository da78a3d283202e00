//! Page identifiers and their file offsets.

use std::fmt;

use crate::common::config::PAGE_SIZE;

/// Identifies a page in the backing file.
///
/// Valid identifiers lie in `[0, MAX_PAGES)`; the identifier times
/// [`PAGE_SIZE`] gives the page's byte offset in the file.
///
/// # Example
/// ```
/// use stratadb::{PageId, PAGE_SIZE};
///
/// let page_id = PageId::new(42);
/// assert_eq!(page_id.0, 42);
/// assert_eq!(page_id.offset(), 42 * PAGE_SIZE as u64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Wrap a raw page index.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Byte offset of this page in the backing file.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.0 as u64 * PAGE_SIZE as u64
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}
