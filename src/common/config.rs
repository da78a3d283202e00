//! Configuration constants for StrataDB.

use crate::common::PageId;

/// Bytes in one page (4KB).
///
/// This value matches the OS page size on most systems and is a common
/// database page size. It is fixed at build time, is not persisted in the
/// backing file, and must be identical across every process that opens a
/// given file: the logical page count is derived as `file size / PAGE_SIZE`.
///
/// # Memory Layout
/// Page `i` occupies the byte range `[i * PAGE_SIZE, (i + 1) * PAGE_SIZE)`
/// of the backing file.
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of addressable pages per file.
///
/// Bounds the identifier space: valid page ids are `[0, MAX_PAGES)`. With
/// 4KB pages this caps a file at roughly 3.8GB.
pub const MAX_PAGES: u32 = 1_000_000;

/// Cache capacity used when a caller passes zero to [`Pager::open`] or
/// [`LruCache::new`].
///
/// [`Pager::open`]: crate::pager::Pager::open
/// [`LruCache::new`]: crate::cache::LruCache::new
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Page 0 is reserved by convention for a future header structure.
///
/// The page store imposes no format on its contents; it is simply page 0.
pub const HEADER_PAGE_NUM: PageId = PageId(0);
