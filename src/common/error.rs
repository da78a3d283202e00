//! Error types for StrataDB.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in StrataDB.
///
/// Every variant carries enough context (the offending page identifier,
/// the underlying I/O cause) for a calling layer to distinguish "retry the
/// whole operation" (I/O failures) from "this request is malformed"
/// (bounds/size/closed) without parsing message text.
#[derive(Debug, Error)]
pub enum Error {
    /// The page identifier is at or beyond `MAX_PAGES`. Caller bug.
    #[error("page {page} out of bounds (max {max})")]
    PageOutOfBounds { page: u32, max: u32 },

    /// Operation attempted after `close`. Caller bug.
    #[error("pager is closed")]
    Closed,

    /// Write payload length does not equal `PAGE_SIZE`. Caller bug.
    #[error("invalid page data size: expected {expected} bytes, got {actual}")]
    InvalidPageSize { expected: usize, actual: usize },

    /// Reading a page from the backing file failed, including short reads.
    #[error("failed to read page {page}")]
    ReadFailed {
        page: u32,
        #[source]
        source: std::io::Error,
    },

    /// Writing a page back to the backing file failed.
    #[error("failed to write page {page}")]
    WriteFailed {
        page: u32,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure with no single-page context (open, metadata, sync).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
