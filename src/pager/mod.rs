//! The page store: disk-backed pages behind the replacement cache.
//!
//! This module contains:
//! - [`Pager`] - The page store itself
//! - [`PageReadGuard`] / [`PageWriteGuard`] - Pinned-page access handles

mod guard;
#[allow(clippy::module_inception)]
mod pager;

pub use guard::{PageReadGuard, PageWriteGuard};
pub use pager::Pager;
