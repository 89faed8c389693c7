//! Storage layer - page I/O behind the shared cache.
//!
//! The cache never does I/O itself; it calls a [`PageStore`]:
//! - [`PageStore::read_page`] fills a slot when a page is loaded
//! - [`PageStore::write_page`] writes a slot back on flush
//!
//! Two stores are provided:
//! - [`MemoryStore`] - pages in memory, every writeback recorded
//! - [`FileStore`] - one file per relation fork under a root directory

mod file_store;
mod memory_store;
mod page;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use page::Page;

use crate::common::{BufferTag, Result};

/// Backing storage for cached pages.
///
/// Implementations must be callable from many threads at once. The cache
/// holds the slot's content lock exclusively while calling in, and never a
/// header lock.
pub trait PageStore: Send + Sync {
    /// Read the page identified by `tag` into `page`.
    fn read_page(&self, tag: &BufferTag, page: &mut Page) -> Result<()>;

    /// Write `page` as the current version of the page identified by `tag`.
    fn write_page(&self, tag: &BufferTag, page: &Page) -> Result<()>;
}
