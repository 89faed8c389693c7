//! In-memory page store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::common::{BlockNumber, BufferTag, Error, ForkNumber, RelFileLocator, Result};
use crate::storage::{Page, PageStore};

/// A [`PageStore`] that keeps every page in memory.
///
/// Each `write_page` call is appended to a writeback log so callers can
/// check exactly which pages a flush touched. Writes can be made to fail on
/// demand to exercise error propagation.
///
/// # Example
/// ```
/// use bufctl::storage::MemoryStore;
/// use bufctl::{ForkNumber, RelFileLocator};
///
/// let store = MemoryStore::new();
/// let rel = RelFileLocator::new(1663, 5, 16384);
/// store.extend(rel, ForkNumber::Main, 3);
/// assert_eq!(store.nblocks(rel, ForkNumber::Main), 3);
/// ```
#[derive(Default)]
pub struct MemoryStore {
    pages: Mutex<HashMap<BufferTag, Box<Page>>>,
    writebacks: Mutex<Vec<BufferTag>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `count` zeroed blocks to a relation fork.
    ///
    /// Returns the number of the first new block.
    pub fn extend(&self, locator: RelFileLocator, fork: ForkNumber, count: u32) -> BlockNumber {
        let mut pages = self.pages.lock();
        let first = Self::count_blocks(&pages, locator, fork);
        for block in first..first + count {
            let tag = BufferTag::new(locator, fork, BlockNumber::new(block));
            pages.insert(tag, Box::new(Page::new()));
        }
        BlockNumber::new(first)
    }

    /// Store `page` under `tag`, replacing any previous version.
    ///
    /// Unlike `write_page` this is not recorded in the writeback log.
    pub fn put(&self, tag: BufferTag, page: &Page) {
        let mut stored = Box::new(Page::new());
        stored.copy_from(page);
        self.pages.lock().insert(tag, stored);
    }

    /// Number of blocks stored for a relation fork.
    pub fn nblocks(&self, locator: RelFileLocator, fork: ForkNumber) -> u32 {
        Self::count_blocks(&self.pages.lock(), locator, fork)
    }

    /// Run `f` over the stored bytes of `tag`, if present.
    pub fn with_page<R>(&self, tag: &BufferTag, f: impl FnOnce(&Page) -> R) -> Option<R> {
        self.pages.lock().get(tag).map(|page| f(page))
    }

    /// Every tag passed to `write_page`, in call order.
    pub fn writebacks(&self) -> Vec<BufferTag> {
        self.writebacks.lock().clone()
    }

    /// Forget the writeback log.
    pub fn clear_writebacks(&self) {
        self.writebacks.lock().clear();
    }

    /// Make subsequent `write_page` calls fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    fn count_blocks(
        pages: &HashMap<BufferTag, Box<Page>>,
        locator: RelFileLocator,
        fork: ForkNumber,
    ) -> u32 {
        pages
            .keys()
            .filter(|tag| tag.locator() == locator && tag.fork_number == fork)
            .count() as u32
    }
}

impl PageStore for MemoryStore {
    fn read_page(&self, tag: &BufferTag, page: &mut Page) -> Result<()> {
        let pages = self.pages.lock();
        let stored = pages
            .get(tag)
            .ok_or_else(|| Error::Storage(format!("could not read block {}", tag)))?;
        page.copy_from(stored);
        Ok(())
    }

    fn write_page(&self, tag: &BufferTag, page: &Page) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::Storage(format!("could not write block {}", tag)));
        }
        self.put(*tag, page);
        self.writebacks.lock().push(*tag);
        Ok(())
    }
}
