//! RAII pin on a resident slot.
//!
//! A [`PinnedSlot`] keeps its slot from being reused by the load path for as
//! long as it lives. Content access still goes through the slot's content
//! lock; the pin only holds the slot in place.

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::buffer::state::DIRTY;
use crate::buffer::{SharedCache, SlotDescriptor};
use crate::common::{BufferTag, SlotId};
use crate::storage::Page;

/// A pin on one shared slot, released on drop.
///
/// # Example
/// ```ignore
/// let pinned = cache.read_buffer(tag)?;
/// let first = pinned.read().as_slice()[0];
/// // pinned drops here, slot unpinned
/// ```
pub struct PinnedSlot<'a> {
    /// Reference back to the cache for unpin on drop.
    cache: &'a SharedCache,
    slot: &'a SlotDescriptor,
    /// Tag the slot held when it was pinned.
    tag: BufferTag,
}

impl<'a> PinnedSlot<'a> {
    /// Called by `SharedCache::read_buffer()` after the pin is taken.
    pub(crate) fn new(cache: &'a SharedCache, slot: &'a SlotDescriptor, tag: BufferTag) -> Self {
        Self { cache, slot, tag }
    }

    #[inline]
    pub fn slot_id(&self) -> SlotId {
        self.slot.id()
    }

    /// Tag the slot held when it was pinned. An administrative change
    /// operation may have rewritten the slot's identity since.
    #[inline]
    pub fn tag(&self) -> BufferTag {
        self.tag
    }

    /// Shared access to the page bytes.
    pub fn read(&self) -> RwLockReadGuard<'a, Page> {
        self.slot.content()
    }

    /// Exclusive access to the page bytes.
    ///
    /// Writers should call [`PinnedSlot::mark_dirty`] while still holding
    /// the returned guard.
    pub fn write(&self) -> RwLockWriteGuard<'a, Page> {
        self.slot.content_exclusive()
    }

    /// Flag the slot as modified since its last writeback.
    pub fn mark_dirty(&self) {
        self.slot.lock_header().state.insert(DIRTY);
    }
}

impl Drop for PinnedSlot<'_> {
    fn drop(&mut self) {
        self.cache.release(self.slot.id());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::buffer::SharedCache;
    use crate::common::config::CacheConfig;
    use crate::common::{BlockNumber, BufferTag, ForkNumber, RelFileLocator};
    use crate::storage::MemoryStore;

    fn setup() -> (SharedCache, BufferTag) {
        let locator = RelFileLocator::new(1663, 5, 200);
        let store = Arc::new(MemoryStore::new());
        store.extend(locator, ForkNumber::Main, 1);
        let cache = SharedCache::new(CacheConfig::default().with_pool_size(4), store).unwrap();
        (cache, BufferTag::new(locator, ForkNumber::Main, BlockNumber::new(0)))
    }

    #[test]
    fn test_write_and_mark_dirty() {
        let (cache, tag) = setup();
        let pinned = cache.read_buffer(tag).unwrap();
        {
            let mut page = pinned.write();
            page.as_mut_slice()[10] = 7;
            pinned.mark_dirty();
        }
        assert_eq!(pinned.read().as_slice()[10], 7);

        let header = cache.slot(pinned.slot_id()).unwrap().header();
        assert!(header.state.is_dirty());
        assert_eq!(pinned.tag(), tag);
    }

    #[test]
    fn test_drop_unpins() {
        let (cache, tag) = setup();
        let pinned = cache.read_buffer(tag).unwrap();
        let id = pinned.slot_id();
        assert_eq!(cache.slot(id).unwrap().header().state.pin_count(), 1);
        drop(pinned);
        assert_eq!(cache.slot(id).unwrap().header().state.pin_count(), 0);
    }
}
