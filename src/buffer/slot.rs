//! Slot descriptor - one fixed entry of the shared pool.
//!
//! A [`SlotDescriptor`] holds a [`Page`] plus the metadata the cache and the
//! administrative tools work on:
//! - Which page is held (the [`BufferTag`]), meaningful only with `TAG_VALID`
//! - The packed [`SlotState`] word (flags, usage count, pin count)
//! - The key the slot is registered under in the hash index, which an
//!   identity change leaves behind

use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::buffer::state::SlotState;
use crate::common::{BufferTag, SlotId};
use crate::storage::Page;

/// Identity and state of a slot, guarded by the header lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHeader {
    pub tag: BufferTag,
    pub state: SlotState,
    /// Hash index key inserted by the load path. Differs from `tag` after an
    /// in-place identity change.
    pub indexed_tag: Option<BufferTag>,
}

impl SlotHeader {
    /// Header of a slot that holds nothing.
    pub const EMPTY: SlotHeader = SlotHeader {
        tag: BufferTag::CLEARED,
        state: SlotState::EMPTY,
        indexed_tag: None,
    };
}

/// A slot in the shared pool.
///
/// Slots are allocated once when the cache is built and never reallocated;
/// only their tag and state change.
///
/// # Locks
/// - `header`: short-held `Mutex` over tag + state. Never held while
///   waiting for `content` or doing page I/O.
/// - `content`: `RwLock` over the page bytes. Exclusive mode is required
///   for every administrative mutation.
pub struct SlotDescriptor {
    id: SlotId,
    header: Mutex<SlotHeader>,
    content: RwLock<Page>,
}

impl SlotDescriptor {
    /// Create an empty slot.
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            header: Mutex::new(SlotHeader::EMPTY),
            content: RwLock::new(Page::new()),
        }
    }

    /// Slot number of this descriptor.
    #[inline]
    pub fn id(&self) -> SlotId {
        self.id
    }

    // ========================================================================
    // Header lock
    // ========================================================================

    /// Acquire the header lock.
    #[inline]
    pub fn lock_header(&self) -> MutexGuard<'_, SlotHeader> {
        self.header.lock()
    }

    /// Copy of the header taken under the header lock.
    #[inline]
    pub fn header(&self) -> SlotHeader {
        *self.header.lock()
    }

    /// Pin the slot. Returns the new pin count.
    pub fn pin(&self) -> u32 {
        self.header.lock().state.pin()
    }

    /// Unpin the slot. Returns the new pin count.
    pub fn unpin(&self) -> u32 {
        self.header.lock().state.unpin()
    }

    // ========================================================================
    // Content lock
    // ========================================================================

    /// Acquire the content lock in shared mode.
    #[inline]
    pub fn content(&self) -> RwLockReadGuard<'_, Page> {
        self.content.read()
    }

    /// Acquire the content lock in exclusive mode.
    #[inline]
    pub fn content_exclusive(&self) -> RwLockWriteGuard<'_, Page> {
        self.content.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::state::{DIRTY, TAG_VALID, VALID};
    use crate::common::{BlockNumber, ForkNumber, RelFileLocator};

    #[test]
    fn test_slot_new() {
        let slot = SlotDescriptor::new(SlotId::new(1));
        assert_eq!(slot.id(), SlotId::new(1));
        assert_eq!(slot.header(), SlotHeader::EMPTY);
        assert!(!slot.header().state.is_tag_valid());
    }

    #[test]
    fn test_slot_pin_unpin() {
        let slot = SlotDescriptor::new(SlotId::new(1));
        assert_eq!(slot.pin(), 1);
        assert_eq!(slot.pin(), 2);
        assert_eq!(slot.header().state.pin_count(), 2);
        assert_eq!(slot.unpin(), 1);
        assert_eq!(slot.unpin(), 0);
    }

    #[test]
    fn test_slot_header_update() {
        let slot = SlotDescriptor::new(SlotId::new(3));
        let tag = BufferTag::new(
            RelFileLocator::new(1, 5, 100),
            ForkNumber::Main,
            BlockNumber::new(3),
        );

        {
            let mut header = slot.lock_header();
            header.tag = tag;
            header.state.insert(TAG_VALID | VALID | DIRTY);
        }

        let header = slot.header();
        assert_eq!(header.tag, tag);
        assert!(header.state.is_dirty());
    }

    #[test]
    fn test_slot_content_access() {
        let slot = SlotDescriptor::new(SlotId::new(1));

        slot.content_exclusive().as_mut_slice()[0] = 0xAB;
        assert_eq!(slot.content().as_slice()[0], 0xAB);
    }

    #[test]
    fn test_slot_concurrent_reads() {
        use std::sync::Arc;
        use std::thread;

        let slot = Arc::new(SlotDescriptor::new(SlotId::new(1)));
        slot.content_exclusive().as_mut_slice()[0] = 0x42;

        let mut handles = vec![];

        for _ in 0..10 {
            let slot_clone = Arc::clone(&slot);
            handles.push(thread::spawn(move || {
                let page = slot_clone.content();
                assert_eq!(page.as_slice()[0], 0x42);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_slot_concurrent_pin() {
        use std::sync::Arc;
        use std::thread;

        let slot = Arc::new(SlotDescriptor::new(SlotId::new(1)));
        let mut handles = vec![];

        for _ in 0..10 {
            let slot_clone = Arc::clone(&slot);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    slot_clone.pin();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(slot.header().state.pin_count(), 1000);
    }
}
