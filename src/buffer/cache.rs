//! Shared cache - the fixed pool of slots plus its hash index and free list.
//!
//! The [`SharedCache`] provides:
//! - The slot array, visited in index order by administrative scans
//! - Tag lookup through the sharded [`HashIndex`]
//! - The minimal load path ([`SharedCache::read_buffer`]) that makes a page
//!   resident so administrative operations have something to find

use std::sync::Arc;

use tracing::{debug, warn};

use crate::buffer::state::{IO_IN_PROGRESS, TAG_VALID, VALID};
use crate::buffer::{CacheStats, FreeList, HashIndex, PinnedSlot, SlotDescriptor};
use crate::common::config::CacheConfig;
use crate::common::{BufferTag, Error, Result, SlotId};
use crate::storage::PageStore;

/// The process-wide page cache, built once and shared by reference.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                         SharedCache                          │
/// │  ┌────────────────┐  ┌────────────────────────────────────┐  │
/// │  │  hash_index    │  │    slots: Vec<SlotDescriptor>      │  │
/// │  │ tag → SlotId   │─▶│  [Slot 1] [Slot 2] [Slot 3] ...    │  │
/// │  │ (N shards)     │  └────────────────────────────────────┘  │
/// │  └────────────────┘  ┌──────────────┐  ┌──────────────────┐  │
/// │                      │  free_list   │  │ store: PageStore │  │
/// │                      └──────────────┘  └──────────────────┘  │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `slots`: no lock - fixed size, each slot has its own header and content locks
/// - `hash_index`: one `RwLock` per shard
/// - `free_list`: `Mutex`
/// - `stats`: atomic counters
///
/// # Lock Order
/// content lock → shard lock → header lock. The header lock is never held
/// while waiting for anything else.
pub struct SharedCache {
    slots: Vec<SlotDescriptor>,
    hash_index: HashIndex,
    free_list: FreeList,
    store: Arc<dyn PageStore>,
    stats: CacheStats,
    config: CacheConfig,
}

impl SharedCache {
    /// Build a cache with every slot empty and on the free list.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if the configuration does not validate.
    pub fn new(config: CacheConfig, store: Arc<dyn PageStore>) -> Result<Self> {
        config.validate()?;

        let slots: Vec<SlotDescriptor> = (0..config.pool_size)
            .map(|index| SlotDescriptor::new(SlotId::from_index(index)))
            .collect();

        // Reversed so slot 1 is handed out first.
        let free_list = FreeList::with_slots(
            (0..config.pool_size)
                .rev()
                .map(SlotId::from_index)
                .collect(),
        );

        Ok(Self {
            slots,
            hash_index: HashIndex::new(config.hash_partitions),
            free_list,
            store,
            stats: CacheStats::new(),
            config,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of shared slots.
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.slots.len()
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// All shared slots, in slot-number order.
    #[inline]
    pub fn slots(&self) -> &[SlotDescriptor] {
        &self.slots
    }

    /// The descriptor for a shared slot, if the number is in range.
    #[inline]
    pub fn slot(&self, id: SlotId) -> Option<&SlotDescriptor> {
        id.index().and_then(|index| self.slots.get(index))
    }

    pub fn hash_index(&self) -> &HashIndex {
        &self.hash_index
    }

    pub fn free_list(&self) -> &FreeList {
        &self.free_list
    }

    pub fn store(&self) -> &dyn PageStore {
        self.store.as_ref()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Slot currently indexed under `tag`.
    pub fn lookup(&self, tag: &BufferTag) -> Option<SlotId> {
        self.hash_index.lookup(tag)
    }

    // ========================================================================
    // Load path
    // ========================================================================

    /// Make the page `tag` resident and pin it.
    ///
    /// Served from the cache when the page is already resident; otherwise
    /// read from the page store into a slot taken from the free list.
    ///
    /// # Errors
    /// - `Error::NoFreeSlots` if no reusable slot is on the free list
    /// - errors from `PageStore::read_page`
    pub fn read_buffer(&self, tag: BufferTag) -> Result<PinnedSlot<'_>> {
        loop {
            if let Some(id) = self.hash_index.lookup(&tag) {
                if let Some(pinned) = self.pin_resident(id, tag) {
                    CacheStats::bump(&self.stats.cache_hits);
                    return Ok(pinned);
                }
                continue;
            }

            if let Some(pinned) = self.load_into_free_slot(tag)? {
                return Ok(pinned);
            }
        }
    }

    /// Pin slot `id` if it still holds a valid copy of `tag`.
    ///
    /// Returns `None` when the caller must retry the lookup: the slot was
    /// evicted meanwhile, its load failed, or the index entry is stale
    /// because the slot's identity was rewritten in place.
    fn pin_resident(&self, id: SlotId, tag: BufferTag) -> Option<PinnedSlot<'_>> {
        let slot = self.slot(id)?;

        {
            let mut header = slot.lock_header();
            if !header.state.is_tag_valid() || header.tag != tag {
                drop(header);
                self.drop_stale_entry(id, tag);
                return None;
            }
            header.state.pin();
            header.state.bump_usage();
        }

        // Waits out an in-flight load, which holds the content lock exclusively.
        let content = slot.content();
        let header = slot.header();
        drop(content);

        if header.tag == tag && header.state.is_valid() {
            Some(PinnedSlot::new(self, slot, tag))
        } else {
            self.release(id);
            None
        }
    }

    /// Remove `tag → id` from the index if `id` no longer holds `tag`.
    fn drop_stale_entry(&self, id: SlotId, tag: BufferTag) {
        let Some(slot) = self.slot(id) else {
            return;
        };

        let mut shard = self.hash_index.lock_shard(&tag);
        if shard.get(&tag) != Some(&id) {
            return;
        }
        let current = {
            let mut header = slot.lock_header();
            if header.state.is_tag_valid() && header.tag == tag {
                return;
            }
            if header.indexed_tag == Some(tag) {
                header.indexed_tag = None;
            }
            header.tag
        };
        shard.remove(&tag);
        warn!(slot = %id, %tag, %current, "dropped stale hash index entry");
    }

    /// Miss path. Returns `Ok(None)` if another thread loaded `tag` first.
    fn load_into_free_slot(&self, tag: BufferTag) -> Result<Option<PinnedSlot<'_>>> {
        let (slot, mut content) = loop {
            let id = self.free_list.pop().ok_or(Error::NoFreeSlots)?;
            let Some(slot) = self.slot(id) else {
                continue;
            };
            let content = slot.content_exclusive();
            let header = slot.header();
            if !header.state.is_tag_valid() && header.state.pin_count() == 0 {
                break (slot, content);
            }
            debug!(slot = %id, "discarded busy slot from free list");
        };
        let id = slot.id();

        {
            let mut shard = self.hash_index.lock_shard(&tag);
            if shard.contains_key(&tag) {
                drop(shard);
                drop(content);
                self.free_list.push_unique(id);
                return Ok(None);
            }

            let mut header = slot.lock_header();
            header.tag = tag;
            header.indexed_tag = Some(tag);
            header.state.clear_flags_and_usage();
            header.state.insert(TAG_VALID | IO_IN_PROGRESS);
            header.state.pin();
            drop(header);

            shard.insert(tag, id);
        }

        if let Err(err) = self.store.read_page(&tag, &mut content) {
            warn!(slot = %id, %tag, error = %err, "page read failed");
            {
                let mut shard = self.hash_index.lock_shard(&tag);
                let mut header = slot.lock_header();
                header.tag = BufferTag::CLEARED;
                header.indexed_tag = None;
                header.state.clear_flags_and_usage();
                header.state.unpin();
                drop(header);
                if shard.get(&tag) == Some(&id) {
                    shard.remove(&tag);
                }
            }
            drop(content);
            self.free_list.push_unique(id);
            return Err(err);
        }

        {
            let mut header = slot.lock_header();
            header.state.remove(IO_IN_PROGRESS);
            header.state.insert(VALID);
            header.state.bump_usage();
        }
        drop(content);

        CacheStats::bump(&self.stats.pages_loaded);
        debug!(slot = %id, %tag, "loaded page");
        Ok(Some(PinnedSlot::new(self, slot, tag)))
    }

    /// Drop one pin on `id`.
    ///
    /// A slot that was evicted while pinned could not be reused; once its
    /// last pin goes it is put back on the free list.
    pub(crate) fn release(&self, id: SlotId) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        let reusable = {
            let mut header = slot.lock_header();
            let pins = header.state.unpin();
            pins == 0 && !header.state.is_tag_valid()
        };
        if reusable {
            self.free_list.push_unique(id);
        }
    }
}
