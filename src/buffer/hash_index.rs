//! Hash index - maps a resident page's tag to its slot.
//!
//! The index is split into a fixed number of shards. Each shard has its own
//! lock; structural changes (insert/remove) take it exclusively, lookups
//! take it shared.
//!
//! Invariant: a slot is present in the index iff its `TAG_VALID` flag is
//! set, under exactly the tag it holds.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use parking_lot::{RwLock, RwLockWriteGuard};

use crate::common::{BufferTag, SlotId};

/// One locked partition of the index.
pub type Shard = HashMap<BufferTag, SlotId>;

/// Sharded map from [`BufferTag`] to [`SlotId`].
pub struct HashIndex {
    shards: Vec<RwLock<Shard>>,
    mask: usize,
}

impl HashIndex {
    /// Create an index with `partitions` shards.
    ///
    /// # Panics
    /// Panics if `partitions` is not a power of two.
    pub fn new(partitions: usize) -> Self {
        assert!(
            partitions.is_power_of_two(),
            "partitions must be a power of two"
        );
        Self {
            shards: (0..partitions).map(|_| RwLock::new(HashMap::new())).collect(),
            mask: partitions - 1,
        }
    }

    /// Hash code of a tag. Stable for the lifetime of the process.
    pub fn hash_code(tag: &BufferTag) -> u64 {
        let mut hasher = DefaultHasher::new();
        tag.hash(&mut hasher);
        hasher.finish()
    }

    /// Shard a tag belongs to.
    #[inline]
    pub fn partition_of(&self, tag: &BufferTag) -> usize {
        (Self::hash_code(tag) as usize) & self.mask
    }

    /// Number of shards.
    pub fn partitions(&self) -> usize {
        self.shards.len()
    }

    /// Acquire the shard lock for `tag` exclusively.
    ///
    /// Hold the returned guard across every insert/remove of `tag`.
    pub fn lock_shard(&self, tag: &BufferTag) -> RwLockWriteGuard<'_, Shard> {
        self.shards[self.partition_of(tag)].write()
    }

    /// Look up the slot currently indexed under `tag`.
    pub fn lookup(&self, tag: &BufferTag) -> Option<SlotId> {
        self.shards[self.partition_of(tag)].read().get(tag).copied()
    }

    /// Total number of indexed tags.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    /// Check if no tag is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every `(tag, slot)` entry, in no particular order.
    pub fn entries(&self) -> Vec<(BufferTag, SlotId)> {
        self.shards
            .iter()
            .flat_map(|shard| {
                shard
                    .read()
                    .iter()
                    .map(|(&tag, &slot)| (tag, slot))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
