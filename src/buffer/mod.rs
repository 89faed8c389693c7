//! Shared page cache.
//!
//! A fixed pool of slots, each holding one page plus its identity and state,
//! indexed by tag through a sharded hash table.
//!
//! # Components
//! - [`SharedCache`] - The slot pool, hash index, free list and load path
//! - [`SlotDescriptor`] - One slot: header lock over tag + state, content lock over the page
//! - [`PinnedSlot`] - RAII pin returned by the load path
//! - [`HashIndex`] / [`FreeList`] - Tag lookup and reusable-slot tracking
//! - [`CacheStats`] - Counters for loads and administrative actions
//! - [`state`] - The packed slot state word

mod cache;
mod free_list;
mod hash_index;
mod pin_guard;
mod slot;
pub mod state;
mod stats;

pub use cache::SharedCache;
pub use free_list::FreeList;
pub use hash_index::{HashIndex, Shard};
pub use pin_guard::PinnedSlot;
pub use slot::{SlotDescriptor, SlotHeader};
pub use state::SlotState;
pub use stats::{CacheStats, StatsSnapshot};
