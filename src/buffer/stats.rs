//! Shared cache statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by the shared cache and the administrative tools.
///
/// All fields are atomic for lock-free, thread-safe updates.
///
/// # Memory Ordering
/// `Ordering::Relaxed` everywhere: counters are independent and only need
/// atomicity, not ordering with respect to each other.
///
/// # Example
/// ```
/// use bufctl::buffer::CacheStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = CacheStats::new();
/// stats.slots_flushed.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().slots_flushed, 1);
/// ```
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Load requests served from an already-resident slot.
    pub cache_hits: AtomicU64,

    /// Pages read from the page store into a slot.
    pub pages_loaded: AtomicU64,

    /// mark-dirty applications on a valid slot.
    pub slots_marked_dirty: AtomicU64,

    /// Successful writebacks.
    pub slots_flushed: AtomicU64,

    /// change-* applications (identity fields rewritten in place).
    pub tags_changed: AtomicU64,

    /// Slots evicted by invalidate.
    pub slots_invalidated: AtomicU64,
}

impl CacheStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            pages_loaded: self.pages_loaded.load(Ordering::Relaxed),
            slots_marked_dirty: self.slots_marked_dirty.load(Ordering::Relaxed),
            slots_flushed: self.slots_flushed.load(Ordering::Relaxed),
            tags_changed: self.tags_changed.load(Ordering::Relaxed),
            slots_invalidated: self.slots_invalidated.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.pages_loaded.store(0, Ordering::Relaxed);
        self.slots_marked_dirty.store(0, Ordering::Relaxed);
        self.slots_flushed.store(0, Ordering::Relaxed);
        self.tags_changed.store(0, Ordering::Relaxed);
        self.slots_invalidated.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub pages_loaded: u64,
    pub slots_marked_dirty: u64,
    pub slots_flushed: u64,
    pub tags_changed: u64,
    pub slots_invalidated: u64,
}

impl StatsSnapshot {
    /// Fraction of load requests served without I/O (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.pages_loaded;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, loads: {}, dirtied: {}, flushed: {}, \
             retagged: {}, invalidated: {} }}",
            self.cache_hits,
            self.pages_loaded,
            self.slots_marked_dirty,
            self.slots_flushed,
            self.tags_changed,
            self.slots_invalidated
        )
    }
}
