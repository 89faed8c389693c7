//! Slot state word.
//!
//! One `u32` per slot packs the flags, the usage count and the pin count:
//!
//! ```text
//!  31      27 26 25 24 23 22 21  18 17               0
//! ┌─────────┬──┬──┬──┬──┬──┬──────┬──────────────────┐
//! │reserved │IE│IO│TV│V │D │usage │    pin count     │
//! └─────────┴──┴──┴──┴──┴──┴──────┴──────────────────┘
//! ```
//!
//! The word is only read or written while the slot's header lock is held.

use std::fmt;

use crate::common::config::{MAX_PIN_COUNT, MAX_USAGE_COUNT};

const PIN_COUNT_MASK: u32 = (1 << 18) - 1;
const USAGE_COUNT_SHIFT: u32 = 18;
const USAGE_COUNT_MASK: u32 = 0xF << USAGE_COUNT_SHIFT;

/// Slot holds modified content not yet written back.
pub const DIRTY: u32 = 1 << 22;
/// Slot content is a complete, readable copy of the page.
pub const VALID: u32 = 1 << 23;
/// Slot tag is meaningful and present in the hash index.
pub const TAG_VALID: u32 = 1 << 24;
/// A read or writeback of this slot is under way.
pub const IO_IN_PROGRESS: u32 = 1 << 25;
/// The last writeback of this slot failed.
pub const IO_ERROR: u32 = 1 << 26;

/// All flag bits.
pub const FLAG_MASK: u32 = DIRTY | VALID | TAG_VALID | IO_IN_PROGRESS | IO_ERROR;

/// Packed per-slot state.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotState(u32);

impl SlotState {
    /// State of a slot that holds nothing.
    pub const EMPTY: SlotState = SlotState(0);

    /// Raw packed value.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Check whether every bit of `flags` is set.
    #[inline]
    pub fn contains(&self, flags: u32) -> bool {
        self.0 & flags == flags
    }

    #[inline]
    pub fn insert(&mut self, flags: u32) {
        self.0 |= flags & FLAG_MASK;
    }

    #[inline]
    pub fn remove(&mut self, flags: u32) {
        self.0 &= !(flags & FLAG_MASK);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.contains(DIRTY)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.contains(VALID)
    }

    #[inline]
    pub fn is_tag_valid(&self) -> bool {
        self.contains(TAG_VALID)
    }

    #[inline]
    pub fn is_io_in_progress(&self) -> bool {
        self.contains(IO_IN_PROGRESS)
    }

    // ========================================================================
    // Counters
    // ========================================================================

    /// Number of current pins (references) on the slot.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.0 & PIN_COUNT_MASK
    }

    /// Recency hint maintained by the load path.
    #[inline]
    pub fn usage_count(&self) -> u32 {
        (self.0 & USAGE_COUNT_MASK) >> USAGE_COUNT_SHIFT
    }

    /// Increment the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if the pin count would overflow its field.
    #[inline]
    pub fn pin(&mut self) -> u32 {
        let pins = self.pin_count();
        assert!(pins < MAX_PIN_COUNT, "pin count overflow");
        self.0 += 1;
        pins + 1
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if the pin count is already 0.
    #[inline]
    pub fn unpin(&mut self) -> u32 {
        let pins = self.pin_count();
        assert!(pins > 0, "pin count underflow");
        self.0 -= 1;
        pins - 1
    }

    /// Raise the usage count by one, saturating at `MAX_USAGE_COUNT`.
    #[inline]
    pub fn bump_usage(&mut self) {
        let usage = self.usage_count();
        if usage < MAX_USAGE_COUNT {
            self.0 += 1 << USAGE_COUNT_SHIFT;
        }
    }

    /// Clear all flags and the usage count; the pin count is kept.
    #[inline]
    pub fn clear_flags_and_usage(&mut self) {
        self.0 &= !(FLAG_MASK | USAGE_COUNT_MASK);
    }
}

impl fmt::Debug for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotState")
            .field("valid", &self.is_valid())
            .field("tag_valid", &self.is_tag_valid())
            .field("dirty", &self.is_dirty())
            .field("io_in_progress", &self.is_io_in_progress())
            .field("usage_count", &self.usage_count())
            .field("pin_count", &self.pin_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = SlotState::EMPTY;
        assert!(!state.is_valid());
        assert!(!state.is_tag_valid());
        assert!(!state.is_dirty());
        assert_eq!(state.pin_count(), 0);
        assert_eq!(state.usage_count(), 0);
    }

    #[test]
    fn test_flags_do_not_touch_counters() {
        let mut state = SlotState::EMPTY;
        state.pin();
        state.bump_usage();

        state.insert(VALID | TAG_VALID | DIRTY);
        assert!(state.contains(VALID | TAG_VALID));
        assert_eq!(state.pin_count(), 1);
        assert_eq!(state.usage_count(), 1);

        state.remove(DIRTY);
        assert!(!state.is_dirty());
        assert!(state.is_valid());
    }

    #[test]
    fn test_insert_ignores_counter_bits() {
        let mut state = SlotState::EMPTY;
        state.insert(1);
        assert_eq!(state.pin_count(), 0);
    }

    #[test]
    fn test_pin_unpin() {
        let mut state = SlotState::EMPTY;
        assert_eq!(state.pin(), 1);
        assert_eq!(state.pin(), 2);
        assert_eq!(state.unpin(), 1);
        assert_eq!(state.unpin(), 0);
    }

    #[test]
    #[should_panic(expected = "pin count underflow")]
    fn test_unpin_underflow() {
        let mut state = SlotState::EMPTY;
        state.unpin();
    }

    #[test]
    fn test_usage_saturates() {
        let mut state = SlotState::EMPTY;
        for _ in 0..20 {
            state.bump_usage();
        }
        assert_eq!(state.usage_count(), MAX_USAGE_COUNT);
        assert_eq!(state.pin_count(), 0);
    }

    #[test]
    fn test_clear_keeps_pins() {
        let mut state = SlotState::EMPTY;
        state.insert(VALID | TAG_VALID | DIRTY | IO_ERROR);
        state.bump_usage();
        state.pin();

        state.clear_flags_and_usage();
        assert_eq!(state.bits() & FLAG_MASK, 0);
        assert_eq!(state.usage_count(), 0);
        assert_eq!(state.pin_count(), 1);
    }
}
