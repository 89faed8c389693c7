//! Slot identifier type.

use std::fmt;

/// Identifies a slot in the buffer cache.
///
/// Slot numbers follow the storage engine's buffer numbering:
/// - `1..=pool_size` are shared slots (descriptor index `n - 1`)
/// - negative numbers are session-local slots
/// - `0` is the "invalid slot" sentinel
///
/// # Example
/// ```
/// use bufctl::SlotId;
///
/// let slot = SlotId::new(5);
/// assert!(slot.is_shared());
/// assert_eq!(slot.index(), Some(4));
/// assert!(!SlotId::INVALID.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub i32);

impl SlotId {
    /// Invalid/sentinel slot number.
    pub const INVALID: SlotId = SlotId(0);

    /// Create a new SlotId.
    #[inline]
    pub fn new(id: i32) -> Self {
        SlotId(id)
    }

    /// Slot number for the descriptor at `index` in the shared pool.
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        SlotId(index as i32 + 1)
    }

    /// Check if this is not the sentinel value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Check if this number denotes a session-local slot.
    #[inline]
    pub fn is_local(&self) -> bool {
        self.0 < 0
    }

    /// Check if this number denotes a shared slot.
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.0 > 0
    }

    /// Descriptor index in the shared pool, if this is a shared slot.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        if self.is_shared() {
            Some(self.0 as usize - 1)
        } else {
            None
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
