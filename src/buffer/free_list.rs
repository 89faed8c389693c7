//! Free list of slots available to the load path.

use parking_lot::Mutex;

use crate::common::SlotId;

#[derive(Debug, Default)]
struct Inner {
    stack: Vec<SlotId>,
    /// Membership by descriptor index, so a slot is never listed twice.
    listed: Vec<bool>,
}

impl Inner {
    fn is_listed(&self, index: usize) -> bool {
        self.listed.get(index).copied().unwrap_or(false)
    }

    fn set_listed(&mut self, index: usize, listed: bool) {
        if index >= self.listed.len() {
            self.listed.resize(index + 1, false);
        }
        self.listed[index] = listed;
    }
}

/// Stack of shared slot numbers eligible for reuse (LIFO for cache locality).
///
/// An entry is only a hint: the load path re-checks the slot's state before
/// reusing it and discards entries that were re-tagged or pinned meanwhile.
/// Each slot appears at most once; numbers that do not denote a shared slot
/// are ignored.
#[derive(Debug, Default)]
pub struct FreeList {
    inner: Mutex<Inner>,
}

impl FreeList {
    /// Create a free list holding `slots`; the last one is handed out first.
    pub fn with_slots(slots: Vec<SlotId>) -> Self {
        let list = Self::default();
        {
            let mut inner = list.inner.lock();
            inner.stack.reserve(slots.len());
            for slot in slots {
                Self::push_locked(&mut inner, slot);
            }
        }
        list
    }

    /// Put a slot at the head of the list unless it is already on it.
    ///
    /// Returns `true` if the slot was added.
    pub fn push_unique(&self, slot: SlotId) -> bool {
        Self::push_locked(&mut self.inner.lock(), slot)
    }

    /// Take the slot at the head of the list.
    pub fn pop(&self) -> Option<SlotId> {
        let mut inner = self.inner.lock();
        let slot = inner.stack.pop()?;
        if let Some(index) = slot.index() {
            inner.set_listed(index, false);
        }
        Some(slot)
    }

    /// Check whether `slot` is on the list.
    pub fn contains(&self, slot: SlotId) -> bool {
        slot.index().is_some_and(|index| self.inner.lock().is_listed(index))
    }

    /// Number of entries on the list.
    pub fn len(&self) -> usize {
        self.inner.lock().stack.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().stack.is_empty()
    }

    fn push_locked(inner: &mut Inner, slot: SlotId) -> bool {
        let Some(index) = slot.index() else {
            return false;
        };
        if inner.is_listed(index) {
            return false;
        }
        inner.set_listed(index, true);
        inner.stack.push(slot);
        true
    }
}
