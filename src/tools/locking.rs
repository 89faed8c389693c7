//! The slot locking protocol shared by every scan handler.
//!
//! 1. Take the header lock and test the predicate.
//! 2. Release the header lock - it is never held while blocking.
//! 3. Take the content lock exclusively, waiting out ordinary readers and writers.
//! 4. Re-test the predicate under the header lock; the slot may have been
//!    evicted and reused while we waited.
//! 5. Apply the operation, then release the content lock. The operation
//!    reports whether the slot held anything for it to act on.

use tracing::debug;

use crate::buffer::{SlotDescriptor, SlotHeader};
use crate::common::Result;
use crate::storage::Page;

/// Outcome of visiting one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// The predicate held and the operation ran.
    Applied,
    /// The predicate did not hold at the first test.
    Mismatch,
    /// The slot changed identity between the first test and the content lock.
    Raced,
    /// The predicate held but the operation found nothing to act on.
    Idle,
}

impl Visit {
    #[inline]
    pub fn applied(self) -> bool {
        self == Visit::Applied
    }
}

/// Run `apply` on `slot` under its exclusive content lock if `matches` holds.
///
/// # Errors
/// Whatever `apply` returns. The predicate itself cannot fail.
pub fn with_matching_slot<P, F>(slot: &SlotDescriptor, matches: P, apply: F) -> Result<Visit>
where
    P: Fn(&SlotHeader) -> bool,
    F: FnOnce(&mut Page) -> Result<bool>,
{
    if !matches(&slot.header()) {
        return Ok(Visit::Mismatch);
    }

    let mut content = slot.content_exclusive();

    let header = slot.header();
    if !matches(&header) {
        debug!(
            slot = %slot.id(),
            tag = %header.tag,
            "slot changed before content lock, skipped"
        );
        return Ok(Visit::Raced);
    }

    debug!(slot = %slot.id(), tag = %header.tag, "slot matched");
    if apply(&mut content)? {
        Ok(Visit::Applied)
    } else {
        Ok(Visit::Idle)
    }
}
