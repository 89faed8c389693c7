//! Scan handlers.
//!
//! Each handler fixes a selection and walks the shared pool in slot order,
//! applying a [`BufferOp`] to every slot that matches through
//! [`with_matching_slot`]. Handlers return the number of slots the operation
//! took effect on; a matched slot the operation found nothing to act on is
//! not counted. Name resolution and admission happen before a handler is
//! called.
//!
//! Scans only ever match slots with `TAG_VALID` set: an empty slot carries a
//! cleared tag whose zero oids mean nothing.

use crate::buffer::{SharedCache, SlotDescriptor, SlotHeader};
use crate::common::{BufferTag, Error, ForkNumber, Oid, RelFileLocator, Result, SlotId};
use crate::tools::locking::{with_matching_slot, Visit};
use crate::tools::operation::BufferOp;
use crate::tools::predicate::{
    belongs_to_block, belongs_to_database, belongs_to_fork, belongs_to_relation,
    belongs_to_tablespace, is_resident_and_valid,
};

fn visit(
    cache: &SharedCache,
    slot: &SlotDescriptor,
    op: &BufferOp,
    matches: impl Fn(&SlotHeader) -> bool,
) -> Result<Visit> {
    with_matching_slot(slot, matches, |page| op.apply(cache, slot, page))
}

/// Walk every shared slot, applying `op` where `matches` holds.
fn scan_pool(
    cache: &SharedCache,
    op: &BufferOp,
    matches: impl Fn(&SlotHeader) -> bool,
) -> Result<usize> {
    let mut applied = 0;
    for slot in cache.slots() {
        let visit = visit(cache, slot, op, |h| h.state.is_tag_valid() && matches(h))?;
        if visit.applied() {
            applied += 1;
        }
    }
    Ok(applied)
}

/// Apply `op` to one slot, whatever it holds. The slot number has passed
/// admission.
///
/// Returns 0 when the slot held nothing the operation could act on, such as
/// mark-dirty on an empty slot.
pub fn apply_to_slot(cache: &SharedCache, id: SlotId, op: &BufferOp) -> Result<usize> {
    let slot = cache.slot(id).ok_or(Error::SlotOutOfRange(id.0))?;
    let visit = visit(cache, slot, op, |_| true)?;
    Ok(usize::from(visit.applied()))
}

pub fn apply_to_relation(
    cache: &SharedCache,
    locator: &RelFileLocator,
    op: &BufferOp,
) -> Result<usize> {
    scan_pool(cache, op, |h| belongs_to_relation(h, locator))
}

pub fn apply_to_relation_fork(
    cache: &SharedCache,
    locator: &RelFileLocator,
    fork: ForkNumber,
    op: &BufferOp,
) -> Result<usize> {
    scan_pool(cache, op, |h| belongs_to_relation(h, locator) && belongs_to_fork(h, fork))
}

pub fn apply_to_database(cache: &SharedCache, database_id: Oid, op: &BufferOp) -> Result<usize> {
    scan_pool(cache, op, |h| belongs_to_database(h, database_id))
}

pub fn apply_to_tablespace(
    cache: &SharedCache,
    tablespace_id: Oid,
    op: &BufferOp,
) -> Result<usize> {
    scan_pool(cache, op, |h| belongs_to_tablespace(h, tablespace_id))
}

pub fn apply_to_all_valid(cache: &SharedCache, op: &BufferOp) -> Result<usize> {
    scan_pool(cache, op, is_resident_and_valid)
}

/// Apply `op` to the first slot holding exactly `tag`, then stop.
///
/// # Errors
/// `Error::PageNotCached` if no slot holds the page.
pub fn apply_to_page(cache: &SharedCache, tag: &BufferTag, op: &BufferOp) -> Result<usize> {
    let locator = tag.locator();
    let matches = |h: &SlotHeader| {
        h.state.is_tag_valid()
            && belongs_to_relation(h, &locator)
            && belongs_to_fork(h, tag.fork_number)
            && belongs_to_block(h, tag.block_number)
    };

    for slot in cache.slots() {
        if visit(cache, slot, op, matches)?.applied() {
            return Ok(1);
        }
    }
    Err(Error::PageNotCached(tag.block_number))
}
