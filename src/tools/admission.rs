//! Admission checks run before a request touches the pool.

use crate::buffer::SharedCache;
use crate::catalog::{Relation, RelationDirectory, Session};
use crate::common::{BlockNumber, Error, ForkNumber, Oid, Result, SlotId, INVALID_OID};

/// Caller must be a superuser. `action` completes "must be superuser to ...".
pub fn superuser_check(session: &Session, action: &'static str) -> Result<()> {
    if session.superuser {
        Ok(())
    } else {
        Err(Error::PermissionDenied(action))
    }
}

/// Reject temporary relations owned by another session; their pages live in
/// that session's local slots, which we cannot see.
pub fn other_temp_check(session: &Session, relation: &Relation) -> Result<()> {
    if relation.is_other_temp(session.id) {
        Err(Error::OtherSessionTemp)
    } else {
        Ok(())
    }
}

/// Slot number must be neither the invalid slot nor past the end of the pool.
/// Negative numbers pass; [`slot_not_local_check`] rejects them.
pub fn slot_in_range_check(cache: &SharedCache, slot: SlotId) -> Result<()> {
    if slot == SlotId::INVALID || i64::from(slot.0) > cache.pool_size() as i64 {
        Err(Error::SlotOutOfRange(slot.0))
    } else {
        Ok(())
    }
}

pub fn slot_not_local_check(slot: SlotId) -> Result<()> {
    if slot.is_local() {
        Err(Error::LocalSlot(slot))
    } else {
        Ok(())
    }
}

/// `block` must lie below the current size of `fork`.
pub fn block_in_relation_check(
    directory: &dyn RelationDirectory,
    relation: &Relation,
    fork: ForkNumber,
    block: BlockNumber,
) -> Result<()> {
    let nblocks = directory.block_count(relation, fork)?;
    if block.0 >= nblocks {
        Err(Error::BlockOutOfRange {
            block,
            relation: relation.name.clone(),
        })
    } else {
        Ok(())
    }
}

pub fn database_oid_check(database_id: Oid) -> Result<()> {
    if database_id == INVALID_OID {
        Err(Error::InvalidDatabaseOid)
    } else {
        Ok(())
    }
}
