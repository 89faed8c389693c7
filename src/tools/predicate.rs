//! Slot predicates.
//!
//! Pure tests over a [`SlotHeader`]. The caller reads the header under the
//! header lock; none of these take a lock themselves.

use crate::buffer::SlotHeader;
use crate::common::{BlockNumber, ForkNumber, Oid, RelFileLocator};

/// Tag names a page of `locator`.
#[inline]
pub fn belongs_to_relation(header: &SlotHeader, locator: &RelFileLocator) -> bool {
    header.tag.relation_number == locator.relation_number
        && header.tag.database_id == locator.database_id
        && header.tag.tablespace_id == locator.tablespace_id
}

#[inline]
pub fn belongs_to_fork(header: &SlotHeader, fork: ForkNumber) -> bool {
    header.tag.fork_number == fork
}

#[inline]
pub fn belongs_to_database(header: &SlotHeader, database_id: Oid) -> bool {
    header.tag.database_id == database_id
}

#[inline]
pub fn belongs_to_tablespace(header: &SlotHeader, tablespace_id: Oid) -> bool {
    header.tag.tablespace_id == tablespace_id
}

#[inline]
pub fn belongs_to_block(header: &SlotHeader, block: BlockNumber) -> bool {
    header.tag.block_number == block
}

/// Slot holds a page and its contents have been read in.
#[inline]
pub fn is_resident_and_valid(header: &SlotHeader) -> bool {
    header.state.is_valid() && header.state.is_tag_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::state::{TAG_VALID, VALID};
    use crate::common::BufferTag;

    fn header(locator: RelFileLocator, fork: ForkNumber, block: u32) -> SlotHeader {
        let mut header = SlotHeader::EMPTY;
        header.tag = BufferTag::new(locator, fork, BlockNumber::new(block));
        header
    }

    #[test]
    fn test_relation_needs_all_three_ids() {
        let loc = RelFileLocator::new(1663, 5, 100);
        let h = header(loc, ForkNumber::Main, 0);

        assert!(belongs_to_relation(&h, &loc));
        assert!(!belongs_to_relation(&h, &RelFileLocator::new(1664, 5, 100)));
        assert!(!belongs_to_relation(&h, &RelFileLocator::new(1663, 6, 100)));
        assert!(!belongs_to_relation(&h, &RelFileLocator::new(1663, 5, 101)));
    }

    #[test]
    fn test_single_field_predicates() {
        let h = header(RelFileLocator::new(1663, 5, 100), ForkNumber::VisibilityMap, 9);

        assert!(belongs_to_fork(&h, ForkNumber::VisibilityMap));
        assert!(!belongs_to_fork(&h, ForkNumber::Main));
        assert!(belongs_to_database(&h, 5));
        assert!(!belongs_to_database(&h, 1663));
        assert!(belongs_to_tablespace(&h, 1663));
        assert!(belongs_to_block(&h, BlockNumber::new(9)));
        assert!(!belongs_to_block(&h, BlockNumber::new(8)));
    }

    #[test]
    fn test_resident_and_valid_needs_both_flags() {
        let mut h = SlotHeader::EMPTY;
        assert!(!is_resident_and_valid(&h));

        h.state.insert(TAG_VALID);
        assert!(!is_resident_and_valid(&h));

        h.state.insert(VALID);
        assert!(is_resident_and_valid(&h));

        h.state.remove(TAG_VALID);
        assert!(!is_resident_and_valid(&h));
    }
}
