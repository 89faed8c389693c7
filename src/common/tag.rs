//! Page identifier types.

use std::fmt;

use crate::common::{Error, ForkNumber, Result};

/// Object identifier for tablespaces, databases and relation files.
pub type Oid = u32;

/// The "no object" oid.
pub const INVALID_OID: Oid = 0;

/// Identifies a block within one relation fork.
///
/// `u32` matches the storage engine's block addressing; `u32::MAX` is the
/// reserved "invalid block" sentinel and never names a real block.
///
/// # Example
/// ```
/// use bufctl::BlockNumber;
///
/// assert!(BlockNumber::new(42).is_valid());
/// assert!(!BlockNumber::INVALID.is_valid());
/// assert!(BlockNumber::try_from_i64(4294967295).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockNumber(pub u32);

impl BlockNumber {
    /// Invalid/sentinel block number.
    pub const INVALID: BlockNumber = BlockNumber(u32::MAX);

    /// Create a new BlockNumber.
    #[inline]
    pub fn new(block: u32) -> Self {
        BlockNumber(block)
    }

    /// Check if this block number is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Convert a caller-supplied integer into a block number.
    ///
    /// Rejects negative values, values past `u32::MAX`, and the sentinel.
    pub fn try_from_i64(value: i64) -> Result<Self> {
        match u32::try_from(value) {
            Ok(block) if block != u32::MAX => Ok(BlockNumber(block)),
            _ => Err(Error::InvalidBlockNumber(value)),
        }
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical identity of a relation: the file all its forks live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelFileLocator {
    pub tablespace_id: Oid,
    pub database_id: Oid,
    pub relation_number: Oid,
}

impl RelFileLocator {
    pub fn new(tablespace_id: Oid, database_id: Oid, relation_number: Oid) -> Self {
        Self {
            tablespace_id,
            database_id,
            relation_number,
        }
    }
}

impl fmt::Display for RelFileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.tablespace_id, self.database_id, self.relation_number
        )
    }
}

/// Identifies one page of one relation fork: the key of the cache.
///
/// Two tags are equal iff all five fields are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferTag {
    pub tablespace_id: Oid,
    pub database_id: Oid,
    pub relation_number: Oid,
    pub fork_number: ForkNumber,
    pub block_number: BlockNumber,
}

impl BufferTag {
    /// Tag stored in a slot that holds no page.
    pub const CLEARED: BufferTag = BufferTag {
        tablespace_id: INVALID_OID,
        database_id: INVALID_OID,
        relation_number: INVALID_OID,
        fork_number: ForkNumber::Main,
        block_number: BlockNumber::INVALID,
    };

    /// Tag for `block` of `fork` of the relation at `locator`.
    pub fn new(
        locator: RelFileLocator,
        fork_number: ForkNumber,
        block_number: BlockNumber,
    ) -> Self {
        Self {
            tablespace_id: locator.tablespace_id,
            database_id: locator.database_id,
            relation_number: locator.relation_number,
            fork_number,
            block_number,
        }
    }

    /// The relation part of this tag.
    #[inline]
    pub fn locator(&self) -> RelFileLocator {
        RelFileLocator::new(self.tablespace_id, self.database_id, self.relation_number)
    }
}

impl fmt::Display for BufferTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {} blk {}]",
            self.locator(),
            self.fork_number,
            self.block_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_number_invalid() {
        assert!(!BlockNumber::INVALID.is_valid());
        assert_eq!(BlockNumber::INVALID.0, u32::MAX);
        assert!(BlockNumber::new(0).is_valid());
    }

    #[test]
    fn test_block_number_conversion() {
        assert_eq!(BlockNumber::try_from_i64(7).unwrap(), BlockNumber::new(7));
        assert_eq!(
            BlockNumber::try_from_i64(u32::MAX as i64 - 1).unwrap(),
            BlockNumber::new(u32::MAX - 1)
        );
        assert!(matches!(
            BlockNumber::try_from_i64(-1),
            Err(Error::InvalidBlockNumber(-1))
        ));
        assert!(BlockNumber::try_from_i64(u32::MAX as i64).is_err());
        assert!(BlockNumber::try_from_i64(u32::MAX as i64 + 1).is_err());
    }

    #[test]
    fn test_tag_equality_needs_all_fields() {
        let loc = RelFileLocator::new(1, 5, 100);
        let tag = BufferTag::new(loc, ForkNumber::Main, BlockNumber::new(3));

        assert_eq!(tag, BufferTag::new(loc, ForkNumber::Main, BlockNumber::new(3)));
        assert_ne!(tag, BufferTag::new(loc, ForkNumber::FreeSpaceMap, BlockNumber::new(3)));
        assert_ne!(tag, BufferTag::new(loc, ForkNumber::Main, BlockNumber::new(4)));
        assert_ne!(
            tag,
            BufferTag::new(RelFileLocator::new(2, 5, 100), ForkNumber::Main, BlockNumber::new(3))
        );
        assert_eq!(tag.locator(), loc);
    }

    #[test]
    fn test_tag_display() {
        let tag = BufferTag::new(
            RelFileLocator::new(1663, 5, 16384),
            ForkNumber::VisibilityMap,
            BlockNumber::new(2),
        );
        assert_eq!(format!("{}", tag), "[1663/5/16384 vm blk 2]");
    }
}
