//! Administrative tools over the shared cache.
//!
//! [`BufferTools`] is the entry point. A request names an operation and a
//! [`Scope`]; admission checks run first, then the scan handler for the
//! scope walks the pool and applies the operation to every matching slot.
//!
//! # Components
//! - [`predicate`] - Pure tag/state tests
//! - [`locking`] - The test, release, lock, re-test protocol every scan uses
//! - [`operation`] - The named operations and their effects
//! - [`scan`] - One handler per scope
//! - [`admission`] - Privilege, range and visibility checks
//! - [`report`] - Read-only slot descriptions

pub mod admission;
pub mod locking;
pub mod operation;
pub mod predicate;
pub mod report;
pub mod scan;
mod scope;

pub use operation::{BufferOp, OpArg};
pub use report::SlotDescription;
pub use scope::Scope;

use tracing::{debug, info};

use crate::buffer::SharedCache;
use crate::catalog::{Relation, RelationDirectory, Session};
use crate::common::{BlockNumber, BufferTag, Error, ForkNumber, Result, SlotId};

/// Administrative control surface over a [`SharedCache`].
///
/// Borrowed views of the cache and the relation directory; cheap to build
/// per request.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use bufctl::catalog::{InMemoryDirectory, Persistence, Session};
/// use bufctl::common::config::CacheConfig;
/// use bufctl::storage::MemoryStore;
/// use bufctl::tools::{BufferTools, Scope};
/// use bufctl::{ForkNumber, RelFileLocator, SharedCache};
///
/// let locator = RelFileLocator::new(1663, 5, 16384);
/// let store = Arc::new(MemoryStore::new());
/// store.extend(locator, ForkNumber::Main, 2);
///
/// let directory = InMemoryDirectory::new();
/// directory.register("accounts", locator, Persistence::Permanent);
/// directory.set_block_count("accounts", ForkNumber::Main, 2).unwrap();
///
/// let cache = SharedCache::new(CacheConfig::default().with_pool_size(16), store).unwrap();
/// let tools = BufferTools::new(&cache, &directory);
/// let admin = Session::superuser(1);
///
/// let slot = tools.load_page(&admin, "accounts", "main", 1).unwrap();
/// tools.apply_operation(&admin, "mark-dirty", &Scope::Slot(slot), &[]).unwrap();
/// assert!(tools.describe_slot(slot).unwrap().unwrap().dirty);
/// ```
pub struct BufferTools<'a> {
    cache: &'a SharedCache,
    directory: &'a dyn RelationDirectory,
}

impl<'a> BufferTools<'a> {
    pub fn new(cache: &'a SharedCache, directory: &'a dyn RelationDirectory) -> Self {
        Self { cache, directory }
    }

    pub fn cache(&self) -> &'a SharedCache {
        self.cache
    }

    /// Apply the operation `operation` with `args` to every slot in `scope`.
    ///
    /// Returns the number of slots the operation was applied to.
    ///
    /// # Errors
    /// - `PermissionDenied` unless the session is a superuser
    /// - `InvalidArgument` for an unknown operation, wrong argument count or value,
    ///   an unknown fork name, a local slot, or database oid 0
    /// - `OutOfRange` for a slot outside the pool or a block past the relation's end
    /// - `NotFound` for an unknown relation, or a page scope whose page is not cached
    /// - `FeatureNotSupported` for another session's temporary relation
    /// - `Unavailable` when a writeback fails; slots already handled stay handled
    pub fn apply_operation(
        &self,
        session: &Session,
        operation: &str,
        scope: &Scope,
        args: &[OpArg],
    ) -> Result<usize> {
        admission::superuser_check(session, "change buffers")?;
        let op = BufferOp::parse(operation, args)?;

        let touched = match scope {
            Scope::Slot(id) => {
                admission::slot_in_range_check(self.cache, *id)?;
                admission::slot_not_local_check(*id)?;
                scan::apply_to_slot(self.cache, *id, &op)?
            }
            Scope::Relation(name) => {
                let relation = self.open_relation(session, name)?;
                scan::apply_to_relation(self.cache, &relation.locator, &op)?
            }
            Scope::RelationFork { relation, fork } => {
                let relation = self.open_relation(session, relation)?;
                let fork = ForkNumber::from_name(fork)?;
                scan::apply_to_relation_fork(self.cache, &relation.locator, fork, &op)?
            }
            Scope::Database(database_id) => {
                admission::database_oid_check(*database_id)?;
                scan::apply_to_database(self.cache, *database_id, &op)?
            }
            Scope::Tablespace(tablespace_id) => {
                scan::apply_to_tablespace(self.cache, *tablespace_id, &op)?
            }
            Scope::AllValid => scan::apply_to_all_valid(self.cache, &op)?,
            Scope::Page {
                relation,
                fork,
                block,
            } => {
                let (relation, fork, block) = self.open_page(session, relation, fork, *block)?;
                let tag = BufferTag::new(relation.locator, fork, block);
                scan::apply_to_page(self.cache, &tag, &op)?
            }
        };

        info!(operation = %op, %scope, touched, "applied buffer operation");
        Ok(touched)
    }

    /// Describe one shared slot, or `None` if it holds no valid page.
    ///
    /// # Errors
    /// `OutOfRange` for slot 0 or past the pool, `InvalidArgument` for a local slot.
    pub fn describe_slot(&self, slot: SlotId) -> Result<Option<SlotDescription>> {
        admission::slot_in_range_check(self.cache, slot)?;
        admission::slot_not_local_check(slot)?;
        let descriptor = self.cache.slot(slot).ok_or(Error::SlotOutOfRange(slot.0))?;
        Ok(report::describe(descriptor))
    }

    /// Describe every shared slot holding a page of `name`.
    ///
    /// The session's own temporary relations live in local slots, so their
    /// listing is empty.
    pub fn describe_relation_slots(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Vec<SlotDescription>> {
        admission::superuser_check(session, "inspect buffers")?;
        let relation = self.open_relation(session, name)?;
        if relation.uses_local_buffers() {
            debug!(relation = %relation.name, "relation uses local buffers, nothing to list");
            return Ok(Vec::new());
        }
        Ok(report::relation_slots(self.cache, &relation.locator))
    }

    /// Read block `block` of `fork_name` of `name` into the cache and return
    /// the slot now holding it. The pin taken by the load is released.
    ///
    /// # Errors
    /// `OutOfRange` if `block` is at or past the fork's current size; the
    /// pool is left unchanged. Load failures propagate.
    pub fn load_page(
        &self,
        session: &Session,
        name: &str,
        fork_name: &str,
        block: i64,
    ) -> Result<SlotId> {
        admission::superuser_check(session, "read pages into buffers")?;
        let (relation, fork, block) = self.open_page(session, name, fork_name, block)?;
        if relation.uses_local_buffers() {
            return Err(Error::LocalRelation(relation.name));
        }

        let tag = BufferTag::new(relation.locator, fork, block);
        let slot = self.cache.read_buffer(tag)?.slot_id();

        info!(%tag, %slot, "loaded page into shared cache");
        Ok(slot)
    }

    /// Resolve `name` and reject other sessions' temporary relations.
    fn open_relation(&self, session: &Session, name: &str) -> Result<Relation> {
        let relation = self.directory.resolve(name)?;
        admission::other_temp_check(session, &relation)?;
        Ok(relation)
    }

    /// Resolve a page address and check the block lies inside the fork.
    fn open_page(
        &self,
        session: &Session,
        name: &str,
        fork_name: &str,
        block: i64,
    ) -> Result<(Relation, ForkNumber, BlockNumber)> {
        let relation = self.directory.resolve(name)?;
        let fork = ForkNumber::from_name(fork_name)?;
        admission::other_temp_check(session, &relation)?;
        let block = BlockNumber::try_from_i64(block)?;
        admission::block_in_relation_check(self.directory, &relation, fork, block)?;
        Ok((relation, fork, block))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{InMemoryDirectory, Persistence, SessionId};
    use crate::common::config::CacheConfig;
    use crate::common::{ErrorKind, RelFileLocator};
    use crate::storage::MemoryStore;

    struct Fixture {
        cache: SharedCache,
        directory: InMemoryDirectory,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let directory = InMemoryDirectory::new();
            for (name, locator, persistence) in [
                ("t", RelFileLocator::new(1663, 5, 100), Persistence::Permanent),
                (
                    "mine",
                    RelFileLocator::new(1663, 5, 300),
                    Persistence::Temporary {
                        owner: SessionId(1),
                    },
                ),
                (
                    "theirs",
                    RelFileLocator::new(1663, 5, 301),
                    Persistence::Temporary {
                        owner: SessionId(2),
                    },
                ),
            ] {
                store.extend(locator, ForkNumber::Main, 4);
                directory.register(name, locator, persistence);
                directory.set_block_count(name, ForkNumber::Main, 4).unwrap();
            }
            let cache = SharedCache::new(CacheConfig::default().with_pool_size(8), store).unwrap();
            Self { cache, directory }
        }

        fn tools(&self) -> BufferTools<'_> {
            BufferTools::new(&self.cache, &self.directory)
        }
    }

    #[test]
    fn test_apply_requires_superuser() {
        let fx = Fixture::new();
        let err = fx
            .tools()
            .apply_operation(&Session::regular(1), "mark-dirty", &Scope::AllValid, &[])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_load_page_errors() {
        let fx = Fixture::new();
        let tools = fx.tools();
        let admin = Session::superuser(1);

        let kind = |session: &Session, name: &str, fork: &str, block: i64| {
            tools.load_page(session, name, fork, block).unwrap_err().kind()
        };

        assert_eq!(kind(&Session::regular(1), "t", "main", 0), ErrorKind::PermissionDenied);
        assert_eq!(kind(&admin, "nope", "main", 0), ErrorKind::NotFound);
        assert_eq!(kind(&admin, "t", "heap", 0), ErrorKind::InvalidArgument);
        assert_eq!(kind(&admin, "t", "main", -1), ErrorKind::InvalidArgument);
        assert_eq!(kind(&admin, "t", "main", 4), ErrorKind::OutOfRange);
        assert_eq!(kind(&admin, "theirs", "main", 0), ErrorKind::FeatureNotSupported);
        assert_eq!(kind(&admin, "mine", "main", 0), ErrorKind::FeatureNotSupported);
        assert!(fx.cache.hash_index().is_empty());
    }

    #[test]
    fn test_load_page_releases_pin() {
        let fx = Fixture::new();
        let slot = fx.tools().load_page(&Session::superuser(1), "t", "main", 2).unwrap();
        let row = fx.tools().describe_slot(slot).unwrap().unwrap();
        assert_eq!(row.block_number, BlockNumber::new(2));
        assert_eq!(row.pin_count, 0);
    }

    #[test]
    fn test_describe_relation_slots() {
        let fx = Fixture::new();
        let tools = fx.tools();
        let admin = Session::superuser(1);
        tools.load_page(&admin, "t", "main", 0).unwrap();
        tools.load_page(&admin, "t", "main", 3).unwrap();

        let rows = tools.describe_relation_slots(&admin, "t").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(tools.describe_relation_slots(&admin, "mine").unwrap().is_empty());
        assert_eq!(
            tools.describe_relation_slots(&admin, "theirs").unwrap_err().kind(),
            ErrorKind::FeatureNotSupported
        );
        assert_eq!(
            tools.describe_relation_slots(&Session::regular(1), "t").unwrap_err().kind(),
            ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_describe_slot_checks() {
        let fx = Fixture::new();
        let tools = fx.tools();
        assert_eq!(tools.describe_slot(SlotId::new(9)).unwrap_err().kind(), ErrorKind::OutOfRange);
        let kind = |slot: SlotId| tools.describe_slot(slot).unwrap_err().kind();
        assert_eq!(kind(SlotId::INVALID), ErrorKind::OutOfRange);
        assert_eq!(kind(SlotId::new(-1)), ErrorKind::InvalidArgument);
        assert_eq!(tools.describe_slot(SlotId::new(1)).unwrap(), None);
    }

    #[test]
    fn test_database_scope_rejects_invalid_oid() {
        let fx = Fixture::new();
        let err = fx
            .tools()
            .apply_operation(&Session::superuser(1), "flush", &Scope::Database(0), &[])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDatabaseOid));
    }

    #[test]
    fn test_relation_scope_rejects_other_temp() {
        let fx = Fixture::new();
        let err = fx
            .tools()
            .apply_operation(&Session::superuser(1), "flush", &Scope::relation("theirs"), &[])
            .unwrap_err();
        assert!(matches!(err, Error::OtherSessionTemp));
    }
}
