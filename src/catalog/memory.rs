//! In-memory relation registry.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::catalog::{Persistence, Relation, RelationDirectory};
use crate::common::{Error, ForkNumber, RelFileLocator, Result};

struct Entry {
    relation: Relation,
    block_counts: [u32; ForkNumber::COUNT],
}

/// A [`RelationDirectory`] backed by a map of registered relations.
///
/// # Example
/// ```
/// use bufctl::catalog::{InMemoryDirectory, Persistence, RelationDirectory};
/// use bufctl::{ForkNumber, RelFileLocator};
///
/// let dir = InMemoryDirectory::new();
/// dir.register("orders", RelFileLocator::new(1663, 5, 16384), Persistence::Permanent);
/// dir.set_block_count("orders", ForkNumber::Main, 10).unwrap();
///
/// let rel = dir.resolve("orders").unwrap();
/// assert_eq!(dir.block_count(&rel, ForkNumber::Main).unwrap(), 10);
/// ```
#[derive(Default)]
pub struct InMemoryDirectory {
    relations: RwLock<HashMap<String, Entry>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relation with zero blocks in every fork.
    ///
    /// Re-registering a name replaces the previous entry.
    pub fn register(
        &self,
        name: &str,
        locator: RelFileLocator,
        persistence: Persistence,
    ) -> Relation {
        let relation = Relation {
            name: name.to_string(),
            locator,
            persistence,
        };
        self.relations.write().insert(
            name.to_string(),
            Entry {
                relation: relation.clone(),
                block_counts: [0; ForkNumber::COUNT],
            },
        );
        relation
    }

    /// Set the number of blocks in one fork of a registered relation.
    pub fn set_block_count(&self, name: &str, fork: ForkNumber, blocks: u32) -> Result<()> {
        let mut relations = self.relations.write();
        let entry = relations
            .get_mut(name)
            .ok_or_else(|| Error::UndefinedRelation(name.to_string()))?;
        entry.block_counts[fork.index()] = blocks;
        Ok(())
    }
}

impl RelationDirectory for InMemoryDirectory {
    fn resolve(&self, name: &str) -> Result<Relation> {
        self.relations
            .read()
            .get(name)
            .map(|entry| entry.relation.clone())
            .ok_or_else(|| Error::UndefinedRelation(name.to_string()))
    }

    fn block_count(&self, relation: &Relation, fork: ForkNumber) -> Result<u32> {
        self.relations
            .read()
            .get(&relation.name)
            .map(|entry| entry.block_counts[fork.index()])
            .ok_or_else(|| Error::UndefinedRelation(relation.name.clone()))
    }
}
