//! Relation directory - name resolution and relation sizes.
//!
//! The administrative tools address relations by name. Turning a name into
//! a [`RelFileLocator`] and knowing how many blocks each fork has is the job
//! of a [`RelationDirectory`]. [`InMemoryDirectory`] is a simple registry
//! implementation.

mod memory;

pub use memory::InMemoryDirectory;

use std::fmt;

use crate::common::{ForkNumber, RelFileLocator, Result};

/// Identifies a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

/// The caller of an administrative request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub superuser: bool,
}

impl Session {
    /// A session with elevated privilege.
    pub fn superuser(id: u32) -> Self {
        Self {
            id: SessionId(id),
            superuser: true,
        }
    }

    /// A session without elevated privilege.
    pub fn regular(id: u32) -> Self {
        Self {
            id: SessionId(id),
            superuser: false,
        }
    }
}

/// How a relation's pages are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Pages live in the shared cache.
    Permanent,
    /// Pages live in the owning session's local slots.
    Temporary { owner: SessionId },
}

/// A resolved relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    pub locator: RelFileLocator,
    pub persistence: Persistence,
}

impl Relation {
    /// True if pages of this relation are held in session-local slots.
    pub fn uses_local_buffers(&self) -> bool {
        matches!(self.persistence, Persistence::Temporary { .. })
    }

    /// True if this is a temporary relation owned by a session other than `session`.
    pub fn is_other_temp(&self, session: SessionId) -> bool {
        match self.persistence {
            Persistence::Temporary { owner } => owner != session,
            Persistence::Permanent => false,
        }
    }
}

/// Resolves relation names and reports fork sizes.
pub trait RelationDirectory: Send + Sync {
    /// Resolve `name` to a relation.
    ///
    /// # Errors
    /// `Error::UndefinedRelation` if no relation has that name.
    fn resolve(&self, name: &str) -> Result<Relation>;

    /// Current number of blocks in `fork` of `relation`.
    fn block_count(&self, relation: &Relation, fork: ForkNumber) -> Result<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(persistence: Persistence) -> Relation {
        Relation {
            name: "t".into(),
            locator: RelFileLocator::new(1663, 5, 100),
            persistence,
        }
    }

    #[test]
    fn test_permanent_relation() {
        let rel = relation(Persistence::Permanent);
        assert!(!rel.uses_local_buffers());
        assert!(!rel.is_other_temp(SessionId(1)));
    }

    #[test]
    fn test_temporary_relation_ownership() {
        let rel = relation(Persistence::Temporary {
            owner: SessionId(7),
        });
        assert!(rel.uses_local_buffers());
        assert!(!rel.is_other_temp(SessionId(7)));
        assert!(rel.is_other_temp(SessionId(8)));
    }
}
