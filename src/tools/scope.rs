//! Selection scopes for administrative requests.

use std::fmt;

use crate::common::{Oid, SlotId};

/// Which slots a request applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// One slot by number.
    Slot(SlotId),
    /// Every slot holding any fork of the named relation.
    Relation(String),
    /// Every slot holding the named fork of the named relation.
    RelationFork { relation: String, fork: String },
    /// Every slot whose tag names this database.
    Database(Oid),
    /// Every slot whose tag names this tablespace.
    Tablespace(Oid),
    /// Every resident, valid slot.
    AllValid,
    /// The one slot holding an exact page, which must be resident.
    Page {
        relation: String,
        fork: String,
        block: i64,
    },
}

impl Scope {
    pub fn slot(id: i32) -> Self {
        Scope::Slot(SlotId::new(id))
    }

    pub fn relation(name: impl Into<String>) -> Self {
        Scope::Relation(name.into())
    }

    pub fn relation_fork(name: impl Into<String>, fork: impl Into<String>) -> Self {
        Scope::RelationFork {
            relation: name.into(),
            fork: fork.into(),
        }
    }

    pub fn page(name: impl Into<String>, fork: impl Into<String>, block: i64) -> Self {
        Scope::Page {
            relation: name.into(),
            fork: fork.into(),
            block,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Slot(id) => write!(f, "slot({})", id),
            Scope::Relation(name) => write!(f, "relation({})", name),
            Scope::RelationFork { relation, fork } => {
                write!(f, "relation_fork({}, {})", relation, fork)
            }
            Scope::Database(oid) => write!(f, "database({})", oid),
            Scope::Tablespace(oid) => write!(f, "tablespace({})", oid),
            Scope::AllValid => f.write_str("all_valid"),
            Scope::Page {
                relation,
                fork,
                block,
            } => write!(f, "page({}, {}, {})", relation, fork, block),
        }
    }
}
