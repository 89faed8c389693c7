//! Error types for bufctl.

use thiserror::Error;

use crate::common::{BlockNumber, SlotId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable classification of an [`Error`].
///
/// Callers match on the kind; the message is for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed request: bad operation name, arity, or argument value.
    InvalidArgument,
    /// A slot number or block number outside its valid range.
    OutOfRange,
    /// The requested page or relation is not there.
    NotFound,
    /// The caller lacks the required privilege.
    PermissionDenied,
    /// The request targets something the shared cache cannot see.
    FeatureNotSupported,
    /// A failure of an external collaborator (page I/O, slot supply).
    Unavailable,
}

/// All possible errors in bufctl.
///
/// Every request either applies fully or fails with one of these before the
/// pool is touched; the only exception is a writeback failure in the middle
/// of a scan, which aborts the remaining slots.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the page store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The page store could not serve a page.
    #[error("page store error: {0}")]
    Storage(String),

    /// The operation name is not in the registry.
    #[error("invalid name of the buffer change mode: \"{0}\"")]
    UnknownOperation(String),

    /// Wrong number of operation arguments.
    #[error("invalid number of arguments for \"{operation}\": expected {expected}, got {got}")]
    InvalidArgCount {
        operation: &'static str,
        expected: usize,
        got: usize,
    },

    /// An argument had the wrong type or did not fit its domain.
    #[error("invalid argument for \"{operation}\": {reason}")]
    InvalidArgValue {
        operation: &'static str,
        reason: String,
    },

    /// A block number argument outside the block-number domain.
    #[error("invalid blockNum value: {0}")]
    InvalidBlockNumber(i64),

    /// A fork number outside the valid fork range.
    #[error("invalid fork value: {0}")]
    InvalidForkNumber(i64),

    /// A fork name that is not recognized.
    #[error("invalid fork name: \"{0}\"")]
    InvalidForkName(String),

    /// Database scope given the invalid oid.
    #[error("invalid database oid")]
    InvalidDatabaseOid,

    /// The slot number is zero or larger than the pool.
    #[error("buffer {0} does not exist")]
    SlotOutOfRange(i32),

    /// The slot number denotes a session-local slot.
    #[error("this function only works with non-local buffers (buffer {0})")]
    LocalSlot(SlotId),

    /// A block number at or past the end of the relation fork.
    #[error("block number {block} is out of range for relation \"{relation}\"")]
    BlockOutOfRange {
        block: BlockNumber,
        relation: String,
    },

    /// Exact-block scope found no slot holding the page.
    #[error("the block with blockNum {0} is not in buffercache")]
    PageNotCached(BlockNumber),

    /// Relation name could not be resolved.
    #[error("relation \"{0}\" does not exist")]
    UndefinedRelation(String),

    /// Caller is not a superuser.
    #[error("must be superuser to {0}")]
    PermissionDenied(&'static str),

    /// Relation is a temporary relation of another session.
    #[error("cannot access temporary tables of other sessions")]
    OtherSessionTemp,

    /// Relation lives in session-local slots, which the shared cache does not hold.
    #[error("relation \"{0}\" uses local buffers, which the shared cache does not manage")]
    LocalRelation(String),

    /// The load path found no reusable slot on the free list.
    #[error("no unpinned buffers available")]
    NoFreeSlots,

    /// The cache configuration is not buildable.
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownOperation(_)
            | Error::InvalidArgCount { .. }
            | Error::InvalidArgValue { .. }
            | Error::InvalidBlockNumber(_)
            | Error::InvalidForkNumber(_)
            | Error::InvalidForkName(_)
            | Error::InvalidDatabaseOid
            | Error::LocalSlot(_)
            | Error::InvalidConfig(_) => ErrorKind::InvalidArgument,
            Error::SlotOutOfRange(_) | Error::BlockOutOfRange { .. } => ErrorKind::OutOfRange,
            Error::PageNotCached(_) | Error::UndefinedRelation(_) => ErrorKind::NotFound,
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::OtherSessionTemp | Error::LocalRelation(_) => ErrorKind::FeatureNotSupported,
            Error::Io(_) | Error::Storage(_) | Error::NoFreeSlots => ErrorKind::Unavailable,
        }
    }
}
