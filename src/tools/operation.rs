//! Operation registry - the named buffer operations and their effects.
//!
//! Requests name an operation as a string and pass loosely typed arguments.
//! [`BufferOp::parse`] checks the name, the argument count and every
//! argument value, so a [`BufferOp`] that exists is always applicable.

use std::fmt;

use tracing::warn;

use crate::buffer::state::{DIRTY, IO_ERROR, IO_IN_PROGRESS};
use crate::buffer::{CacheStats, SharedCache, SlotDescriptor, SlotHeader};
use crate::common::{BlockNumber, BufferTag, Error, ForkNumber, Oid, Result};
use crate::storage::Page;

/// An operation argument as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpArg {
    Int(i64),
    Text(String),
}

impl From<i64> for OpArg {
    fn from(value: i64) -> Self {
        OpArg::Int(value)
    }
}

impl From<i32> for OpArg {
    fn from(value: i32) -> Self {
        OpArg::Int(i64::from(value))
    }
}

impl From<u32> for OpArg {
    fn from(value: u32) -> Self {
        OpArg::Int(i64::from(value))
    }
}

impl From<&str> for OpArg {
    fn from(value: &str) -> Self {
        OpArg::Text(value.to_owned())
    }
}

impl From<String> for OpArg {
    fn from(value: String) -> Self {
        OpArg::Text(value)
    }
}

impl fmt::Display for OpArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpArg::Int(v) => write!(f, "{}", v),
            OpArg::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Registry entry: canonical name, accepted alias, argument count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    MarkDirty,
    Flush,
    ChangeTablespace,
    ChangeDatabase,
    ChangeRelationNumber,
    ChangeFork,
    ChangeBlock,
    Invalidate,
}

impl OpKind {
    const ALL: [OpKind; 8] = [
        OpKind::MarkDirty,
        OpKind::Flush,
        OpKind::ChangeTablespace,
        OpKind::ChangeDatabase,
        OpKind::ChangeRelationNumber,
        OpKind::ChangeFork,
        OpKind::ChangeBlock,
        OpKind::Invalidate,
    ];

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.alias() == name)
    }

    fn name(self) -> &'static str {
        match self {
            OpKind::MarkDirty => "mark-dirty",
            OpKind::Flush => "flush",
            OpKind::ChangeTablespace => "change-tablespace",
            OpKind::ChangeDatabase => "change-database",
            OpKind::ChangeRelationNumber => "change-relation-number",
            OpKind::ChangeFork => "change-fork",
            OpKind::ChangeBlock => "change-block",
            OpKind::Invalidate => "invalidate",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            OpKind::MarkDirty => "mark_dirty",
            OpKind::Flush => "flush",
            OpKind::ChangeTablespace => "change_spcoid",
            OpKind::ChangeDatabase => "change_dboid",
            OpKind::ChangeRelationNumber => "change_relnumber",
            OpKind::ChangeFork => "change_forknum",
            OpKind::ChangeBlock => "change_blocknum",
            OpKind::Invalidate => "invalidate",
        }
    }

    fn arity(self) -> usize {
        match self {
            OpKind::MarkDirty | OpKind::Flush | OpKind::Invalidate => 0,
            _ => 1,
        }
    }
}

/// A fully validated buffer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferOp {
    /// Set the dirty flag.
    MarkDirty,
    /// Write the page back to the page store without evicting it.
    Flush,
    /// Overwrite the tag's tablespace oid in place.
    ChangeTablespace(Oid),
    /// Overwrite the tag's database oid in place.
    ChangeDatabase(Oid),
    /// Overwrite the tag's relation number in place.
    ChangeRelationNumber(Oid),
    /// Overwrite the tag's fork in place.
    ChangeFork(ForkNumber),
    /// Overwrite the tag's block number in place.
    ChangeBlock(BlockNumber),
    /// Evict the slot.
    Invalidate,
}

impl BufferOp {
    /// Build an operation from its name and arguments.
    ///
    /// # Errors
    /// - `Error::UnknownOperation` for a name that is neither canonical nor an alias
    /// - `Error::InvalidArgCount` if the argument count does not match
    /// - `Error::InvalidArgValue`, `Error::InvalidForkNumber`,
    ///   `Error::InvalidForkName`, `Error::InvalidBlockNumber` for bad values
    pub fn parse(name: &str, args: &[OpArg]) -> Result<Self> {
        let kind = OpKind::from_name(name).ok_or_else(|| Error::UnknownOperation(name.to_owned()))?;

        if args.len() != kind.arity() {
            return Err(Error::InvalidArgCount {
                operation: kind.name(),
                expected: kind.arity(),
                got: args.len(),
            });
        }

        let op = match kind {
            OpKind::MarkDirty => BufferOp::MarkDirty,
            OpKind::Flush => BufferOp::Flush,
            OpKind::Invalidate => BufferOp::Invalidate,
            OpKind::ChangeTablespace => BufferOp::ChangeTablespace(oid_arg(kind, &args[0])?),
            OpKind::ChangeDatabase => BufferOp::ChangeDatabase(oid_arg(kind, &args[0])?),
            OpKind::ChangeRelationNumber => {
                BufferOp::ChangeRelationNumber(oid_arg(kind, &args[0])?)
            }
            OpKind::ChangeFork => BufferOp::ChangeFork(match &args[0] {
                OpArg::Int(v) => ForkNumber::from_i64(*v)?,
                OpArg::Text(s) => ForkNumber::from_name(s)?,
            }),
            OpKind::ChangeBlock => BufferOp::ChangeBlock(match &args[0] {
                OpArg::Int(v) => BlockNumber::try_from_i64(*v)?,
                OpArg::Text(_) => return Err(expected_integer(kind, &args[0])),
            }),
        };
        Ok(op)
    }

    fn kind(&self) -> OpKind {
        match self {
            BufferOp::MarkDirty => OpKind::MarkDirty,
            BufferOp::Flush => OpKind::Flush,
            BufferOp::ChangeTablespace(_) => OpKind::ChangeTablespace,
            BufferOp::ChangeDatabase(_) => OpKind::ChangeDatabase,
            BufferOp::ChangeRelationNumber(_) => OpKind::ChangeRelationNumber,
            BufferOp::ChangeFork(_) => OpKind::ChangeFork,
            BufferOp::ChangeBlock(_) => OpKind::ChangeBlock,
            BufferOp::Invalidate => OpKind::Invalidate,
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Number of arguments the operation takes.
    pub fn arity(&self) -> usize {
        self.kind().arity()
    }

    /// Apply the operation to `slot`.
    ///
    /// The caller holds the slot's content lock exclusively and passes the
    /// page it guards. Returns `false` when the slot held nothing the
    /// operation could act on: mark-dirty and flush on a slot without a
    /// valid page, invalidate on a slot that was already empty.
    ///
    /// # Errors
    /// Only `Flush` can fail, with the page store's writeback error.
    pub(crate) fn apply(
        &self,
        cache: &SharedCache,
        slot: &SlotDescriptor,
        page: &mut Page,
    ) -> Result<bool> {
        match *self {
            BufferOp::MarkDirty => Ok(mark_dirty(cache, slot)),
            BufferOp::Flush => flush(cache, slot, page),
            BufferOp::ChangeTablespace(oid) => {
                Ok(change_tag(cache, slot, |tag| tag.tablespace_id = oid))
            }
            BufferOp::ChangeDatabase(oid) => {
                Ok(change_tag(cache, slot, |tag| tag.database_id = oid))
            }
            BufferOp::ChangeRelationNumber(oid) => {
                Ok(change_tag(cache, slot, |tag| tag.relation_number = oid))
            }
            BufferOp::ChangeFork(fork) => {
                Ok(change_tag(cache, slot, |tag| tag.fork_number = fork))
            }
            BufferOp::ChangeBlock(block) => {
                Ok(change_tag(cache, slot, |tag| tag.block_number = block))
            }
            BufferOp::Invalidate => Ok(invalidate(cache, slot)),
        }
    }
}

impl fmt::Display for BufferOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferOp::ChangeTablespace(v)
            | BufferOp::ChangeDatabase(v)
            | BufferOp::ChangeRelationNumber(v) => write!(f, "{}({})", self.name(), v),
            BufferOp::ChangeFork(fork) => write!(f, "{}({})", self.name(), fork),
            BufferOp::ChangeBlock(block) => write!(f, "{}({})", self.name(), block),
            _ => f.write_str(self.name()),
        }
    }
}

fn oid_arg(kind: OpKind, arg: &OpArg) -> Result<Oid> {
    match arg {
        OpArg::Int(v) => Oid::try_from(*v).map_err(|_| Error::InvalidArgValue {
            operation: kind.name(),
            reason: format!("{} is not a valid oid", v),
        }),
        OpArg::Text(_) => Err(expected_integer(kind, arg)),
    }
}

fn expected_integer(kind: OpKind, arg: &OpArg) -> Error {
    Error::InvalidArgValue {
        operation: kind.name(),
        reason: format!("expected an integer, got {}", arg),
    }
}

// ============================================================================
// Effects
// ============================================================================

fn mark_dirty(cache: &SharedCache, slot: &SlotDescriptor) -> bool {
    let mut header = slot.lock_header();
    if !header.state.is_valid() {
        return false;
    }
    if header.state.is_dirty() {
        return true;
    }
    header.state.insert(DIRTY);
    drop(header);
    CacheStats::bump(&cache.stats().slots_marked_dirty);
    true
}

/// Write the page back. The exclusive content lock held by the caller keeps
/// writers out for the duration of the write.
fn flush(cache: &SharedCache, slot: &SlotDescriptor, page: &Page) -> Result<bool> {
    let tag = {
        let mut header = slot.lock_header();
        if !header.state.is_valid() {
            return Ok(false);
        }
        header.state.insert(IO_IN_PROGRESS);
        header.tag
    };

    let written = cache.store().write_page(&tag, page);

    let mut header = slot.lock_header();
    header.state.remove(IO_IN_PROGRESS);
    match written {
        Ok(()) => {
            header.state.remove(DIRTY | IO_ERROR);
            drop(header);
            CacheStats::bump(&cache.stats().slots_flushed);
            Ok(true)
        }
        Err(err) => {
            header.state.insert(IO_ERROR);
            drop(header);
            warn!(slot = %slot.id(), %tag, error = %err, "writeback failed");
            Err(err)
        }
    }
}

/// Overwrite identity fields in place. The hash index is left alone: the
/// slot stays indexed under its old tag, which is the corruption this
/// operation exists to produce.
fn change_tag(
    cache: &SharedCache,
    slot: &SlotDescriptor,
    edit: impl FnOnce(&mut BufferTag),
) -> bool {
    let (old, new, indexed) = {
        let mut header = slot.lock_header();
        let old = header.tag;
        edit(&mut header.tag);
        (old, header.tag, header.state.is_tag_valid())
    };
    CacheStats::bump(&cache.stats().tags_changed);

    if indexed {
        warn!(slot = %slot.id(), %old, %new, "rewrote identity of an indexed slot");
    }
    true
}

/// Evict `slot`: clear its tag and flags, remove it from the hash index and
/// hand it to the free list.
///
/// The index entry is looked up by the key the load path inserted, which an
/// identity change does not touch. The caller's content lock keeps that key
/// from changing until the entry is gone.
fn invalidate(cache: &SharedCache, slot: &SlotDescriptor) -> bool {
    let key = slot.header().indexed_tag;

    let mut shard = key.map(|key| cache.hash_index().lock_shard(&key));
    let was_resident = {
        let mut header = slot.lock_header();
        let was_resident = header.state.is_tag_valid();
        clear(&mut header);
        was_resident
    };
    if let (Some(shard), Some(key)) = (shard.as_mut(), key) {
        if shard.get(&key) == Some(&slot.id()) {
            shard.remove(&key);
        }
    }
    drop(shard);

    cache.free_list().push_unique(slot.id());
    if was_resident {
        CacheStats::bump(&cache.stats().slots_invalidated);
    }
    was_resident
}

fn clear(header: &mut SlotHeader) {
    header.tag = BufferTag::CLEARED;
    header.indexed_tag = None;
    header.state.clear_flags_and_usage();
}
