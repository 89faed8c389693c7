//! Common types and utilities shared across bufctl.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`config::CacheConfig`]
//! - Identifiers (SlotId, BufferTag, BlockNumber, ForkNumber)

pub mod config;
mod fork;
mod slot_id;
mod tag;

pub use crate::error::{Error, ErrorKind, Result};
pub use fork::ForkNumber;
pub use slot_id::SlotId;
pub use tag::{BlockNumber, BufferTag, Oid, RelFileLocator, INVALID_OID};
