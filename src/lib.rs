//! bufctl - administrative control over a shared page cache.
//!
//! Inspect and mutate cache slots below the level of ordinary page traffic:
//! force a page dirty, force a writeback, evict a slot, or rewrite a slot's
//! identity in place to simulate corruption.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Tools (tools/)                            │
//! │   BufferTools: apply_operation / describe_* / load_page         │
//! │   admission → scan handler → locking protocol → operation       │
//! └─────────────────────────────────────────────────────────────────┘
//!            ↓                                      ↓
//! ┌──────────────────────────────────┐  ┌─────────────────────────┐
//! │      Shared Cache (buffer/)      │  │   Directory (catalog/)  │
//! │  slots + hash index + free list  │  │  name → relation, size  │
//! └──────────────────────────────────┘  └─────────────────────────┘
//!            ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │             Storage (storage/): PageStore, Page                  │
//! │            MemoryStore (tests) | FileStore (files)               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Identifiers, tags, forks, config
//! - [`error`] - Crate-wide error type and its stable kinds
//! - [`storage`] - Pages and the page store interface
//! - [`catalog`] - Relation directory and sessions
//! - [`buffer`] - The shared cache and its load path
//! - [`tools`] - The administrative operations
//!
//! # Quick Start
//! ```
//! use std::sync::Arc;
//! use bufctl::catalog::{InMemoryDirectory, Persistence, Session};
//! use bufctl::common::config::CacheConfig;
//! use bufctl::storage::MemoryStore;
//! use bufctl::{BufferTools, ForkNumber, RelFileLocator, Scope, SharedCache};
//!
//! let locator = RelFileLocator::new(1663, 5, 100);
//! let store = Arc::new(MemoryStore::new());
//! store.extend(locator, ForkNumber::Main, 8);
//!
//! let directory = InMemoryDirectory::new();
//! directory.register("orders", locator, Persistence::Permanent);
//! directory.set_block_count("orders", ForkNumber::Main, 8).unwrap();
//!
//! let cache = SharedCache::new(CacheConfig::default().with_pool_size(64), store.clone()).unwrap();
//! let tools = BufferTools::new(&cache, &directory);
//! let admin = Session::superuser(1);
//!
//! for block in 0..3 {
//!     tools.load_page(&admin, "orders", "main", block).unwrap();
//! }
//! let flushed = tools.apply_operation(&admin, "flush", &Scope::relation("orders"), &[]).unwrap();
//! assert_eq!(flushed, 3);
//! assert_eq!(store.writebacks().len(), 3);
//! ```

pub mod buffer;
pub mod catalog;
pub mod common;
pub mod error;
pub mod storage;
pub mod tools;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{BlockNumber, BufferTag, ForkNumber, Oid, RelFileLocator, SlotId};
pub use error::{Error, ErrorKind, Result};

pub use buffer::{CacheStats, PinnedSlot, SharedCache, StatsSnapshot};
pub use storage::{Page, PageStore};
pub use tools::{BufferOp, BufferTools, OpArg, Scope, SlotDescription};
