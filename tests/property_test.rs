//! Property tests for the operation parser and the cache's tag uniqueness.

use std::collections::HashSet;
use std::sync::Arc;

use bufctl::catalog::{InMemoryDirectory, Persistence, Session};
use bufctl::common::config::CacheConfig;
use bufctl::storage::MemoryStore;
use bufctl::{
    BufferOp, BufferTools, ErrorKind, ForkNumber, OpArg, RelFileLocator, Scope, SharedCache,
};
use proptest::prelude::*;

const REL: RelFileLocator = RelFileLocator {
    tablespace_id: 1663,
    database_id: 5,
    relation_number: 100,
};
const BLOCKS: u32 = 12;

#[derive(Debug, Clone)]
enum Action {
    Load(u32),
    InvalidateSlot(i32),
    InvalidatePage(u32),
    MarkDirtyAll,
    FlushAll,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0..BLOCKS).prop_map(Action::Load),
        2 => (1..=8i32).prop_map(Action::InvalidateSlot),
        1 => (0..BLOCKS).prop_map(Action::InvalidatePage),
        1 => Just(Action::MarkDirtyAll),
        1 => Just(Action::FlushAll),
    ]
}

fn arg() -> impl Strategy<Value = OpArg> {
    prop_oneof![
        any::<i64>().prop_map(OpArg::Int),
        "[a-z]{0,6}".prop_map(OpArg::Text),
    ]
}

proptest! {
    #[test]
    fn prop_zero_arg_ops_reject_any_arguments(
        op in prop::sample::select(vec!["mark-dirty", "flush", "invalidate", "mark_dirty"]),
        args in prop::collection::vec(arg(), 1..4),
    ) {
        let err = BufferOp::parse(op, &args).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn prop_change_block_accepts_exactly_the_block_domain(value in any::<i64>()) {
        let parsed = BufferOp::parse("change-block", &[OpArg::Int(value)]);
        let in_domain = (0..u32::MAX as i64).contains(&value);
        prop_assert_eq!(parsed.is_ok(), in_domain);
    }

    #[test]
    fn prop_oid_args_fit_u32(value in any::<i64>()) {
        let parsed = BufferOp::parse("change-tablespace", &[OpArg::Int(value)]);
        prop_assert_eq!(parsed.is_ok(), u32::try_from(value).is_ok());
    }

    #[test]
    fn prop_resident_tags_are_unique(actions in prop::collection::vec(action(), 1..60)) {
        let store = Arc::new(MemoryStore::new());
        store.extend(REL, ForkNumber::Main, BLOCKS);
        let directory = InMemoryDirectory::new();
        directory.register("t", REL, Persistence::Permanent);
        directory.set_block_count("t", ForkNumber::Main, BLOCKS).unwrap();
        let cache = SharedCache::new(CacheConfig::default().with_pool_size(8), store).unwrap();
        let tools = BufferTools::new(&cache, &directory);
        let admin = Session::superuser(1);

        for action in actions {
            match action {
                Action::Load(block) => {
                    // The pool is smaller than the relation; running out is fine.
                    if let Err(err) = tools.load_page(&admin, "t", "main", i64::from(block)) {
                        prop_assert_eq!(err.kind(), ErrorKind::Unavailable);
                    }
                }
                Action::InvalidateSlot(slot) => {
                    tools.apply_operation(&admin, "invalidate", &Scope::slot(slot), &[]).unwrap();
                }
                Action::InvalidatePage(block) => {
                    if let Err(err) = tools.apply_operation(
                        &admin,
                        "invalidate",
                        &Scope::page("t", "main", i64::from(block)),
                        &[],
                    ) {
                        prop_assert_eq!(err.kind(), ErrorKind::NotFound);
                    }
                }
                Action::MarkDirtyAll => {
                    tools.apply_operation(&admin, "mark-dirty", &Scope::AllValid, &[]).unwrap();
                }
                Action::FlushAll => {
                    tools.apply_operation(&admin, "flush", &Scope::AllValid, &[]).unwrap();
                }
            }

            let mut seen = HashSet::new();
            let mut resident = 0;
            for slot in cache.slots() {
                let header = slot.header();
                if header.state.is_tag_valid() {
                    resident += 1;
                    prop_assert!(seen.insert(header.tag));
                    prop_assert_eq!(cache.lookup(&header.tag), Some(slot.id()));
                }
            }
            prop_assert_eq!(cache.hash_index().len(), resident);
        }
    }
}
