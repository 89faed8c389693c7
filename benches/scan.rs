use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use bufctl::catalog::{InMemoryDirectory, Persistence, Session};
use bufctl::common::config::CacheConfig;
use bufctl::storage::MemoryStore;
use bufctl::{BlockNumber, BufferTag, BufferTools, ForkNumber, RelFileLocator, Scope, SharedCache};

const POOL_SIZE: usize = 4096;
const REL: RelFileLocator = RelFileLocator {
    tablespace_id: 1663,
    database_id: 5,
    relation_number: 100,
};

/// A cache with every slot resident.
fn full_cache() -> (SharedCache, InMemoryDirectory) {
    let store = Arc::new(MemoryStore::new());
    store.extend(REL, ForkNumber::Main, POOL_SIZE as u32);
    let directory = InMemoryDirectory::new();
    directory.register("t", REL, Persistence::Permanent);
    directory
        .set_block_count("t", ForkNumber::Main, POOL_SIZE as u32)
        .unwrap();

    let cache = SharedCache::new(CacheConfig::default().with_pool_size(POOL_SIZE), store).unwrap();
    for block in 0..POOL_SIZE as u32 {
        cache
            .read_buffer(BufferTag::new(REL, ForkNumber::Main, BlockNumber::new(block)))
            .unwrap();
    }
    (cache, directory)
}

fn scan_benchmark(c: &mut Criterion) {
    let (cache, directory) = full_cache();
    let tools = BufferTools::new(&cache, &directory);
    let admin = Session::superuser(1);

    let mut group = c.benchmark_group("full pool scan");
    group.sample_size(20);
    group.bench_function("mark-dirty all valid", |b| {
        b.iter(|| {
            tools
                .apply_operation(&admin, "mark-dirty", black_box(&Scope::AllValid), &[])
                .unwrap()
        });
    });
    group.bench_function("mark-dirty relation", |b| {
        b.iter(|| {
            tools
                .apply_operation(&admin, "mark-dirty", black_box(&Scope::relation("t")), &[])
                .unwrap()
        });
    });
    group.bench_function("page scope last block", |b| {
        let scope = Scope::page("t", "main", POOL_SIZE as i64 - 1);
        b.iter(|| {
            tools
                .apply_operation(&admin, "mark-dirty", black_box(&scope), &[])
                .unwrap()
        });
    });
    group.finish();

    let mut group = c.benchmark_group("invalidate");
    group.sample_size(10);
    group.bench_function("invalidate all valid", |b| {
        b.iter_batched(
            full_cache,
            |(cache, directory)| {
                let tools = BufferTools::new(&cache, &directory);
                tools
                    .apply_operation(&admin, "invalidate", &Scope::AllValid, &[])
                    .unwrap()
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, scan_benchmark);
criterion_main!(benches);
