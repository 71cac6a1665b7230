//! Benchmarks for gopherd counter operations

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use gopherd::cancel::CancelToken;
use gopherd::counter::AtomicCounter;
use gopherd::store::{BucketConfig, KvStore, MemoryStore};

fn counter_benchmarks(c: &mut Criterion) {
    let store = MemoryStore::new();
    let bucket = store
        .open_bucket(&BucketConfig {
            name: "bench".to_string(),
            history_depth: 10,
        })
        .unwrap();

    // Unbounded so the bench never exhausts the range
    let counter = Arc::new(AtomicCounter::new(bucket, "seq").with_max_value(i64::MAX));
    let cancel = CancelToken::new();

    c.bench_function("next_value uncontended", |b| {
        b.iter(|| counter.next_value(&cancel).unwrap())
    });

    c.bench_function("current_value", |b| {
        b.iter(|| counter.current_value(&cancel).unwrap())
    });
}

criterion_group!(benches, counter_benchmarks);
criterion_main!(benches);
