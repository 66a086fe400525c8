use criterion::{self, criterion_group, criterion_main, BatchSize, BenchmarkId};

use replikv::{KvStore, KvsEngine, Record, Snapshot};

fn seeded(size: usize) -> Snapshot {
    (0..size)
        .map(|i| (format!("key{i}"), Record::new(format!("value{i}"), i as i64)))
        .collect()
}

fn write_direct(c: &mut criterion::Criterion) {
    let store = KvStore::new();
    c.bench_with_input(BenchmarkId::new("write", "store"), &store, |b, s| {
        b.iter(|| s.set("key".to_string(), "value".to_string()))
    });
}

fn read_direct(c: &mut criterion::Criterion) {
    let store = KvStore::new();
    store.set("key".to_string(), "value".to_string());
    c.bench_with_input(BenchmarkId::new("read", "store"), &store, |b, s| {
        b.iter(|| assert_eq!(s.get("key").unwrap(), "value"))
    });
}

// Every sync cycle merges and snapshots the whole store, so both scale with
// its size.
fn full_state_exchange(c: &mut criterion::Criterion) {
    let mut group = c.benchmark_group("exchange");
    for size in [100, 1_000, 10_000] {
        let store = KvStore::new();
        store.merge(seeded(size));

        group.bench_with_input(BenchmarkId::new("snapshot", size), &store, |b, s| {
            b.iter(|| s.snapshot())
        });
        group.bench_with_input(BenchmarkId::new("merge", size), &store, |b, s| {
            b.iter_batched(|| seeded(size), |incoming| s.merge(incoming), BatchSize::LargeInput)
        });
    }
    group.finish();
}

criterion_group!(benches, write_direct, read_direct, full_state_exchange);
criterion_main!(benches);
