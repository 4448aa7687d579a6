use concurrent_bag::{Bag, BagConfig, PooledEntry};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

const ITEMS: usize = 64;
const ITERATIONS: u64 = 100_000;

fn bench_single_thread_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("borrow_requite");
    group.throughput(Throughput::Elements(ITERATIONS));

    group.bench_function("affinity_fast_path", |b| {
        let bag = Bag::<PooledEntry<u64>>::new(BagConfig::default());
        for i in 0..ITEMS {
            bag.add(Arc::new(PooledEntry::new(i as u64))).unwrap();
        }
        // Warm the calling thread's affinity cache.
        let warm = bag.borrow(Duration::from_secs(1)).unwrap().unwrap();
        bag.requite(&warm).unwrap();

        b.iter(|| {
            for _ in 0..ITERATIONS {
                let item = bag.borrow(Duration::from_millis(1)).unwrap().unwrap();
                black_box(&item);
                bag.requite(&item).unwrap();
            }
        });
    });

    group.finish();
}

fn bench_registry_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("borrow_requite");
    group.throughput(Throughput::Elements(ITERATIONS));

    group.bench_function("cross_thread_steal", |b| {
        let bag = Arc::new(Bag::<PooledEntry<u64>>::new(BagConfig::default()));
        for i in 0..ITEMS {
            bag.add(Arc::new(PooledEntry::new(i as u64))).unwrap();
        }

        b.iter(|| {
            // Borrow on a different thread each time so the affinity cache
            // never has a hit, forcing every borrow through the shared
            // registry scan.
            let bag = Arc::clone(&bag);
            std::thread::spawn(move || {
                for _ in 0..ITERATIONS / 100 {
                    let item = bag.borrow(Duration::from_millis(1)).unwrap().unwrap();
                    black_box(&item);
                    bag.requite(&item).unwrap();
                }
            })
            .join()
            .unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_thread_cycle, bench_registry_scan);
criterion_main!(benches);
