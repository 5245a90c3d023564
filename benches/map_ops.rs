use bptree_index::BPlusTreeMap;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BTreeMap;
use tiny_rng::{Rand, Rng};

const N: usize = 10_000;

// Guide and leaf orders to compare. The first pair is the default.
const ORDERS: [(usize, usize); 3] = [(3, 3), (16, 16), (64, 64)];

fn random_keys(n: usize) -> Vec<u64> {
    let mut rng = Rng::from_seed(0);
    (0..n).map(|_| rng.rand_u64()).collect()
}

fn bench_insert_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_sequential");

    for (order, leaf_order) in ORDERS {
        group.bench_function(BenchmarkId::new("BPlusTreeMap", order), |b| {
            b.iter(|| {
                let mut map = BPlusTreeMap::with_orders(order, leaf_order);
                for key in 0..N as u64 {
                    map.insert(key, key);
                }
                map
            });
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for key in 0..N as u64 {
                map.insert(key, key);
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("insert_random");

    for (order, leaf_order) in ORDERS {
        group.bench_function(BenchmarkId::new("BPlusTreeMap", order), |b| {
            b.iter(|| {
                let mut map = BPlusTreeMap::with_orders(order, leaf_order);
                for &key in &keys {
                    map.insert(key, key);
                }
                map
            });
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &key in &keys {
                map.insert(key, key);
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_colliding(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("insert_colliding");

    // Ten values accumulate under each distinct key on average.
    for (order, leaf_order) in ORDERS {
        group.bench_function(BenchmarkId::new("BPlusTreeMap", order), |b| {
            b.iter(|| {
                let mut map = BPlusTreeMap::with_orders(order, leaf_order);
                for &key in &keys {
                    map.insert(key % 1_000, key);
                }
                map
            });
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
            for &key in &keys {
                map.entry(key % 1_000).or_default().push(key);
            }
            map
        });
    });

    group.finish();
}

fn bench_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("get_random");

    for (order, leaf_order) in ORDERS {
        let mut map = BPlusTreeMap::with_orders(order, leaf_order);
        for &key in &keys {
            map.insert(key, key);
        }
        group.bench_function(BenchmarkId::new("BPlusTreeMap", order), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for &key in &keys {
                    if let Some(values) = map.get(&key) {
                        sum = sum.wrapping_add(values[0]);
                    }
                }
                sum
            });
        });
    }

    let std_map: BTreeMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for &key in &keys {
                if let Some(&value) = std_map.get(&key) {
                    sum = sum.wrapping_add(value);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_iter_full(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut map = BPlusTreeMap::new();
    for &key in &keys {
        map.insert(key, key);
    }
    let std_map: BTreeMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("iter_full");

    group.bench_function(BenchmarkId::new("BPlusTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for (key, _) in map.iter() {
                sum = sum.wrapping_add(*key);
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for (key, _) in std_map.iter() {
                sum = sum.wrapping_add(*key);
            }
            sum
        });
    });

    group.finish();
}

fn bench_range_scan(c: &mut Criterion) {
    let mut map = BPlusTreeMap::new();
    for key in 0..N as u64 {
        map.insert(key, key);
    }
    let std_map: BTreeMap<u64, u64> = (0..N as u64).map(|k| (k, k)).collect();

    // Scan the middle half of the key space.
    let (low, high) = (N as u64 / 4, 3 * N as u64 / 4);
    let mut group = c.benchmark_group("range_scan");

    group.bench_function(BenchmarkId::new("BPlusTreeMap", N), |b| {
        let view = map.sub_map(low, high);
        b.iter(|| {
            let mut sum = 0u64;
            for (key, _) in view.entries(&map) {
                sum = sum.wrapping_add(*key);
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for (key, _) in std_map.range(low..high) {
                sum = sum.wrapping_add(*key);
            }
            sum
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_sequential,
    bench_insert_random,
    bench_insert_colliding,
    bench_get_random,
    bench_iter_full,
    bench_range_scan,
);
criterion_main!(benches);
