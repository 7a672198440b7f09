//! Micro-operation benchmarks for the cache and the sparse table.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency for cache get/insert paths and compares
//! `SparseArray` against `FxHashMap` on a fill-then-probe workload.

use std::hint::black_box;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use sparsekit::ds::SparseArray;
use sparsekit::policy::SlruCache;

const CAPACITY: usize = 16_384;
const OPS: u64 = 100_000;

// ============================================================================
// SLRU Cache: Get Hit / Insert Latency
// ============================================================================

fn bench_slru(c: &mut Criterion) {
    let mut group = c.benchmark_group("slru");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("get_hit", |b| {
        b.iter_custom(|iters| {
            let mut cache = SlruCache::new(CAPACITY);
            for i in 0..CAPACITY as u64 {
                cache.put(i, i);
            }
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    let key = i % (CAPACITY as u64);
                    black_box(cache.get(&key));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("insert_with_eviction", |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let mut cache = SlruCache::new(CAPACITY);
                let start = Instant::now();
                for i in 0..OPS {
                    cache.put(i, i);
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.finish();
}

// ============================================================================
// SparseArray vs FxHashMap: Fill + Probe
// ============================================================================

fn bench_table_fill_probe(c: &mut Criterion) {
    let mut keys: Vec<i32> = (0..OPS as i32).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    keys.shuffle(&mut rng);

    let mut group = c.benchmark_group("table_fill_probe");
    group.throughput(Throughput::Elements(2 * OPS));

    group.bench_function("sparse_array", |b| {
        b.iter(|| {
            let mut table: SparseArray<i32> = SparseArray::new();
            for &k in &keys {
                table.put(k, k).unwrap();
            }
            for &k in &keys {
                black_box(table.contains_key(k));
            }
            table
        })
    });

    group.bench_function("fx_hash_map", |b| {
        b.iter(|| {
            let mut map: FxHashMap<i32, i32> = FxHashMap::default();
            for &k in &keys {
                map.insert(k, k);
            }
            for &k in &keys {
                black_box(map.contains_key(&k));
            }
            map
        })
    });

    group.finish();
}

// ============================================================================
// SparseArray: Steady-State Lookup
// ============================================================================

fn bench_table_lookup(c: &mut Criterion) {
    let mut table: SparseArray<i32> = SparseArray::new();
    for k in 0..OPS as i32 {
        table.put(k, k).unwrap();
    }

    let mut group = c.benchmark_group("table_lookup");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("get_hit", |b| {
        b.iter(|| {
            for k in 0..OPS as i32 {
                black_box(table.get(k));
            }
        })
    });

    group.bench_function("get_miss", |b| {
        b.iter(|| {
            for k in OPS as i32..2 * OPS as i32 {
                black_box(table.get(k));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_slru, bench_table_fill_probe, bench_table_lookup);
criterion_main!(benches);
