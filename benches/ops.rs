//! Micro-operation benchmarks for the sector caches.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency (nanoseconds) for get, insert and a mixed
//! workload across the three cache variants under identical conditions.

use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sectorkit::policy::packed::PackedLruCache;
use sectorkit::policy::sector_lru::SectorLruCache;
use sectorkit::policy::sector_ttl::SectorTtlCache;
use sectorkit::schema::{FieldValue, Schema};
use sectorkit::traits::CoreCache;

const SECTOR_MAX_ITEM: usize = 4_096;
const SECTOR_COUNT: usize = 4;
const OPS: u64 = 100_000;

fn lru() -> SectorLruCache<u64, u64> {
    SectorLruCache::new(SECTOR_MAX_ITEM, SECTOR_COUNT)
}

fn ttl() -> SectorTtlCache<u64, u64> {
    SectorTtlCache::new(Duration::from_secs(3_600), SECTOR_MAX_ITEM, SECTOR_COUNT)
}

fn packed() -> PackedLruCache<u64> {
    let schema = Schema::parse(&["uint32", "double"], None).unwrap();
    PackedLruCache::new(schema, SECTOR_MAX_ITEM * 12, SECTOR_MAX_ITEM, SECTOR_COUNT)
}

fn record(key: u64) -> [FieldValue; 2] {
    [FieldValue::Uint32(key as u32), FieldValue::Float64(key as f64)]
}

/// Warm set that fits in the hot sector.
const WARM: u64 = SECTOR_MAX_ITEM as u64 / 2;

fn get_hit<C: CoreCache<u64, u64>>(mut cache: C, iters: u64) -> Duration {
    for i in 0..WARM {
        cache.insert(i, i);
    }
    let start = Instant::now();
    for _ in 0..iters {
        for i in 0..OPS {
            black_box(cache.get(&(i % WARM)));
        }
    }
    start.elapsed()
}

// ============================================================================
// Get Hit Latency (ns/op)
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("sector_lru", |b| b.iter_custom(|iters| get_hit(lru(), iters)));
    group.bench_function("sector_ttl", |b| b.iter_custom(|iters| get_hit(ttl(), iters)));

    group.bench_function("packed", |b| {
        b.iter_custom(|iters| {
            let mut cache = packed();
            for i in 0..WARM {
                cache.insert(i, &record(i)).unwrap();
            }
            let mut out = Vec::with_capacity(2);
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    black_box(cache.get_into(&(i % WARM), &mut out));
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

// ============================================================================
// Insert with Rotation (ns/op)
// ============================================================================

fn insert_rotate<C: CoreCache<u64, u64>>(make: impl Fn() -> C, iters: u64) -> Duration {
    let mut total = Duration::ZERO;
    for _ in 0..iters {
        let mut cache = make();
        let start = Instant::now();
        for i in 0..OPS {
            cache.insert(i, i);
        }
        total += start.elapsed();
    }
    total
}

fn bench_insert_rotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_rotate_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("sector_lru", |b| b.iter_custom(|iters| insert_rotate(lru, iters)));
    group.bench_function("sector_ttl", |b| b.iter_custom(|iters| insert_rotate(ttl, iters)));

    group.bench_function("packed", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let mut cache = packed();
                let start = Instant::now();
                for i in 0..OPS {
                    cache.insert(i, &record(i)).unwrap();
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.finish();
}

// ============================================================================
// Mixed Workload (ns/op)
// ============================================================================

// 90% of reads go to 10% of a universe four times the ring capacity.
fn skewed_key(rng: &mut SmallRng) -> u64 {
    let universe = (SECTOR_MAX_ITEM * SECTOR_COUNT * 4) as u64;
    let hot = universe / 10;
    if rng.random::<f64>() < 0.9 {
        rng.random_range(0..hot)
    } else {
        rng.random_range(hot..universe)
    }
}

fn mixed<C: CoreCache<u64, u64>>(make: impl Fn() -> C, iters: u64) -> Duration {
    let mut total = Duration::ZERO;
    for _ in 0..iters {
        let mut cache = make();
        let mut rng = SmallRng::seed_from_u64(42);
        let start = Instant::now();
        for _ in 0..OPS {
            let key = skewed_key(&mut rng);
            if cache.get(&key).is_none() {
                cache.insert(key, key);
            }
        }
        total += start.elapsed();
    }
    total
}

fn bench_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_ops_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("sector_lru", |b| b.iter_custom(|iters| mixed(lru, iters)));
    group.bench_function("sector_ttl", |b| {
        b.iter_custom(|iters| mixed(|| ttl().with_refreshing_get(true), iters))
    });

    group.bench_function("packed", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let mut cache = packed();
                let mut rng = SmallRng::seed_from_u64(42);
                let mut out = Vec::with_capacity(2);
                let start = Instant::now();
                for _ in 0..OPS {
                    let key = skewed_key(&mut rng);
                    if !cache.get_into(&key, &mut out) {
                        cache.insert(key, &record(key)).unwrap();
                    }
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_insert_rotate, bench_mixed);
criterion_main!(benches);
