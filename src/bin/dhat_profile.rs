//! DHAT heap profiler for the sector caches.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::time::Duration;

use sectorkit::policy::packed::PackedLruCache;
use sectorkit::policy::sector_lru::SectorLruCache;
use sectorkit::policy::sector_ttl::SectorTtlCache;
use sectorkit::schema::{FieldValue, Schema};
use sectorkit::traits::CoreCache;

const SECTOR_MAX_ITEM: usize = 1_024;
const SECTOR_COUNT: usize = 4;
const OPERATIONS: usize = 100_000;
const UNIVERSE: u64 = 16_384;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// 90% of accesses hit 10% of keys.
fn hot_key(rng: &mut XorShift64) -> u64 {
    let hot_size = UNIVERSE / 10;
    if rng.next_f64() < 0.9 {
        rng.next_u64() % hot_size
    } else {
        hot_size + (rng.next_u64() % (UNIVERSE - hot_size))
    }
}

fn hotset_workload<C: CoreCache<u64, u64>>(cache: &mut C, seed: u64) {
    let mut rng = XorShift64::new(seed);
    for _ in 0..OPERATIONS {
        let key = hot_key(&mut rng);
        if cache.get(&key).is_none() {
            cache.insert(key, key);
        }
    }
}

/// Sequential keys: every write is new, so the ring rotates continuously.
fn rotation_churn<C: CoreCache<u64, u64>>(cache: &mut C) {
    for i in 0..OPERATIONS as u64 {
        cache.insert(i, i);
    }
}

fn profile_lru() {
    println!("=== Profiling sector LRU ===");
    let mut cache = SectorLruCache::new(SECTOR_MAX_ITEM, SECTOR_COUNT);

    hotset_workload(&mut cache, 42);
    rotation_churn(&mut cache);

    println!("  Final size: {}", cache.len());
}

fn profile_ttl() {
    println!("=== Profiling sector TTL ===");
    let mut cache = SectorTtlCache::new(Duration::from_secs(60), SECTOR_MAX_ITEM, SECTOR_COUNT);

    hotset_workload(&mut cache, 42);
    rotation_churn(&mut cache);

    println!("  Final size: {}", cache.len());
}

fn profile_packed() {
    println!("=== Profiling packed ===");
    let schema = match Schema::parse(&["uint32", "double"], Some("int16")) {
        Ok(schema) => schema,
        Err(e) => panic!("{}", e),
    };
    let mut cache = PackedLruCache::new(schema, 64 * 1_024, SECTOR_MAX_ITEM, SECTOR_COUNT);

    let mut rng = XorShift64::new(42);
    let mut values = Vec::with_capacity(2 + 8);
    for _ in 0..OPERATIONS {
        let key = hot_key(&mut rng);
        if cache.get_into(&key, &mut values) {
            continue;
        }
        values.clear();
        values.push(FieldValue::Uint32(key as u32));
        values.push(FieldValue::Float64(rng.next_f64()));
        for i in 0..(key % 8) as i16 {
            values.push(FieldValue::Int16(i));
        }
        if let Err(e) = cache.insert(key, &values) {
            panic!("{}", e);
        }
    }

    println!("  Final size: {}", cache.len());
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("sectorkit DHAT Heap Profiling");
    println!("=============================\n");

    profile_lru();
    profile_ttl();
    profile_packed();

    println!("\n=============================");
    println!("Profile written to dhat-heap.json");
}
