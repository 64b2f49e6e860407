// ==============================================
// CROSS-VARIANT INVARIANT TESTS (integration)
// ==============================================
//
// Behaviour every sector cache shares, checked through the common traits so
// the plain, TTL and packed variants are held to the same contract.

use std::time::Duration;

use proptest::prelude::*;
use sectorkit::builder::{CacheBuilder, CachePolicy};
use sectorkit::clock::ManualClock;
use sectorkit::policy::packed::PackedLruCache;
use sectorkit::policy::sector_lru::SectorLruCache;
use sectorkit::policy::sector_ttl::SectorTtlCache;
use sectorkit::schema::{FieldValue, Schema};
use sectorkit::traits::{CoreCache, SectoredCache};

const SECTOR_MAX_ITEM: usize = 16;
const SECTOR_COUNT: usize = 4;

fn lru() -> SectorLruCache<u64, u64> {
    SectorLruCache::new(SECTOR_MAX_ITEM, SECTOR_COUNT)
}

// Clock never moves: the TTL cache behaves like the plain one.
fn ttl(refreshing_get: bool) -> SectorTtlCache<u64, u64, ManualClock> {
    SectorTtlCache::with_clock(
        Duration::from_secs(60),
        SECTOR_MAX_ITEM,
        SECTOR_COUNT,
        ManualClock::new(),
    )
    .with_refreshing_get(refreshing_get)
}

fn packed() -> PackedLruCache<u64> {
    let schema = Schema::parse(&["uint32"], None).unwrap();
    PackedLruCache::new(schema, 4 * SECTOR_MAX_ITEM, SECTOR_MAX_ITEM, SECTOR_COUNT)
}

// ==============================================
// Bounded Residency
// ==============================================

mod bounded_residency {
    use super::*;

    fn check<C: CoreCache<u64, u64>>(mut cache: C) {
        let ring = (SECTOR_MAX_ITEM * SECTOR_COUNT) as u64;
        for key in 0..ring * 3 {
            cache.insert(key, key);
            assert!(cache.len() <= ring as usize);
        }
        // only the last ring's worth of writes can still be resident
        for key in 0..ring * 2 {
            assert!(!cache.contains(&key), "key {key} outlived the ring");
        }
        assert!(cache.contains(&(ring * 3 - 1)));
    }

    #[test]
    fn sector_lru() {
        check(lru());
    }

    #[test]
    fn sector_ttl() {
        check(ttl(false));
    }

    #[test]
    fn packed_cache() {
        let mut cache = packed();
        let ring = (SECTOR_MAX_ITEM * SECTOR_COUNT) as u64;
        for key in 0..ring * 3 {
            cache.insert(key, &[FieldValue::Uint32(key as u32)]).unwrap();
            assert!(cache.len() <= ring as usize);
        }
        for key in 0..ring * 2 {
            assert!(!cache.contains(&key));
        }
        cache.check_invariants().unwrap();
    }

    #[test]
    fn sector_len_is_none_past_the_ring() {
        assert_eq!(SectoredCache::sector_len(&lru(), SECTOR_COUNT), None);
        assert_eq!(SectoredCache::sector_len(&ttl(false), SECTOR_COUNT), None);
        assert_eq!(SectoredCache::sector_len(&packed(), SECTOR_COUNT), None);
    }
}

// ==============================================
// Promotion Monotonicity
// ==============================================
//
// A key read at least once per generation never expires.

mod promotion {
    use super::*;

    fn check<C: CoreCache<u64, u64>>(mut cache: C) {
        cache.insert(u64::MAX, 1);
        for key in 0..(SECTOR_MAX_ITEM * SECTOR_COUNT * 20) as u64 {
            cache.insert(key, key);
            if key % SECTOR_MAX_ITEM as u64 == 0 {
                assert_eq!(cache.get(&u64::MAX), Some(&1), "expired at {key}");
            }
        }
        assert!(cache.contains(&u64::MAX));
    }

    #[test]
    fn sector_lru() {
        check(lru());
    }

    #[test]
    fn refreshing_sector_ttl() {
        check(ttl(true));
    }

    #[test]
    fn non_refreshing_ttl_reads_do_not_extend_lifetime() {
        let mut cache = ttl(false);
        cache.insert(u64::MAX, 1);
        for key in 0..(SECTOR_MAX_ITEM * SECTOR_COUNT) as u64 {
            cache.insert(key, key);
            cache.get(&u64::MAX);
        }
        assert!(!cache.contains(&u64::MAX));
    }

    #[test]
    fn packed_cache() {
        let mut cache = packed();
        cache.insert(u64::MAX, &[FieldValue::Uint32(1)]).unwrap();
        for key in 0..(SECTOR_MAX_ITEM * SECTOR_COUNT * 20) as u64 {
            cache.insert(key, &[FieldValue::Uint32(key as u32)]).unwrap();
            if key % SECTOR_MAX_ITEM as u64 == 0 {
                assert_eq!(cache.get(&u64::MAX), Some(vec![FieldValue::Uint32(1)]));
            }
        }
        cache.check_invariants().unwrap();
    }
}

// ==============================================
// Single Residency After Promotion
// ==============================================

mod single_residency {
    use super::*;

    fn check<C: CoreCache<u64, u64>>(mut cache: C) {
        cache.insert(1, 1);
        cache.rotate();
        cache.rotate();
        assert_eq!(cache.get(&1), Some(&1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.sector_len(0), Some(1));
    }

    #[test]
    fn sector_lru() {
        check(lru());
    }

    #[test]
    fn refreshing_sector_ttl() {
        check(ttl(true));
    }

    #[test]
    fn runtime_selected_cache() {
        let cache = CacheBuilder::new()
            .sector_max_item(SECTOR_MAX_ITEM)
            .build::<u64, u64>(CachePolicy::Lru)
            .unwrap();
        check(cache);
    }
}

// ==============================================
// Model Check
// ==============================================
//
// Against a ring of plain vectors: the cache must agree on which keys are
// resident, which value the hottest copy holds and the iteration order.

struct Model {
    sectors: Vec<Vec<(u64, u64)>>,
    ops: usize,
}

impl Model {
    fn new() -> Self {
        Self {
            sectors: vec![Vec::new(); SECTOR_COUNT],
            ops: 0,
        }
    }

    fn rotate(&mut self) {
        self.sectors.pop();
        self.sectors.insert(0, Vec::new());
        self.ops = 0;
    }

    fn write_hot(&mut self, key: u64, value: u64) {
        if self.ops >= SECTOR_MAX_ITEM {
            self.rotate();
        }
        match self.sectors[0].iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.sectors[0].push((key, value)),
        }
        self.ops += 1;
    }

    fn find(&self, key: u64) -> Option<(usize, u64)> {
        self.sectors.iter().enumerate().find_map(|(i, sector)| {
            sector
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (i, *v))
        })
    }

    fn get(&mut self, key: u64) -> Option<u64> {
        let (sector, value) = self.find(key)?;
        if sector > 0 {
            self.sectors[sector].retain(|(k, _)| *k != key);
            self.write_hot(key, value);
        }
        Some(value)
    }

    fn remove(&mut self, key: u64) -> Option<u64> {
        let found = self.find(key).map(|(_, v)| v);
        for sector in &mut self.sectors {
            sector.retain(|(k, _)| *k != key);
        }
        found
    }

    fn len(&self) -> usize {
        self.sectors.iter().map(Vec::len).sum()
    }

    fn entries(&self) -> Vec<(u64, u64)> {
        let mut seen = std::collections::HashSet::new();
        self.sectors
            .iter()
            .flatten()
            .filter(|(k, _)| seen.insert(*k))
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert(u64, u64),
    Get(u64),
    Remove(u64),
    Rotate,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u64..48, any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        4 => (0u64..48).prop_map(Op::Get),
        1 => (0u64..48).prop_map(Op::Remove),
        1 => Just(Op::Rotate),
    ]
}

proptest! {
    #[test]
    fn sector_lru_matches_model(ops in prop::collection::vec(op(), 1..500)) {
        let mut cache = lru();
        let mut model = Model::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    cache.insert(k, v);
                    model.write_hot(k, v);
                },
                Op::Get(k) => {
                    prop_assert_eq!(cache.get(&k).copied(), model.get(k));
                },
                Op::Remove(k) => {
                    prop_assert_eq!(cache.remove(&k), model.remove(k));
                },
                Op::Rotate => {
                    cache.rotate();
                    model.rotate();
                },
            }
            prop_assert_eq!(cache.len(), model.len());
            let entries: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(entries, model.entries());
            for sector in 0..SECTOR_COUNT {
                prop_assert_eq!(cache.sector_len(sector), Some(model.sectors[sector].len()));
            }
            prop_assert!(cache.check_invariants().is_ok());
        }
    }
}
