//! Count-triggered sector LRU cache.
//!
//! Approximates LRU with a ring of insertion-ordered maps ("sectors"). Writes go to the hot
//! sector; once the hot sector has taken `sector_max_item` writes the ring
//! rotates, every generation moves one sector colder and the coldest one is
//! dropped wholesale. A read that hits a cold sector moves the entry back into
//! the hot sector, so frequently read keys never age out.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────────┐
//!   │                       SectorLruCache<K, V>                             │
//!   │                                                                        │
//!   │   ring: SectorRing<IndexMap<K, V, FxBuildHasher>>                      │
//!   │                                                                        │
//!   │    sector 0 (hot)   sector 1       sector 2       sector 3 (coldest)   │
//!   │   ┌────────────┐   ┌────────────┐ ┌────────────┐ ┌────────────┐        │
//!   │   │ e ─► 5     │   │ c ─► 3     │ │ b ─► 2     │ │ a ─► 1     │        │
//!   │   │ f ─► 6     │   │ d ─► 4     │ │            │ │            │        │
//!   │   └────────────┘   └────────────┘ └────────────┘ └────────────┘        │
//!   │        ▲                 │                                             │
//!   │        └── get(c) ───────┘  promotion: remove from sector 1,           │
//!   │                              insert into hot                           │
//!   └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation  | Time          | Notes                                        |
//! |------------|---------------|----------------------------------------------|
//! | `insert`   | O(1)          | Hot sector only; may rotate first            |
//! | `get`      | O(n) lookups  | n = sector count; cold hits are promoted     |
//! | `peek`     | O(n) lookups  | No promotion                                 |
//! | `remove`   | O(n) lookups  | Every sector is checked                      |
//! | `rotate`   | O(1) + reset  | Coldest map is cleared and reused            |
//!
//! ## Residency
//!
//! With `sector_count = n` and `sector_max_item = m`, an entry that is never
//! read survives between `m` and `n * m` subsequent writes. The number of
//! live entries never exceeds `n * m`.
//!
//! ## Example
//!
//! ```
//! use sectorkit::policy::sector_lru::SectorLruCache;
//!
//! let mut cache = SectorLruCache::new(2, 2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.insert("c", 3); // hot sector full: rotate, a/b become cold
//!
//! assert_eq!(cache.get(&"a"), Some(&1)); // promoted back to hot
//! cache.insert("d", 4); // rotate again: b is evicted, a survives
//!
//! assert!(!cache.contains(&"b"));
//! assert!(cache.contains(&"a"));
//! ```

use std::hash::Hash;

use indexmap::IndexMap;
use indexmap::map::{self, Entry};
use rustc_hash::{FxBuildHasher, FxHashSet};
use tracing::trace;

use crate::builder::{DEFAULT_SECTOR_COUNT, DEFAULT_SECTOR_MAX_ITEM};
use crate::ds::sector_ring::SectorRing;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::SectorMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::SectorMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsReset, MetricsSnapshotProvider, SectorMetricsReadRecorder,
    SectorMetricsRecorder,
};
use crate::traits::{CoreCache, SectoredCache};

/// One generation of a map-backed cache, in insertion order.
type SectorMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Approximate LRU cache rotating on a per-sector write budget.
#[derive(Debug)]
pub struct SectorLruCache<K, V> {
    ring: SectorRing<SectorMap<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: SectorMetrics,
}

impl<K, V> SectorLruCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates a cache of `sector_count` sectors, rotating every
    /// `sector_max_item` writes.
    ///
    /// # Panics
    ///
    /// Panics if either parameter is zero. See [`try_new`](Self::try_new).
    pub fn new(sector_max_item: usize, sector_count: usize) -> Self {
        match Self::try_new(sector_max_item, sector_count) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible form of [`new`](Self::new).
    pub fn try_new(sector_max_item: usize, sector_count: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            ring: SectorRing::try_new(sector_count, sector_max_item, SectorMap::default)?,
            #[cfg(feature = "metrics")]
            metrics: SectorMetrics::default(),
        })
    }

    /// Ring depth.
    #[inline]
    pub fn sector_count(&self) -> usize {
        self.ring.sector_count()
    }

    /// Writes per generation.
    #[inline]
    pub fn sector_max_item(&self) -> usize {
        self.ring.max_ops()
    }

    /// Sum of all sector sizes. See [`crate::traits`] for duplicate counting.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` if no sector holds an entry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Entries in sector `sector` (0 = hot).
    #[inline]
    pub fn sector_len(&self, sector: usize) -> Option<usize> {
        self.ring.get(sector).map(|map| map.len())
    }

    /// Inserts or overwrites `key` in the hot sector.
    ///
    /// A new key is appended to the hot sector's order; overwriting keeps the
    /// key's position. Copies of `key` in colder sectors are left alone; they are shadowed by
    /// the hot copy and age out with their generation.
    pub fn insert(&mut self, key: K, value: V) {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.ring.is_full() {
            self.rotate();
        }

        let _previous = self.ring.hot_mut().insert(key, value);
        self.ring.record_op();

        #[cfg(feature = "metrics")]
        if _previous.is_some() {
            self.metrics.record_insert_update();
        } else {
            self.metrics.record_insert_new();
        }
    }

    /// Inserts `value` if present; `None` is a no-op.
    ///
    /// Returns `true` if a value was stored.
    ///
    /// ```
    /// use sectorkit::policy::sector_lru::SectorLruCache;
    ///
    /// let mut cache = SectorLruCache::new(10, 2);
    /// assert!(!cache.set("missing", None::<i32>));
    /// assert!(cache.set("zero", Some(0)));
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn set(&mut self, key: K, value: Option<V>) -> bool {
        match value {
            Some(value) => {
                self.insert(key, value);
                true
            },
            None => false,
        }
    }

    /// Looks `key` up hot to cold, promoting a cold hit into the hot sector.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.lookup(key, true)
    }

    /// Looks `key` up without promoting it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let found = self.find(key).map(|(_, value)| value);

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_peek_call();
            if found.is_some() {
                self.metrics.record_peek_found();
            }
        }

        found
    }

    /// Returns `true` if any sector holds `key`. Never promotes.
    pub fn contains(&self, key: &K) -> bool {
        let found = self.position(key).is_some();

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_contains_call();
            if found {
                self.metrics.record_contains_found();
            }
        }

        found
    }

    /// Removes `key` from every sector.
    ///
    /// Returns the value of the hottest copy, if any.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let mut removed = None;
        for sector in 0..self.ring.sector_count() {
            let value = self.ring.get_mut(sector).and_then(|map| map.shift_remove(key));
            if removed.is_none() {
                removed = value;
            }
        }

        #[cfg(feature = "metrics")]
        if removed.is_some() {
            self.metrics.record_remove_found();
        }

        removed
    }

    /// Rotates the ring, dropping the coldest generation.
    pub fn rotate(&mut self) {
        let evicted = self.ring.rotate();
        trace!(
            evicted,
            sector_count = self.ring.sector_count(),
            "sector lru rotated"
        );

        #[cfg(feature = "metrics")]
        self.metrics.record_rotation(evicted);
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.ring.clear();

        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Iterates `(key, value)` pairs, hot sectors first, each key once.
    ///
    /// Within a sector, keys come in insertion order. A key present in
    /// several sectors is yielded with its hottest value.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.iter_sectors(self.ring.sector_count())
    }

    /// Distinct keys, hot sectors first.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Values of distinct keys, hot sectors first.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Validates ring bounds and the hot sector write budget.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.ring.check_invariants()?;
        if self.ring.hot().len() > self.ring.ops() {
            return Err(InvariantError::new(format!(
                "hot sector holds {} entries but only {} writes were recorded",
                self.ring.hot().len(),
                self.ring.ops()
            )));
        }
        Ok(())
    }

    /// Returns `true` once the next write must rotate first.
    #[inline]
    pub(crate) fn is_hot_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Sector index (0 = hot) of the hottest copy of `key`.
    #[inline]
    pub(crate) fn position(&self, key: &K) -> Option<usize> {
        self.ring.position(|map| map.contains_key(key))
    }

    /// Hottest copy of `key` with its sector index.
    pub(crate) fn find(&self, key: &K) -> Option<(usize, &V)> {
        self.ring
            .iter()
            .enumerate()
            .find_map(|(sector, map)| map.get(key).map(|value| (sector, value)))
    }

    /// Like [`iter`](Self::iter), limited to the `sectors` hottest sectors.
    pub(crate) fn iter_sectors(&self, sectors: usize) -> Iter<'_, K, V> {
        Iter {
            ring: &self.ring,
            next_sector: 0,
            end: sectors.min(self.ring.sector_count()),
            current: None,
            seen: FxHashSet::default(),
        }
    }

    /// Shared lookup for `get`; `promote` decides whether a cold hit moves.
    pub(crate) fn lookup(&mut self, key: &K, promote: bool) -> Option<&V> {
        let Some(sector) = self.position(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        if sector == 0 || !promote {
            return self.ring.get(sector).and_then(|map| map.get(key));
        }

        let (key, value) = self.ring.get_mut(sector)?.shift_remove_entry(key)?;
        Some(self.promote(key, value))
    }

    /// Moves a detached cold entry into the hot sector.
    fn promote(&mut self, key: K, value: V) -> &V {
        if self.ring.is_full() {
            self.rotate();
        }
        self.ring.record_op();

        #[cfg(feature = "metrics")]
        self.metrics.record_promotion();

        match self.ring.hot_mut().entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(value);
                slot.into_mut()
            },
            Entry::Vacant(slot) => slot.insert(value),
        }
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn metrics_mut(&mut self) -> &mut SectorMetrics {
        &mut self.metrics
    }
}

impl<K, V> Default for SectorLruCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new(DEFAULT_SECTOR_MAX_ITEM, DEFAULT_SECTOR_COUNT)
    }
}

/// Deduplicating iterator over a [`SectorLruCache`], hot sectors first.
pub struct Iter<'a, K, V> {
    ring: &'a SectorRing<SectorMap<K, V>>,
    next_sector: usize,
    end: usize,
    current: Option<map::Iter<'a, K, V>>,
    seen: FxHashSet<&'a K>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entries) = &mut self.current {
                for (key, value) in entries.by_ref() {
                    if self.seen.insert(key) {
                        return Some((key, value));
                    }
                }
            }
            if self.next_sector >= self.end {
                return None;
            }
            let sector = self.ring.get(self.next_sector)?;
            self.next_sector += 1;
            self.current = Some(sector.iter());
        }
    }
}

impl<'a, K, V> IntoIterator for &'a SectorLruCache<K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> SectoredCache for SectorLruCache<K, V>
where
    K: Eq + Hash,
{
    fn sector_count(&self) -> usize {
        SectorLruCache::sector_count(self)
    }

    fn sector_max_item(&self) -> usize {
        SectorLruCache::sector_max_item(self)
    }

    fn sector_len(&self, sector: usize) -> Option<usize> {
        SectorLruCache::sector_len(self, sector)
    }

    fn len(&self) -> usize {
        SectorLruCache::len(self)
    }

    fn rotate(&mut self) {
        SectorLruCache::rotate(self);
    }

    fn clear(&mut self) {
        SectorLruCache::clear(self);
    }
}

impl<K, V> CoreCache<K, V> for SectorLruCache<K, V>
where
    K: Eq + Hash,
{
    fn insert(&mut self, key: K, value: V) {
        SectorLruCache::insert(self, key, value);
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        SectorLruCache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        SectorLruCache::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        SectorLruCache::contains(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        SectorLruCache::remove(self, key)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<SectorMetricsSnapshot> for SectorLruCache<K, V>
where
    K: Eq + Hash,
{
    fn snapshot(&self) -> SectorMetricsSnapshot {
        self.metrics.snapshot(self.len(), self.sector_count())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsReset for SectorLruCache<K, V>
where
    K: Eq + Hash,
{
    fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}
