//! # Cache Trait Hierarchy
//!
//! Two small traits cover what the sector caches have in common.
//!
//! ```text
//!                 ┌─────────────────────────────────────────┐
//!                 │             SectoredCache               │
//!                 │                                         │
//!                 │  sector_count(&) → usize                │
//!                 │  sector_max_item(&) → usize             │
//!                 │  sector_len(&, usize) → Option<usize>   │
//!                 │  len(&) → usize                         │
//!                 │  is_empty(&) → bool                     │
//!                 │  rotate(&mut)                           │
//!                 │  clear(&mut)                            │
//!                 └──────────────────┬──────────────────────┘
//!                                    │
//!                 ┌──────────────────┴──────────────────────┐
//!                 │                                         │
//!                 ▼                                         ▼
//!   ┌────────────────────────────┐          ┌────────────────────────────┐
//!   │     CoreCache<K, V>        │          │      PackedLruCache<K>     │
//!   │                            │          │  (inherent API: values are │
//!   │  insert / set              │          │   encoded field lists,     │
//!   │  get (may promote)         │          │   insert is fallible)      │
//!   │  peek / contains           │          └────────────────────────────┘
//!   │  remove                    │
//!   └────────────────────────────┘
//!     SectorLruCache, SectorTtlCache
//! ```
//!
//! ## Size Semantics
//!
//! `len()` is the sum of every sector's index size. A key overwritten in the
//! hot sector while an older copy still sits in a colder sector is counted
//! twice until that colder generation rotates out; the hot copy always wins on
//! lookup. Promotion never leaves such a duplicate behind.
//!
//! ## Thread Safety
//!
//! None of the caches are thread-safe. Operations run to completion without
//! suspension; wrap a cache in a mutex to share it.

/// Ring-level operations shared by every variant.
pub trait SectoredCache {
    /// Ring depth.
    fn sector_count(&self) -> usize;

    /// Writes per generation before the ring rotates.
    fn sector_max_item(&self) -> usize;

    /// Entries indexed by sector `sector` (0 = hot), or `None` past the ring.
    fn sector_len(&self, sector: usize) -> Option<usize>;

    /// Sum of all sector index sizes (see the module docs).
    fn len(&self) -> usize;

    /// Returns `true` if no sector holds an entry.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shifts every generation one sector colder, evicting the coldest.
    fn rotate(&mut self);

    /// Drops every entry.
    fn clear(&mut self);
}

/// Key/value operations of the map-backed caches.
///
/// # Example
///
/// ```
/// use sectorkit::policy::sector_lru::SectorLruCache;
/// use sectorkit::traits::CoreCache;
///
/// fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, &str)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.to_string());
///     }
/// }
///
/// let mut cache = SectorLruCache::new(100, 4);
/// warm(&mut cache, &[(1, "one"), (2, "two")]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V>: SectoredCache {
    /// Writes `key` into the hot sector, rotating first if the hot sector has
    /// used its write budget.
    fn insert(&mut self, key: K, value: V);

    /// Like [`insert`](Self::insert), but an absent value is a silent no-op.
    ///
    /// Returns `true` if a value was stored.
    fn set(&mut self, key: K, value: Option<V>) -> bool {
        match value {
            Some(value) => {
                self.insert(key, value);
                true
            },
            None => false,
        }
    }

    /// Looks `key` up hot to cold. Variants may move a cold hit into the hot
    /// sector.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Looks `key` up without moving it.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Returns `true` if any sector holds `key`.
    fn contains(&self, key: &K) -> bool;

    /// Removes `key` from every sector, returning the hottest copy's value.
    fn remove(&mut self, key: &K) -> Option<V>;
}
