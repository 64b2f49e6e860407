//! One configuration surface for every sector cache.
//!
//! [`CacheBuilder`] carries the construction parameters shared by the three
//! variants, with the library defaults, and validates them when a cache is
//! built. [`Cache`] wraps the two map-backed variants behind one type for
//! callers that pick the policy at runtime.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use sectorkit::builder::{CacheBuilder, CachePolicy};
//! use sectorkit::schema::Schema;
//!
//! let mut lru = CacheBuilder::new()
//!     .sector_max_item(1_000)
//!     .build_lru::<u64, String>()
//!     .unwrap();
//! lru.insert(1, "hello".to_string());
//!
//! let ttl = CacheBuilder::new()
//!     .expiration(Duration::from_secs(30))
//!     .refreshing_get(true)
//!     .build_ttl::<u64, String>()
//!     .unwrap();
//! assert_eq!(ttl.sector_expiration(), Duration::from_secs(10));
//!
//! let schema = Schema::parse(&["int32"], Some("double")).unwrap();
//! let packed = CacheBuilder::new()
//!     .sector_buffer_size(4_096)
//!     .build_packed::<u64>(schema)
//!     .unwrap();
//! assert_eq!(packed.sector_buffer_size(), 4_096);
//!
//! let mut cache = CacheBuilder::new().build::<u64, &str>(CachePolicy::Lru).unwrap();
//! cache.insert(7, "seven");
//! assert_eq!(cache.get(&7), Some(&"seven"));
//! ```

use std::hash::Hash;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::error::ConfigError;
use crate::policy::packed::PackedLruCache;
use crate::policy::sector_lru::SectorLruCache;
use crate::policy::sector_ttl::SectorTtlCache;
use crate::schema::Schema;
use crate::traits::{CoreCache, SectoredCache};

/// Writes per generation.
pub const DEFAULT_SECTOR_MAX_ITEM: usize = 250_000;
/// Ring depth.
pub const DEFAULT_SECTOR_COUNT: usize = 4;
/// Bytes per arena (packed cache).
pub const DEFAULT_SECTOR_BUFFER_SIZE: usize = 1_000_000;
/// Minimum entry lifetime (TTL cache).
pub const DEFAULT_EXPIRATION: Duration = Duration::from_millis(10_000);

/// Map-backed policies selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Count-triggered rotation only.
    Lru,
    /// Timer- and count-triggered rotation.
    Ttl,
}

/// Either map-backed cache behind one API.
#[derive(Debug)]
pub enum Cache<K, V> {
    Lru(SectorLruCache<K, V>),
    Ttl(SectorTtlCache<K, V, SystemClock>),
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
{
    /// Policy this cache was built with.
    pub fn policy(&self) -> CachePolicy {
        match self {
            Cache::Lru(_) => CachePolicy::Lru,
            Cache::Ttl(_) => CachePolicy::Ttl,
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        match self {
            Cache::Lru(lru) => lru.insert(key, value),
            Cache::Ttl(ttl) => ttl.insert(key, value),
        }
    }

    /// Inserts `value` if present. Returns `true` if stored.
    pub fn set(&mut self, key: K, value: Option<V>) -> bool {
        match self {
            Cache::Lru(lru) => lru.set(key, value),
            Cache::Ttl(ttl) => ttl.set(key, value),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self {
            Cache::Lru(lru) => lru.get(key),
            Cache::Ttl(ttl) => ttl.get(key),
        }
    }

    pub fn peek(&self, key: &K) -> Option<&V> {
        match self {
            Cache::Lru(lru) => lru.peek(key),
            Cache::Ttl(ttl) => ttl.peek(key),
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        match self {
            Cache::Lru(lru) => lru.contains(key),
            Cache::Ttl(ttl) => ttl.contains(key),
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        match self {
            Cache::Lru(lru) => lru.remove(key),
            Cache::Ttl(ttl) => ttl.remove(key),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Cache::Lru(lru) => lru.len(),
            Cache::Ttl(ttl) => ttl.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sector_count(&self) -> usize {
        match self {
            Cache::Lru(lru) => lru.sector_count(),
            Cache::Ttl(ttl) => ttl.sector_count(),
        }
    }

    pub fn rotate(&mut self) {
        match self {
            Cache::Lru(lru) => lru.rotate(),
            Cache::Ttl(ttl) => ttl.rotate(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Cache::Lru(lru) => lru.clear(),
            Cache::Ttl(ttl) => ttl.clear(),
        }
    }
}

impl<K, V> SectoredCache for Cache<K, V>
where
    K: Eq + Hash,
{
    fn sector_count(&self) -> usize {
        Cache::sector_count(self)
    }

    fn sector_max_item(&self) -> usize {
        match self {
            Cache::Lru(lru) => lru.sector_max_item(),
            Cache::Ttl(ttl) => ttl.sector_max_item(),
        }
    }

    fn sector_len(&self, sector: usize) -> Option<usize> {
        match self {
            Cache::Lru(lru) => lru.sector_len(sector),
            Cache::Ttl(ttl) => ttl.sector_len(sector),
        }
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }

    fn rotate(&mut self) {
        Cache::rotate(self);
    }

    fn clear(&mut self) {
        Cache::clear(self);
    }
}

impl<K, V> CoreCache<K, V> for Cache<K, V>
where
    K: Eq + Hash,
{
    fn insert(&mut self, key: K, value: V) {
        Cache::insert(self, key, value);
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        Cache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        Cache::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        Cache::contains(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        Cache::remove(self, key)
    }
}

/// Builder for every cache variant.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    sector_max_item: usize,
    sector_count: usize,
    sector_buffer_size: usize,
    expiration: Duration,
    refreshing_get: bool,
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self {
            sector_max_item: DEFAULT_SECTOR_MAX_ITEM,
            sector_count: DEFAULT_SECTOR_COUNT,
            sector_buffer_size: DEFAULT_SECTOR_BUFFER_SIZE,
            expiration: DEFAULT_EXPIRATION,
            refreshing_get: false,
        }
    }
}

impl CacheBuilder {
    /// Starts from the library defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes (or packed appends) per generation before rotating.
    pub fn sector_max_item(mut self, sector_max_item: usize) -> Self {
        self.sector_max_item = sector_max_item;
        self
    }

    /// Ring depth. Two or more is the practical minimum.
    pub fn sector_count(mut self, sector_count: usize) -> Self {
        self.sector_count = sector_count;
        self
    }

    /// Arena size in bytes (packed cache only).
    pub fn sector_buffer_size(mut self, sector_buffer_size: usize) -> Self {
        self.sector_buffer_size = sector_buffer_size;
        self
    }

    /// Minimum entry lifetime (TTL cache only).
    pub fn expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Whether cold hits on `get` are promoted (TTL cache only).
    pub fn refreshing_get(mut self, refreshing_get: bool) -> Self {
        self.refreshing_get = refreshing_get;
        self
    }

    /// Builds a count-triggered cache.
    pub fn build_lru<K, V>(&self) -> Result<SectorLruCache<K, V>, ConfigError>
    where
        K: Eq + Hash,
    {
        SectorLruCache::try_new(self.sector_max_item, self.sector_count)
    }

    /// Builds a TTL cache on the system clock.
    pub fn build_ttl<K, V>(&self) -> Result<SectorTtlCache<K, V>, ConfigError>
    where
        K: Eq + Hash,
    {
        self.build_ttl_with_clock(SystemClock::new())
    }

    /// Builds a TTL cache reading time from `clock`.
    pub fn build_ttl_with_clock<K, V, C>(
        &self,
        clock: C,
    ) -> Result<SectorTtlCache<K, V, C>, ConfigError>
    where
        K: Eq + Hash,
        C: Clock,
    {
        let cache = SectorTtlCache::try_with_clock(
            self.expiration,
            self.sector_max_item,
            self.sector_count,
            clock,
        )?;
        Ok(cache.with_refreshing_get(self.refreshing_get))
    }

    /// Builds a packed cache for `schema`.
    pub fn build_packed<K>(&self, schema: Schema) -> Result<PackedLruCache<K>, ConfigError>
    where
        K: Eq + Hash,
    {
        PackedLruCache::try_new(
            schema,
            self.sector_buffer_size,
            self.sector_max_item,
            self.sector_count,
        )
    }

    /// Builds a map-backed cache for a policy chosen at runtime.
    pub fn build<K, V>(&self, policy: CachePolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash,
    {
        match policy {
            CachePolicy::Lru => self.build_lru().map(Cache::Lru),
            CachePolicy::Ttl => self.build_ttl().map(Cache::Ttl),
        }
    }
}
