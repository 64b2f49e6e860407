//! Time-triggered sector cache.
//!
//! A [`SectorLruCache`] whose ring also rotates on a recurring timer, which
//! turns the generation count into an expiration bound. With `n` sectors and
//! an expiration time `E`, the ring rotates every `E / (n - 1)`; an entry
//! written at any point in a generation therefore lives between `E` and
//! `E * n / (n - 1)`. The per-sector write budget still applies as a second
//! trigger.
//!
//! ## Timer
//!
//! ```text
//!   insert ──► timer unarmed? ──► arm(now + period)
//!
//!   every &mut op:  while deadline <= now {
//!                       rotate()
//!                       cache empty? cancel : deadline += period
//!                   }
//!
//!   remove / clear ──► cache empty? ──► cancel
//!   rotate() / write budget exhausted ──► rotate, re-arm from now
//! ```
//!
//! The cache never spawns threads or sleeps. Deadlines are serviced at the
//! start of the next mutating call (or [`tick`](SectorTtlCache::tick)).
//! Read-only calls (`contains`, `peek`, `len`, `sector_len`) see the cache as
//! it will be once pending rotations run, without running them.
//!
//! ## Refreshing reads
//!
//! By default a `get` that hits a cold sector returns the value without moving
//! it, so reads do not extend lifetime. With `refreshing_get` enabled a cold
//! hit is promoted into the hot sector, restarting its lifetime.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use sectorkit::clock::ManualClock;
//! use sectorkit::policy::sector_ttl::SectorTtlCache;
//!
//! let clock = ManualClock::new();
//! let mut cache = SectorTtlCache::with_clock(Duration::from_millis(90), 1_000, 4, clock.clone());
//! assert_eq!(cache.sector_expiration(), Duration::from_millis(30));
//!
//! cache.insert("session", 42);
//! clock.advance(Duration::from_millis(60));
//! assert_eq!(cache.get(&"session"), Some(&42));
//!
//! clock.advance(Duration::from_millis(60));
//! assert_eq!(cache.get(&"session"), None);
//! ```

use std::hash::Hash;
use std::time::Duration;

use tracing::trace;

use crate::builder::{DEFAULT_EXPIRATION, DEFAULT_SECTOR_COUNT, DEFAULT_SECTOR_MAX_ITEM};
use crate::clock::{Clock, ExpirationTimer, SystemClock};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::SectorMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider, SectorMetricsRecorder};
use crate::policy::sector_lru::{Iter, SectorLruCache};
use crate::traits::{CoreCache, SectoredCache};

/// Sector cache whose generations also expire on a timer.
#[derive(Debug)]
pub struct SectorTtlCache<K, V, C = SystemClock> {
    inner: SectorLruCache<K, V>,
    clock: C,
    timer: ExpirationTimer,
    expiration: Duration,
    refreshing_get: bool,
}

/// Rotation period for `expiration` spread over `sector_count` sectors.
///
/// A single sector ring rotates every `2 * expiration`.
pub(crate) fn sector_period(
    expiration: Duration,
    sector_count: usize,
) -> Result<Duration, ConfigError> {
    if expiration.is_zero() {
        return Err(ConfigError::new("expiration must be greater than zero"));
    }
    // expiration / max(n - 1, 0.5), kept in whole nanoseconds
    let halves = match sector_count {
        0 | 1 => 1,
        n => 2 * (n as u128 - 1),
    };
    let nanos = expiration.as_nanos() * 2 / halves;
    if nanos == 0 {
        return Err(ConfigError::new("expiration is too short for the sector count"));
    }
    u64::try_from(nanos)
        .map(Duration::from_nanos)
        .map_err(|_| ConfigError::new("expiration is too large"))
}

impl<K, V> SectorTtlCache<K, V, SystemClock>
where
    K: Eq + Hash,
{
    /// Creates a cache whose entries expire after at least `expiration`.
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration. See [`try_new`](Self::try_new).
    pub fn new(expiration: Duration, sector_max_item: usize, sector_count: usize) -> Self {
        match Self::try_new(expiration, sector_max_item, sector_count) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible form of [`new`](Self::new).
    ///
    /// Fails if any parameter is zero.
    pub fn try_new(
        expiration: Duration,
        sector_max_item: usize,
        sector_count: usize,
    ) -> Result<Self, ConfigError> {
        Self::try_with_clock(expiration, sector_max_item, sector_count, SystemClock::new())
    }
}

impl<K, V, C> SectorTtlCache<K, V, C>
where
    K: Eq + Hash,
    C: Clock,
{
    /// Like [`SectorTtlCache::new`], reading time from `clock`.
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration.
    pub fn with_clock(
        expiration: Duration,
        sector_max_item: usize,
        sector_count: usize,
        clock: C,
    ) -> Self {
        match Self::try_with_clock(expiration, sector_max_item, sector_count, clock) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible form of [`with_clock`](Self::with_clock).
    pub fn try_with_clock(
        expiration: Duration,
        sector_max_item: usize,
        sector_count: usize,
        clock: C,
    ) -> Result<Self, ConfigError> {
        let inner = SectorLruCache::try_new(sector_max_item, sector_count)?;
        let period = sector_period(expiration, sector_count)?;
        Ok(Self {
            inner,
            clock,
            timer: ExpirationTimer::new(period),
            expiration,
            refreshing_get: false,
        })
    }

    /// Sets whether cold hits on `get` are promoted (builder style).
    pub fn with_refreshing_get(mut self, refreshing_get: bool) -> Self {
        self.refreshing_get = refreshing_get;
        self
    }

    /// Sets whether cold hits on `get` are promoted.
    pub fn set_refreshing_get(&mut self, refreshing_get: bool) {
        self.refreshing_get = refreshing_get;
    }

    /// Returns `true` if cold hits on `get` are promoted.
    pub fn refreshing_get(&self) -> bool {
        self.refreshing_get
    }

    /// Minimum lifetime of an entry.
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Time between two timer-driven rotations.
    pub fn sector_expiration(&self) -> Duration {
        self.timer.period()
    }

    /// Clock time of the next timer-driven rotation, if one is pending.
    ///
    /// Hosts that want eager eviction can sleep until then and call
    /// [`tick`](Self::tick).
    pub fn next_rotation_at(&self) -> Option<Duration> {
        self.timer.deadline()
    }

    /// Time source the timer is checked against.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Ring depth.
    pub fn sector_count(&self) -> usize {
        self.inner.sector_count()
    }

    /// Writes per generation before a count-triggered rotation.
    pub fn sector_max_item(&self) -> usize {
        self.inner.sector_max_item()
    }

    /// Runs every rotation whose deadline has passed.
    ///
    /// Returns the number of rotations performed.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        self.run_due(now)
    }

    fn run_due(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while self.timer.is_due(now) {
            self.inner.rotate();
            fired += 1;

            #[cfg(feature = "metrics")]
            self.inner.metrics_mut().record_timer_rotation();

            if self.inner.is_empty() {
                self.timer.cancel();
                trace!(fired, "ttl timer cancelled, cache empty");
            } else {
                self.timer.rearm_from_deadline(now);
            }
        }
        fired
    }

    /// Rotations pending at `now` that a mutating call would run first.
    #[inline]
    fn pending(&self) -> usize {
        self.timer.fires_by(self.clock.now(), self.inner.sector_count())
    }

    fn rotate_at(&mut self, now: Duration) {
        self.inner.rotate();
        if self.inner.is_empty() {
            self.timer.cancel();
            trace!("ttl timer cancelled, cache empty");
        } else {
            self.timer.arm(now);
            trace!(deadline = ?self.timer.deadline(), "ttl timer re-armed");
        }
    }

    /// Inserts or overwrites `key` in the hot sector and arms the timer.
    pub fn insert(&mut self, key: K, value: V) {
        let now = self.clock.now();
        self.run_due(now);

        if self.inner.is_hot_full() {
            self.rotate_at(now);
        }
        self.inner.insert(key, value);

        if !self.timer.is_armed() {
            self.timer.arm(now);
            trace!(deadline = ?self.timer.deadline(), "ttl timer armed");
        }
    }

    /// Inserts `value` if present; `None` is a no-op.
    pub fn set(&mut self, key: K, value: Option<V>) -> bool {
        match value {
            Some(value) => {
                self.insert(key, value);
                true
            },
            None => false,
        }
    }

    /// Looks `key` up hot to cold.
    ///
    /// A cold hit is promoted only when `refreshing_get` is enabled.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.clock.now();
        self.run_due(now);

        let promote = self.refreshing_get;
        let rotates = promote
            && self.inner.is_hot_full()
            && self.inner.position(key).is_some_and(|sector| sector > 0);

        let value = self.inner.lookup(key, promote);
        if rotates {
            self.timer.arm(now);
            trace!(deadline = ?self.timer.deadline(), "ttl timer re-armed");
        }
        value
    }

    /// Looks `key` up without promoting or running rotations.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let pending = self.pending();
        let n = self.inner.sector_count();
        self.inner
            .find(key)
            .filter(|(sector, _)| sector + pending < n)
            .map(|(_, value)| value)
    }

    /// Returns `true` if `key` is present and not yet expired.
    pub fn contains(&self, key: &K) -> bool {
        let pending = self.pending();
        let n = self.inner.sector_count();
        self.inner
            .position(key)
            .is_some_and(|sector| sector + pending < n)
    }

    /// Removes `key` everywhere; cancels the timer if the cache is now empty.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now();
        self.run_due(now);

        let removed = self.inner.remove(key);
        if self.inner.is_empty() && self.timer.is_armed() {
            self.timer.cancel();
            trace!("ttl timer cancelled, cache empty");
        }
        removed
    }

    /// Rotates now, then re-arms (or cancels) the timer.
    pub fn rotate(&mut self) {
        let now = self.clock.now();
        self.run_due(now);
        self.rotate_at(now);
    }

    /// Drops every entry and cancels the timer.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.timer.cancel();
    }

    /// Entries not yet expired, counted per sector.
    pub fn len(&self) -> usize {
        (0..self.inner.sector_count())
            .filter_map(|sector| self.sector_len(sector))
            .sum()
    }

    /// Returns `true` if no entry is still alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in sector `sector` (0 = hot), accounting for pending rotations.
    pub fn sector_len(&self, sector: usize) -> Option<usize> {
        if sector >= self.inner.sector_count() {
            return None;
        }
        let pending = self.pending();
        if sector < pending {
            return Some(0);
        }
        self.inner.sector_len(sector - pending)
    }

    /// Iterates live `(key, value)` pairs, hot sectors first, each key once.
    ///
    /// Like the other read-only views this skips sectors that pending
    /// rotations would drop, without running them.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let live = self.inner.sector_count().saturating_sub(self.pending());
        self.inner.iter_sectors(live)
    }

    /// Live keys, hot sectors first.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Values of live keys, hot sectors first.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Validates the ring and that a non-empty cache always has a pending
    /// rotation.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.check_invariants()?;
        if !self.inner.is_empty() && !self.timer.is_armed() {
            return Err(InvariantError::new(
                "cache holds entries but no rotation is scheduled",
            ));
        }
        Ok(())
    }
}

impl<K, V, C> Default for SectorTtlCache<K, V, C>
where
    K: Eq + Hash,
    C: Clock + Default,
{
    fn default() -> Self {
        Self::with_clock(
            DEFAULT_EXPIRATION,
            DEFAULT_SECTOR_MAX_ITEM,
            DEFAULT_SECTOR_COUNT,
            C::default(),
        )
    }
}

impl<'a, K, V, C> IntoIterator for &'a SectorTtlCache<K, V, C>
where
    K: Eq + Hash,
    C: Clock,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> SectoredCache for SectorTtlCache<K, V, C>
where
    K: Eq + Hash,
    C: Clock,
{
    fn sector_count(&self) -> usize {
        SectorTtlCache::sector_count(self)
    }

    fn sector_max_item(&self) -> usize {
        SectorTtlCache::sector_max_item(self)
    }

    fn sector_len(&self, sector: usize) -> Option<usize> {
        SectorTtlCache::sector_len(self, sector)
    }

    fn len(&self) -> usize {
        SectorTtlCache::len(self)
    }

    fn rotate(&mut self) {
        SectorTtlCache::rotate(self);
    }

    fn clear(&mut self) {
        SectorTtlCache::clear(self);
    }
}

impl<K, V, C> CoreCache<K, V> for SectorTtlCache<K, V, C>
where
    K: Eq + Hash,
    C: Clock,
{
    fn insert(&mut self, key: K, value: V) {
        SectorTtlCache::insert(self, key, value);
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        SectorTtlCache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        SectorTtlCache::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        SectorTtlCache::contains(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        SectorTtlCache::remove(self, key)
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C> MetricsSnapshotProvider<SectorMetricsSnapshot> for SectorTtlCache<K, V, C>
where
    K: Eq + Hash,
{
    fn snapshot(&self) -> SectorMetricsSnapshot {
        self.inner.snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C> MetricsReset for SectorTtlCache<K, V, C>
where
    K: Eq + Hash,
{
    fn reset_metrics(&mut self) {
        self.inner.reset_metrics();
    }
}
