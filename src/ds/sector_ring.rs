//! Generational sector ring shared by every cache variant.
//!
//! Holds a fixed number of sectors and a cursor naming the "hot" one. Writes
//! go to the hot sector; rotation moves the cursor one slot back so that
//! every sector becomes one generation colder, and the slot that held the
//! coldest generation is reset and reused as the new hot sector.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         SectorRing<S>                                 │
//!   │                                                                       │
//!   │   sectors: Vec<S>   (allocated once, never resized)                   │
//!   │   hot ──────────────┐                                                 │
//!   │                     ▼                                                 │
//!   │   physical: [  s0  |  s1  |  s2  |  s3  ]                             │
//!   │   logical:     3      0      1      2     (0 = hot, 3 = coldest)      │
//!   │                                                                       │
//!   │   rotate():  hot = hot - 1 (mod n), sectors[hot].reset()              │
//!   │                                                                       │
//!   │   physical: [  s0  |  s1  |  s2  |  s3  ]                             │
//!   │   logical:     0      1      2      3                                 │
//!   │                ▲ recycled: old coldest generation dropped             │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Properties
//!
//! - Rotation is O(1) besides the cost of [`Sector::reset`] on the recycled
//!   slot; no per-access bookkeeping exists anywhere.
//! - An entry written into the hot sector survives at least 1 and at most
//!   `n` rotations.
//! - The ring counts writes to the hot sector (`ops`); the count resets on
//!   rotation and callers compare it against `max_ops` to decide when to
//!   rotate.

use std::hash::{BuildHasher, Hash};

use indexmap::IndexMap;

use crate::error::{ConfigError, InvariantError};

/// One generation slot of a [`SectorRing`].
pub trait Sector {
    /// Number of live index entries.
    fn len(&self) -> usize;

    /// Returns `true` if the sector holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry so the slot can be reused as a fresh hot sector.
    ///
    /// Implementations keep their allocations.
    fn reset(&mut self);
}

impl<K, V, S> Sector for IndexMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn len(&self) -> usize {
        IndexMap::len(self)
    }

    #[inline]
    fn reset(&mut self) {
        self.clear();
    }
}

/// Fixed ring of sectors with a movable hot cursor.
#[derive(Debug)]
pub struct SectorRing<S> {
    sectors: Vec<S>,
    hot: usize,
    ops: usize,
    max_ops: usize,
}

impl<S: Sector> SectorRing<S> {
    /// Creates a ring of `sector_count` sectors built by `make`.
    ///
    /// `max_ops` is the per-generation write budget reported by
    /// [`is_full`](Self::is_full).
    pub fn try_new(
        sector_count: usize,
        max_ops: usize,
        make: impl FnMut() -> S,
    ) -> Result<Self, ConfigError> {
        if sector_count == 0 {
            return Err(ConfigError::new("sector_count must be greater than zero"));
        }
        if max_ops == 0 {
            return Err(ConfigError::new("sector_max_item must be greater than zero"));
        }

        let mut sectors = Vec::with_capacity(sector_count);
        sectors.resize_with(sector_count, make);
        Ok(Self {
            sectors,
            hot: 0,
            ops: 0,
            max_ops,
        })
    }

    /// Number of sectors (ring depth).
    #[inline]
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Per-generation write budget.
    #[inline]
    pub fn max_ops(&self) -> usize {
        self.max_ops
    }

    /// Writes recorded since the last rotation.
    #[inline]
    pub fn ops(&self) -> usize {
        self.ops
    }

    /// Returns `true` once the hot sector has used its write budget.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ops >= self.max_ops
    }

    /// Records one write into the hot sector.
    #[inline]
    pub fn record_op(&mut self) {
        self.ops += 1;
    }

    #[inline]
    fn physical(&self, sector: usize) -> usize {
        (self.hot + sector) % self.sectors.len()
    }

    /// The hot sector.
    #[inline]
    pub fn hot(&self) -> &S {
        &self.sectors[self.hot]
    }

    /// The hot sector, mutably.
    #[inline]
    pub fn hot_mut(&mut self) -> &mut S {
        &mut self.sectors[self.hot]
    }

    /// Sector `sector` generations colder than hot, or `None` past the ring.
    #[inline]
    pub fn get(&self, sector: usize) -> Option<&S> {
        if sector >= self.sectors.len() {
            return None;
        }
        Some(&self.sectors[self.physical(sector)])
    }

    /// Mutable access to sector `sector` (0 = hot).
    #[inline]
    pub fn get_mut(&mut self, sector: usize) -> Option<&mut S> {
        if sector >= self.sectors.len() {
            return None;
        }
        let idx = self.physical(sector);
        Some(&mut self.sectors[idx])
    }

    /// Iterates sectors from hot to coldest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &S> + ExactSizeIterator + '_ {
        (0..self.sectors.len()).map(move |sector| &self.sectors[self.physical(sector)])
    }

    /// Iterates sectors mutably, in physical order.
    ///
    /// Only for operations that treat every sector alike (removal, reset).
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, S> {
        self.sectors.iter_mut()
    }

    /// Index (0 = hot) of the first sector, hot to cold, matching `pred`.
    pub fn position(&self, mut pred: impl FnMut(&S) -> bool) -> Option<usize> {
        self.iter().position(|sector| pred(sector))
    }

    /// Sum of every sector's entry count.
    pub fn len(&self) -> usize {
        self.sectors.iter().map(Sector::len).sum()
    }

    /// Returns `true` if no sector holds an entry.
    pub fn is_empty(&self) -> bool {
        self.sectors.iter().all(Sector::is_empty)
    }

    /// Shifts every generation one slot colder.
    ///
    /// The coldest generation is reset and becomes the new hot sector; the
    /// write counter returns to zero. Returns the number of entries the
    /// recycled sector held (all of them are now evicted).
    pub fn rotate(&mut self) -> usize {
        let n = self.sectors.len();
        self.hot = (self.hot + n - 1) % n;
        let evicted = self.sectors[self.hot].len();
        self.sectors[self.hot].reset();
        self.ops = 0;
        evicted
    }

    /// Resets every sector and the write counter. The hot cursor stays put.
    pub fn clear(&mut self) {
        for sector in &mut self.sectors {
            sector.reset();
        }
        self.ops = 0;
    }

    /// Validates the cursor bounds.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.hot >= self.sectors.len() {
            return Err(InvariantError::new(format!(
                "hot cursor {} outside ring of {} sectors",
                self.hot,
                self.sectors.len()
            )));
        }
        Ok(())
    }
}
