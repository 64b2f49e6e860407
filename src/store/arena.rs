//! Byte-arena sector for packed records.
//!
//! An [`ArenaSector`] pairs a key → offset index with one fixed-capacity byte
//! buffer. Records are appended at the write cursor while the sector is hot;
//! once the ring rotates it away the sector is a read-only snapshot. When the
//! ring recycles it as the new hot sector only the index and cursor are reset:
//! the old bytes stay in place and are overwritten lazily by later writes.
//!
//! ```text
//!   index: { "a" → 0, "b" → 14, "c" → 26 }
//!
//!   arena: ┌──────────────┬────────────┬──────────────┬───────────────────┐
//!          │   record a   │  record b  │   record c   │  stale / unused   │
//!          └──────────────┴────────────┴──────────────┴───────────────────┘
//!          0              14           26             40 = write_offset   capacity
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::sector_ring::Sector;

/// One generation of a packed cache: offsets plus the bytes they point into.
#[derive(Debug)]
pub struct ArenaSector<K> {
    index: FxHashMap<K, usize>,
    arena: Box<[u8]>,
    write_offset: usize,
}

impl<K> ArenaSector<K>
where
    K: Eq + Hash,
{
    /// Allocates a zeroed arena of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: FxHashMap::default(),
            arena: vec![0u8; capacity].into_boxed_slice(),
            write_offset: 0,
        }
    }

    /// Arena size in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// Next append position.
    #[inline]
    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// Bytes still available for appends.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.arena.len() - self.write_offset
    }

    /// Returns `true` if `size` more bytes fit behind the write cursor.
    #[inline]
    pub fn fits(&self, size: usize) -> bool {
        size <= self.remaining()
    }

    /// Offset of `key`'s record, if indexed here.
    #[inline]
    pub fn offset(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Drops `key` from the index. The record bytes are left untouched.
    #[inline]
    pub fn remove(&mut self, key: &K) -> Option<usize> {
        self.index.remove(key)
    }

    /// Like [`remove`](Self::remove), handing back the owned key.
    #[inline]
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, usize)> {
        self.index.remove_entry(key)
    }

    /// Raw arena bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.arena
    }

    /// Mutable view of `len` bytes at `offset`, or `None` if out of bounds.
    #[inline]
    pub fn slot_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        self.arena.get_mut(offset..offset.checked_add(len)?)
    }

    /// Reserves `size` bytes at the write cursor for `key`.
    ///
    /// Returns the offset of the reservation, or `None` if the arena is full.
    pub fn append(&mut self, key: K, size: usize) -> Option<usize> {
        if !self.fits(size) {
            return None;
        }
        let offset = self.write_offset;
        self.write_offset += size;
        self.index.insert(key, offset);
        Some(offset)
    }

    /// Iterates `(key, offset)` pairs in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, usize)> + '_ {
        self.index.iter().map(|(key, &offset)| (key, offset))
    }
}

impl<K> Sector for ArenaSector<K>
where
    K: Eq + Hash,
{
    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    fn reset(&mut self) {
        self.index.clear();
        self.write_offset = 0;
    }
}
