//! Byte-packed sector cache.
//!
//! Stores typed records directly inside pre-allocated byte arenas instead of
//! boxed values, so total memory is fixed at
//! `sector_count * sector_buffer_size` bytes plus the key indexes. Each
//! sector is an [`ArenaSector`]: a key → offset index over one arena. Records
//! follow a [`Schema`] (see [`crate::schema`] for the layout).
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────────────┐
//!   │                         PackedLruCache<K>                               │
//!   │                                                                         │
//!   │   schema: Schema            sector_buffer_size: usize                   │
//!   │   ring: SectorRing<ArenaSector<K>>                                      │
//!   │                                                                         │
//!   │   hot   ┌ index {a→0, b→12} ┐  arena [ a | b |░░░░░░░░░░░░░░░░]          │
//!   │         └───────────────────┘              ▲ write_offset                │
//!   │   cold  ┌ index {c→0}       ┐  arena [ c |▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒] (frozen)  │
//!   │   ...                                                                   │
//!   └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Writes
//!
//! ```text
//!   insert(key, values)
//!     │ validate: value count, integer ranges, record fits one arena
//!     │           (rejected inserts change nothing)
//!     ├── key in hot index and old record >= new record ──► rewrite in place
//!     └── otherwise
//!           ├── write budget used or arena full ──► rotate
//!           └── append at write_offset, index key, advance cursor
//! ```
//!
//! Rotation recycles the coldest arena as the new hot one. Only its index and
//! cursor are reset; the stale bytes are overwritten by later appends.
//!
//! ## Reads
//!
//! `get` decodes into a fresh `Vec` (or a caller buffer with `get_into`). A
//! cold hit is detached from its sector and re-encoded into the hot arena:
//! the cold arena may be recycled by the very rotation the write triggers, so
//! the bytes are never copied raw.
//!
//! ## Example
//!
//! ```
//! use sectorkit::policy::packed::PackedLruCache;
//! use sectorkit::schema::{FieldValue, Schema};
//!
//! let schema = Schema::parse(&["uint32", "float"], Some("int16")).unwrap();
//! let mut cache = PackedLruCache::new(schema, 1_024, 100, 4);
//!
//! cache
//!     .insert("sensor-1", &[42u32.into(), 0.5f32.into(), (-3i16).into(), 7i16.into()])
//!     .unwrap();
//!
//! let values = cache.get(&"sensor-1").unwrap();
//! assert_eq!(values[0], FieldValue::Uint32(42));
//! assert_eq!(&values[2..], &[FieldValue::Int16(-3), FieldValue::Int16(7)]);
//! ```

use std::hash::Hash;

use tracing::{debug, trace};

use crate::ds::sector_ring::{Sector, SectorRing};
use crate::error::{ConfigError, InsertError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::SectorMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::SectorMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsReset, MetricsSnapshotProvider, SectorMetricsReadRecorder,
    SectorMetricsRecorder,
};
use crate::schema::{FieldValue, Schema};
use crate::store::arena::ArenaSector;
use crate::traits::SectoredCache;

/// Sector cache storing schema-encoded records in fixed byte arenas.
#[derive(Debug)]
pub struct PackedLruCache<K> {
    ring: SectorRing<ArenaSector<K>>,
    schema: Schema,
    sector_buffer_size: usize,
    #[cfg(feature = "metrics")]
    metrics: SectorMetrics,
}

impl<K> PackedLruCache<K>
where
    K: Eq + Hash,
{
    /// Creates a packed cache with `sector_count` arenas of
    /// `sector_buffer_size` bytes, rotating every `sector_max_item` appends.
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration. See [`try_new`](Self::try_new).
    pub fn new(
        schema: Schema,
        sector_buffer_size: usize,
        sector_max_item: usize,
        sector_count: usize,
    ) -> Self {
        match Self::try_new(schema, sector_buffer_size, sector_max_item, sector_count) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible form of [`new`](Self::new).
    ///
    /// Fails if any size is zero or if a record with no variable entries
    /// would not fit in one arena.
    pub fn try_new(
        schema: Schema,
        sector_buffer_size: usize,
        sector_max_item: usize,
        sector_count: usize,
    ) -> Result<Self, ConfigError> {
        if sector_buffer_size == 0 {
            return Err(ConfigError::new("sector_buffer_size must be greater than zero"));
        }
        if schema.min_item_size() > sector_buffer_size {
            return Err(ConfigError::new(format!(
                "records need at least {} bytes but sector_buffer_size is {}",
                schema.min_item_size(),
                sector_buffer_size
            )));
        }

        let ring = SectorRing::try_new(sector_count, sector_max_item, || {
            ArenaSector::with_capacity(sector_buffer_size)
        })?;

        Ok(Self {
            ring,
            schema,
            sector_buffer_size,
            #[cfg(feature = "metrics")]
            metrics: SectorMetrics::default(),
        })
    }

    /// Record layout.
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Capacity of each arena in bytes.
    #[inline]
    pub fn sector_buffer_size(&self) -> usize {
        self.sector_buffer_size
    }

    /// Ring depth.
    #[inline]
    pub fn sector_count(&self) -> usize {
        self.ring.sector_count()
    }

    /// Appends per generation.
    #[inline]
    pub fn sector_max_item(&self) -> usize {
        self.ring.max_ops()
    }

    /// Append position in the hot arena.
    #[inline]
    pub fn write_offset(&self) -> usize {
        self.ring.hot().write_offset()
    }

    /// Sum of all sector index sizes.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Entries indexed by sector `sector` (0 = hot).
    #[inline]
    pub fn sector_len(&self, sector: usize) -> Option<usize> {
        self.ring.get(sector).map(Sector::len)
    }

    /// Encodes `values` under `key` in the hot arena.
    ///
    /// The first `schema().fields().len()` values fill the fixed fields in
    /// order; any remaining values are entries of the variable field.
    ///
    /// # Errors
    ///
    /// Returns an [`InsertError`] and leaves the cache untouched if values
    /// are missing, surplus or out of range, or if the record is larger than
    /// one arena.
    pub fn insert(&mut self, key: K, values: &[FieldValue]) -> Result<(), InsertError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let size = match self.validate(values) {
            Ok(size) => size,
            Err(err) => {
                debug!(%err, "packed insert rejected");

                #[cfg(feature = "metrics")]
                self.metrics.record_insert_rejected();

                return Err(err);
            },
        };

        self.store(key, values, size);
        Ok(())
    }

    fn validate(&self, values: &[FieldValue]) -> Result<usize, InsertError> {
        let size = self.schema.measure(values)?;
        if size > self.sector_buffer_size {
            return Err(InsertError::TooLarge {
                size,
                capacity: self.sector_buffer_size,
            });
        }
        Ok(size)
    }

    /// Writes an already validated record of `size` bytes.
    fn store(&mut self, key: K, values: &[FieldValue], size: usize) {
        let hot = self.ring.hot_mut();
        if let Some(offset) = hot.offset(&key)
            && self
                .schema
                .entry_size(hot.bytes(), offset)
                .is_some_and(|existing| existing >= size)
            && let Some(slot) = hot.slot_mut(offset, size)
        {
            self.schema.encode(slot, values);

            #[cfg(feature = "metrics")]
            {
                self.metrics.record_in_place_rewrite();
                self.metrics.record_insert_update();
            }
            return;
        }

        if self.ring.is_full() || !self.ring.hot().fits(size) {
            self.rotate();
        }

        let hot = self.ring.hot_mut();
        let _replaced = hot.contains(&key);
        if let Some(offset) = hot.append(key, size)
            && let Some(slot) = hot.slot_mut(offset, size)
        {
            self.schema.encode(slot, values);
        }
        self.ring.record_op();

        #[cfg(feature = "metrics")]
        if _replaced {
            self.metrics.record_insert_update();
        } else {
            self.metrics.record_insert_new();
        }
    }

    /// Decodes the record for `key`, promoting a cold hit into the hot arena.
    pub fn get(&mut self, key: &K) -> Option<Vec<FieldValue>> {
        let mut out = Vec::new();
        self.get_into(key, &mut out).then_some(out)
    }

    /// Like [`get`](Self::get), decoding into a caller-provided buffer.
    ///
    /// `out` is cleared first. Returns `false` on a miss, leaving `out` empty.
    ///
    /// ```
    /// use sectorkit::policy::packed::PackedLruCache;
    /// use sectorkit::schema::{FieldValue, Schema};
    ///
    /// let schema = Schema::parse(&["uint8"], None).unwrap();
    /// let mut cache = PackedLruCache::new(schema, 64, 8, 2);
    /// cache.insert(1u32, &[FieldValue::Uint8(9)]).unwrap();
    ///
    /// let mut buf = Vec::with_capacity(4);
    /// assert!(cache.get_into(&1, &mut buf));
    /// assert_eq!(buf, [FieldValue::Uint8(9)]);
    /// assert!(!cache.get_into(&2, &mut buf));
    /// assert!(buf.is_empty());
    /// ```
    pub fn get_into(&mut self, key: &K, out: &mut Vec<FieldValue>) -> bool {
        out.clear();
        let Some((sector, offset)) = self.locate(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return false;
        };

        let Some(arena) = self.ring.get(sector).map(ArenaSector::bytes) else {
            return false;
        };
        if self.schema.decode_into(arena, offset, out).is_none() {
            out.clear();
            return false;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        if sector > 0
            && let Some((key, _)) = self
                .ring
                .get_mut(sector)
                .and_then(|cold| cold.remove_entry(key))
        {
            let var_count = out.len() - self.schema.fields().len();
            let size = self.schema.item_size(var_count);
            self.store(key, out.as_slice(), size);

            #[cfg(feature = "metrics")]
            self.metrics.record_promotion();
        }
        true
    }

    /// Decodes the record for `key` without promoting it.
    pub fn peek(&self, key: &K) -> Option<Vec<FieldValue>> {
        let found = self.locate(key).and_then(|(sector, offset)| {
            let mut out = Vec::new();
            let arena = self.ring.get(sector)?.bytes();
            self.schema.decode_into(arena, offset, &mut out)?;
            Some(out)
        });

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_peek_call();
            if found.is_some() {
                self.metrics.record_peek_found();
            }
        }

        found
    }

    /// Returns `true` if any sector indexes `key`.
    pub fn contains(&self, key: &K) -> bool {
        let found = self.ring.position(|sector| sector.contains(key)).is_some();

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_contains_call();
            if found {
                self.metrics.record_contains_found();
            }
        }

        found
    }

    /// Drops `key` from every sector index. Arena bytes are left in place.
    ///
    /// Returns `true` if any sector held the key.
    pub fn remove(&mut self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let mut removed = false;
        for sector in self.ring.iter_mut() {
            removed |= sector.remove(key).is_some();
        }

        #[cfg(feature = "metrics")]
        if removed {
            self.metrics.record_remove_found();
        }

        removed
    }

    /// Rotates the ring, recycling the coldest arena as the new hot one.
    pub fn rotate(&mut self) {
        let evicted = self.ring.rotate();
        trace!(
            evicted,
            sector_count = self.ring.sector_count(),
            "packed cache rotated"
        );

        #[cfg(feature = "metrics")]
        self.metrics.record_rotation(evicted);
    }

    /// Forgets every record and rewinds every arena cursor.
    pub fn clear(&mut self) {
        self.ring.clear();

        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Sector index and arena offset of the hottest copy of `key`.
    fn locate(&self, key: &K) -> Option<(usize, usize)> {
        self.ring
            .iter()
            .enumerate()
            .find_map(|(sector, arena)| arena.offset(key).map(|offset| (sector, offset)))
    }

    /// Validates that every indexed record lies below its arena's cursor.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.ring.check_invariants()?;

        if self.ring.hot().len() > self.ring.ops() {
            return Err(InvariantError::new(format!(
                "hot arena indexes {} records but only {} appends were recorded",
                self.ring.hot().len(),
                self.ring.ops()
            )));
        }

        for (sector, arena) in self.ring.iter().enumerate() {
            if arena.write_offset() > arena.capacity() {
                return Err(InvariantError::new(format!(
                    "sector {sector}: write offset {} past capacity {}",
                    arena.write_offset(),
                    arena.capacity()
                )));
            }
            for (_, offset) in arena.entries() {
                let end = self
                    .schema
                    .entry_size(arena.bytes(), offset)
                    .map(|size| offset + size);
                if !end.is_some_and(|end| end <= arena.write_offset()) {
                    return Err(InvariantError::new(format!(
                        "sector {sector}: record at offset {offset} runs past write offset {}",
                        arena.write_offset()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl<K> SectoredCache for PackedLruCache<K>
where
    K: Eq + Hash,
{
    fn sector_count(&self) -> usize {
        PackedLruCache::sector_count(self)
    }

    fn sector_max_item(&self) -> usize {
        PackedLruCache::sector_max_item(self)
    }

    fn sector_len(&self, sector: usize) -> Option<usize> {
        PackedLruCache::sector_len(self, sector)
    }

    fn len(&self) -> usize {
        PackedLruCache::len(self)
    }

    fn rotate(&mut self) {
        PackedLruCache::rotate(self);
    }

    fn clear(&mut self) {
        PackedLruCache::clear(self);
    }
}

#[cfg(feature = "metrics")]
impl<K> MetricsSnapshotProvider<SectorMetricsSnapshot> for PackedLruCache<K>
where
    K: Eq + Hash,
{
    fn snapshot(&self) -> SectorMetricsSnapshot {
        self.metrics.snapshot(self.len(), self.sector_count())
    }
}

#[cfg(feature = "metrics")]
impl<K> MetricsReset for PackedLruCache<K>
where
    K: Eq + Hash,
{
    fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn point_schema() -> Schema {
        Schema::new(vec![FieldType::Int32, FieldType::Float64], None).unwrap()
    }

    fn series_schema() -> Schema {
        Schema::new(vec![FieldType::Uint16], Some(FieldType::Int32)).unwrap()
    }

    fn series(head: u16, tail: &[i32]) -> Vec<FieldValue> {
        std::iter::once(FieldValue::Uint16(head))
            .chain(tail.iter().copied().map(FieldValue::Int32))
            .collect()
    }

    // ==============================================
    // Construction
    // ==============================================

    mod construction {
        use super::*;

        #[test]
        fn rejects_zero_sizes() {
            assert!(PackedLruCache::<u32>::try_new(point_schema(), 0, 10, 4).is_err());
            assert!(PackedLruCache::<u32>::try_new(point_schema(), 64, 0, 4).is_err());
            assert!(PackedLruCache::<u32>::try_new(point_schema(), 64, 10, 0).is_err());
        }

        #[test]
        fn rejects_arena_smaller_than_one_record() {
            let err = PackedLruCache::<u32>::try_new(point_schema(), 11, 10, 4).unwrap_err();
            assert!(err.message().contains("12 bytes"));
        }

        #[test]
        fn exposes_configuration() {
            let cache: PackedLruCache<u32> = PackedLruCache::new(series_schema(), 128, 10, 3);
            assert_eq!(cache.sector_buffer_size(), 128);
            assert_eq!(cache.sector_max_item(), 10);
            assert_eq!(cache.sector_count(), 3);
            assert_eq!(cache.schema().min_item_size(), 4);
            assert_eq!(cache.write_offset(), 0);
            assert!(cache.is_empty());
        }
    }

    // ==============================================
    // Insert and Lookup
    // ==============================================

    mod insert_and_get {
        use super::*;

        #[test]
        fn round_trips_fixed_fields() {
            let mut cache = PackedLruCache::new(point_schema(), 256, 10, 2);
            let values = [FieldValue::Int32(-17), FieldValue::Float64(0.1)];
            cache.insert("p", &values).unwrap();
            assert_eq!(cache.get(&"p"), Some(values.to_vec()));
            assert_eq!(cache.write_offset(), 12);
        }

        #[test]
        fn round_trips_empty_variable_part() {
            let mut cache = PackedLruCache::new(series_schema(), 256, 10, 2);
            cache.insert("s", &series(3, &[])).unwrap();
            assert_eq!(cache.get(&"s"), Some(series(3, &[])));
            assert_eq!(cache.write_offset(), 4);
        }

        #[test]
        fn float32_field_rounds_once() {
            let schema = Schema::new(vec![FieldType::Float32], None).unwrap();
            let mut cache = PackedLruCache::new(schema, 64, 10, 2);
            cache.insert(1u8, &[FieldValue::Float64(0.1)]).unwrap();
            assert_eq!(cache.get(&1), Some(vec![FieldValue::Float32(0.1f64 as f32)]));
        }

        #[test]
        fn miss_returns_none() {
            let mut cache: PackedLruCache<&str> = PackedLruCache::new(point_schema(), 64, 10, 2);
            assert_eq!(cache.get(&"nope"), None);
            assert_eq!(cache.peek(&"nope"), None);
            assert!(!cache.contains(&"nope"));
        }
    }

    // ==============================================
    // Rejection
    // ==============================================

    mod rejection {
        use super::*;

        #[test]
        fn missing_fields_are_rejected() {
            let mut cache = PackedLruCache::new(point_schema(), 64, 10, 2);
            let err = cache.insert("p", &[FieldValue::Int32(1)]).unwrap_err();
            assert_eq!(err, InsertError::MissingFields { expected: 2, got: 1 });
            assert!(cache.is_empty());
        }

        #[test]
        fn surplus_values_without_variable_field_are_rejected() {
            let mut cache = PackedLruCache::new(point_schema(), 64, 10, 2);
            let values = [
                FieldValue::Int32(1),
                FieldValue::Float64(2.0),
                FieldValue::Float64(3.0),
            ];
            assert!(matches!(
                cache.insert("p", &values),
                Err(InsertError::TooManyFields { max: 2, got: 3 })
            ));
        }

        #[test]
        fn too_large_leaves_cache_untouched() {
            let mut cache = PackedLruCache::new(series_schema(), 16, 10, 2);
            cache.insert("small", &series(1, &[1])).unwrap();
            let offset = cache.write_offset();

            let err = cache.insert("big", &series(1, &[1, 2, 3, 4])).unwrap_err();
            assert_eq!(err, InsertError::TooLarge { size: 20, capacity: 16 });
            assert_eq!(cache.write_offset(), offset);
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.sector_len(1), Some(0));
        }

        #[test]
        fn out_of_range_integer_is_rejected() {
            let mut cache = PackedLruCache::new(series_schema(), 64, 10, 2);
            let values = [FieldValue::Int32(70_000)];
            assert_eq!(
                cache.insert("s", &values),
                Err(InsertError::OutOfRange {
                    index: 0,
                    field: FieldType::Uint16
                })
            );
        }
    }

    // ==============================================
    // Arena Reuse
    // ==============================================

    mod reuse {
        use super::*;

        #[test]
        fn same_size_rewrite_is_in_place() {
            let mut cache = PackedLruCache::new(series_schema(), 256, 10, 2);
            cache.insert("k", &series(1, &[1, 2])).unwrap();
            let offset = cache.write_offset();

            cache.insert("k", &series(2, &[3, 4])).unwrap();
            assert_eq!(cache.write_offset(), offset);
            assert_eq!(cache.sector_len(0), Some(1));
            assert_eq!(cache.get(&"k"), Some(series(2, &[3, 4])));
        }

        #[test]
        fn shrinking_rewrite_is_in_place() {
            let mut cache = PackedLruCache::new(series_schema(), 256, 10, 2);
            cache.insert("k", &series(1, &[1, 2, 3])).unwrap();
            let offset = cache.write_offset();

            cache.insert("k", &series(1, &[9])).unwrap();
            assert_eq!(cache.write_offset(), offset);
            assert_eq!(cache.get(&"k"), Some(series(1, &[9])));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn growing_rewrite_appends() {
            let mut cache = PackedLruCache::new(series_schema(), 256, 10, 2);
            cache.insert("k", &series(1, &[1])).unwrap();
            cache.insert("k", &series(1, &[1, 2])).unwrap();
            assert_eq!(cache.write_offset(), 8 + 12);
            assert_eq!(cache.sector_len(0), Some(1));
            assert_eq!(cache.get(&"k"), Some(series(1, &[1, 2])));
        }

        #[test]
        fn full_arena_triggers_rotation() {
            let mut cache = PackedLruCache::new(point_schema(), 24, 100, 3);
            cache.insert(1u32, &[1i32.into(), 1.0f64.into()]).unwrap();
            cache.insert(2u32, &[2i32.into(), 2.0f64.into()]).unwrap();
            assert_eq!(cache.write_offset(), 24);

            cache.insert(3u32, &[3i32.into(), 3.0f64.into()]).unwrap();
            assert_eq!(cache.write_offset(), 12);
            assert_eq!(cache.sector_len(0), Some(1));
            assert_eq!(cache.sector_len(1), Some(2));
        }

        #[test]
        fn write_budget_triggers_rotation() {
            let mut cache = PackedLruCache::new(point_schema(), 1_024, 2, 3);
            for key in 0u32..3 {
                cache.insert(key, &[(key as i32).into(), 0.0f64.into()]).unwrap();
            }
            assert_eq!(cache.sector_len(0), Some(1));
            assert_eq!(cache.sector_len(1), Some(2));
        }

        #[test]
        fn recycled_arena_does_not_leak_stale_records() {
            let mut cache = PackedLruCache::new(point_schema(), 24, 100, 2);
            cache.insert("old", &[7i32.into(), 7.0f64.into()]).unwrap();
            cache.rotate();
            cache.rotate();
            assert!(!cache.contains(&"old"));

            cache.insert("new", &[8i32.into(), 8.0f64.into()]).unwrap();
            assert_eq!(cache.write_offset(), 12);
            assert_eq!(cache.get(&"old"), None);
            assert_eq!(
                cache.get(&"new"),
                Some(vec![FieldValue::Int32(8), FieldValue::Float64(8.0)])
            );
        }
    }

    // ==============================================
    // Promotion and Removal
    // ==============================================

    mod promotion {
        use super::*;

        #[test]
        fn cold_hit_is_reencoded_into_hot_arena() {
            let mut cache = PackedLruCache::new(series_schema(), 256, 10, 3);
            cache.insert("k", &series(5, &[10, 20])).unwrap();
            cache.rotate();
            assert_eq!(cache.write_offset(), 0);

            assert_eq!(cache.get(&"k"), Some(series(5, &[10, 20])));
            assert_eq!(cache.sector_len(0), Some(1));
            assert_eq!(cache.sector_len(1), Some(0));
            assert_eq!(cache.write_offset(), 12);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn promotion_survives_rotation_it_triggers() {
            let mut cache = PackedLruCache::new(point_schema(), 12, 100, 2);
            cache.insert("a", &[1i32.into(), 1.0f64.into()]).unwrap();
            cache.insert("b", &[2i32.into(), 2.0f64.into()]).unwrap();
            // a is now in the coldest sector and the hot arena is full

            assert_eq!(
                cache.get(&"a"),
                Some(vec![FieldValue::Int32(1), FieldValue::Float64(1.0)])
            );
            assert_eq!(cache.sector_len(0), Some(1));
            assert!(cache.contains(&"b"));
            assert_eq!(
                cache.peek(&"a"),
                Some(vec![FieldValue::Int32(1), FieldValue::Float64(1.0)])
            );
        }

        #[test]
        fn peek_does_not_promote() {
            let mut cache = PackedLruCache::new(point_schema(), 64, 10, 2);
            cache.insert("a", &[1i32.into(), 1.0f64.into()]).unwrap();
            cache.rotate();
            assert!(cache.peek(&"a").is_some());
            assert_eq!(cache.sector_len(1), Some(1));
        }

        #[test]
        fn remove_is_exhaustive() {
            let mut cache = PackedLruCache::new(point_schema(), 64, 10, 3);
            cache.insert("a", &[1i32.into(), 1.0f64.into()]).unwrap();
            cache.rotate();
            cache.insert("a", &[2i32.into(), 2.0f64.into()]).unwrap();
            assert_eq!(cache.len(), 2);

            assert!(cache.remove(&"a"));
            assert!(cache.is_empty());
            assert!(!cache.remove(&"a"));
        }

        #[test]
        fn clear_rewinds_cursor() {
            let mut cache = PackedLruCache::new(point_schema(), 64, 10, 2);
            cache.insert("a", &[1i32.into(), 1.0f64.into()]).unwrap();
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.write_offset(), 0);
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn counts_rewrites_and_rejections() {
            let mut cache = PackedLruCache::new(point_schema(), 64, 10, 2);
            cache.insert("a", &[1i32.into(), 1.0f64.into()]).unwrap();
            cache.insert("a", &[2i32.into(), 2.0f64.into()]).unwrap();
            let _ = cache.insert("b", &[1i32.into()]);

            let snap = cache.snapshot();
            assert_eq!(snap.insert_calls, 3);
            assert_eq!(snap.insert_new, 1);
            assert_eq!(snap.in_place_rewrites, 1);
            assert_eq!(snap.insert_rejected, 1);
        }
    }
}
