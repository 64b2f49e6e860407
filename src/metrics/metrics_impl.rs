use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::SectorMetricsSnapshot;
use crate::metrics::traits::{
    CoreMetricsRecorder, SectorMetricsReadRecorder, SectorMetricsRecorder,
};

/// Counters owned by each sector cache.
#[derive(Debug, Default)]
pub struct SectorMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub insert_rejected: u64,
    pub in_place_rewrites: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub contains_calls: MetricsCell,
    pub contains_found: MetricsCell,
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
    pub rotations: u64,
    pub timer_rotations: u64,
    pub promotions: u64,
    pub evicted_entries: u64,
    pub clears: u64,
}

impl SectorMetrics {
    /// Copies the counters and attaches the given gauges.
    pub fn snapshot(&self, cache_len: usize, sector_count: usize) -> SectorMetricsSnapshot {
        SectorMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_calls: self.insert_calls,
            insert_new: self.insert_new,
            insert_updates: self.insert_updates,
            insert_rejected: self.insert_rejected,
            in_place_rewrites: self.in_place_rewrites,
            remove_calls: self.remove_calls,
            remove_found: self.remove_found,
            contains_calls: self.contains_calls.get(),
            contains_found: self.contains_found.get(),
            peek_calls: self.peek_calls.get(),
            peek_found: self.peek_found.get(),
            rotations: self.rotations,
            timer_rotations: self.timer_rotations,
            promotions: self.promotions,
            evicted_entries: self.evicted_entries,
            clears: self.clears,
            cache_len,
            sector_count,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl CoreMetricsRecorder for SectorMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }

    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl SectorMetricsRecorder for SectorMetrics {
    fn record_rotation(&mut self, evicted: usize) {
        self.rotations += 1;
        self.evicted_entries += evicted as u64;
    }

    fn record_timer_rotation(&mut self) {
        self.timer_rotations += 1;
    }

    fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    fn record_in_place_rewrite(&mut self) {
        self.in_place_rewrites += 1;
    }

    fn record_insert_rejected(&mut self) {
        self.insert_rejected += 1;
    }
}

impl SectorMetricsReadRecorder for SectorMetrics {
    fn record_contains_call(&self) {
        self.contains_calls.incr();
    }

    fn record_contains_found(&self) {
        self.contains_found.incr();
    }

    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_found(&self) {
        self.peek_found.incr();
    }
}
