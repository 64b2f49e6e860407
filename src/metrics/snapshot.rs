/// Point-in-time copy of a sector cache's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SectorMetricsSnapshot {
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

    pub contains_calls: u64,
    pub contains_found: u64,
    pub peek_calls: u64,
    pub peek_found: u64,

    pub rotations: u64,
    pub timer_rotations: u64,
    pub promotions: u64,
    pub evicted_entries: u64,
    pub clears: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub sector_count: usize,
}

impl SectorMetricsSnapshot {
    /// Fraction of `get` calls that hit, or `0.0` before the first call.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
