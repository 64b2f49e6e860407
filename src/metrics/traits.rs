//! # Metrics Trait Hierarchy
//!
//! Separates *recording*, *snapshotting* and *resetting* into small traits so
//! the cache code only ever sees the recorder side.
//!
//! ```text
//!                  ┌─────────────────────────────┐
//!                  │     CoreMetricsRecorder     │
//!                  │  get hit/miss, insert,      │
//!                  │  remove, clear              │
//!                  └──────────────┬──────────────┘
//!                                 │
//!                                 ▼
//!                  ┌─────────────────────────────┐
//!                  │    SectorMetricsRecorder    │
//!                  │  rotation, promotion,       │
//!                  │  rewrite, rejection         │
//!                  └─────────────────────────────┘
//!
//!   Read-only paths:   SectorMetricsReadRecorder (&self, interior mutability)
//!   Consumption:       MetricsSnapshotProvider<S>, MetricsReset
//! ```

/// Counters common to every cache.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_remove_call(&mut self);
    fn record_remove_found(&mut self);
    fn record_clear(&mut self);
}

/// Counters specific to generational rotation.
pub trait SectorMetricsRecorder: CoreMetricsRecorder {
    /// A rotation dropped the coldest generation holding `evicted` entries.
    fn record_rotation(&mut self, evicted: usize);
    /// A rotation was triggered by the expiration timer.
    fn record_timer_rotation(&mut self);
    /// A cold hit was moved into the hot sector.
    fn record_promotion(&mut self);
    /// A packed record was rewritten at its existing offset.
    fn record_in_place_rewrite(&mut self);
    /// A packed record was rejected.
    fn record_insert_rejected(&mut self);
}

/// Recorder for `&self` methods.
pub trait SectorMetricsReadRecorder {
    fn record_contains_call(&self);
    fn record_contains_found(&self);
    fn record_peek_call(&self);
    fn record_peek_found(&self);
}

/// Produces a point-in-time copy of a cache's metrics.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Resets metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}
