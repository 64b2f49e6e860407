//! Optional counters for the sector caches (`metrics` feature).
//!
//! Recording, snapshotting and resetting are split into small traits (see
//! [`traits`]). Each cache owns a [`SectorMetrics`](metrics_impl::SectorMetrics)
//! and exposes it through
//! [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider).

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
