//! sectorkit: fixed-memory approximate-LRU caches built on sector rotation.
//!
//! Every cache here keeps a ring of sectors. Writes land in the hot sector;
//! when it has taken its write budget (or, for the TTL cache, when a timer
//! fires) the ring rotates, every generation moves one sector colder and the
//! coldest one is dropped whole. Reads that hit a cold sector move the entry
//! back to hot. No per-entry recency bookkeeping exists, so admission and
//! eviction are O(1) and memory is bounded up front.
//!
//! | Cache | Values | Rotation trigger |
//! |---|---|---|
//! | [`SectorLruCache`](policy::sector_lru::SectorLruCache) | any `V` | write budget |
//! | [`SectorTtlCache`](policy::sector_ttl::SectorTtlCache) | any `V` | timer + write budget |
//! | [`PackedLruCache`](policy::packed::PackedLruCache) | typed records in byte arenas | write budget + arena space |

pub mod builder;
pub mod clock;
pub mod ds;
pub mod error;
pub mod policy;
pub mod schema;
pub mod store;
pub mod traits;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
