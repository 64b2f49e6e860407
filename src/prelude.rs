pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::ds::{Sector, SectorRing};
pub use crate::error::{ConfigError, InsertError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::SectorMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};
pub use crate::policy::packed::PackedLruCache;
pub use crate::policy::sector_lru::SectorLruCache;
pub use crate::policy::sector_ttl::SectorTtlCache;
pub use crate::schema::{FieldType, FieldValue, Schema};
pub use crate::traits::{CoreCache, SectoredCache};
