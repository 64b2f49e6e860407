pub mod sector_ring;

pub use sector_ring::{Sector, SectorRing};
