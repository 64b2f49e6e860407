pub mod packed;
pub mod sector_lru;
pub mod sector_ttl;
