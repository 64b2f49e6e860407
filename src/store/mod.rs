pub mod arena;

pub use arena::ArenaSector;
