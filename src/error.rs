//! Error types for the sectorkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero sector count, empty schema, unknown field type).
//! - [`InsertError`]: Returned when the packed cache rejects a record
//!   (missing values, out-of-range values, record larger than an arena).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use sectorkit::error::ConfigError;
//! use sectorkit::policy::sector_lru::SectorLruCache;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache: Result<SectorLruCache<String, i32>, ConfigError> =
//!     SectorLruCache::try_new(1_000, 4);
//! assert!(cache.is_ok());
//!
//! // A ring needs at least one sector
//! let bad = SectorLruCache::<String, i32>::try_new(1_000, 0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

use crate::schema::FieldType;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by `check_invariants` methods (e.g.
/// [`PackedLruCache::check_invariants`](crate::policy::packed::PackedLruCache::check_invariants)).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`SectorLruCache::try_new`](crate::policy::sector_lru::SectorLruCache::try_new),
/// [`Schema::parse`](crate::schema::Schema::parse) and the
/// [`CacheBuilder`](crate::builder::CacheBuilder) `build_*` methods.
///
/// # Example
///
/// ```
/// use sectorkit::schema::Schema;
///
/// let err = Schema::parse(&["int32", "decimal"], None).unwrap_err();
/// assert!(err.to_string().contains("decimal"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InsertError
// ---------------------------------------------------------------------------

/// Error returned when a packed record is rejected by `insert`.
///
/// Every variant is detected before the cache is touched, so a rejected
/// insert leaves all sectors and arenas exactly as they were.
///
/// # Example
///
/// ```
/// use sectorkit::error::InsertError;
/// use sectorkit::policy::packed::PackedLruCache;
/// use sectorkit::schema::{FieldValue, Schema};
///
/// let schema = Schema::parse(&["uint8", "uint8"], None).unwrap();
/// let mut cache = PackedLruCache::new(schema, 64, 16, 2);
///
/// let err = cache.insert("k", &[FieldValue::Uint8(1)]).unwrap_err();
/// assert_eq!(err, InsertError::MissingFields { expected: 2, got: 1 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertError {
    /// Fewer values than the schema has fixed fields.
    MissingFields { expected: usize, got: usize },
    /// More values than the schema can hold.
    TooManyFields { max: usize, got: usize },
    /// A value cannot be represented by the integer field at `index`.
    OutOfRange { index: usize, field: FieldType },
    /// The encoded record does not fit in one arena.
    TooLarge { size: usize, capacity: usize },
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::MissingFields { expected, got } => {
                write!(f, "missing fields: expected at least {expected} values, got {got}")
            },
            InsertError::TooManyFields { max, got } => {
                write!(f, "too many fields: at most {max} values allowed, got {got}")
            },
            InsertError::OutOfRange { index, field } => {
                write!(f, "value at index {index} is out of range for {field}")
            },
            InsertError::TooLarge { size, capacity } => {
                write!(f, "item too large: {size} bytes exceeds arena capacity of {capacity}")
            },
        }
    }
}

impl std::error::Error for InsertError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("offset past write cursor");
        assert_eq!(err.to_string(), "offset past write cursor");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("sector_count must be > 0");
        assert_eq!(err.to_string(), "sector_count must be > 0");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.message(), "x");
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }

    // -- InsertError ------------------------------------------------------

    #[test]
    fn insert_missing_fields_display() {
        let err = InsertError::MissingFields {
            expected: 3,
            got: 1,
        };
        assert_eq!(
            err.to_string(),
            "missing fields: expected at least 3 values, got 1"
        );
    }

    #[test]
    fn insert_too_large_display() {
        let err = InsertError::TooLarge {
            size: 120,
            capacity: 100,
        };
        assert!(err.to_string().contains("120 bytes"));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn insert_out_of_range_names_field() {
        let err = InsertError::OutOfRange {
            index: 2,
            field: FieldType::Uint8,
        };
        assert_eq!(err.to_string(), "value at index 2 is out of range for uint8");
    }

    #[test]
    fn insert_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InsertError>();
    }
}
