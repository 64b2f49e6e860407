//! Byte layout of packed records.
//!
//! A [`Schema`] is an ordered list of fixed-width fields, optionally followed
//! by one variable-length field repeated any number of times. It is immutable
//! once built and drives encoding, decoding and size accounting for the
//! [`PackedLruCache`](crate::policy::packed::PackedLruCache).
//!
//! ## Record Layout
//!
//! ```text
//!   offset ──►┌──────────┬──────────┬─────┬──────────┬───────────┬──────┬──────┬─────┐
//!             │ fixed[0] │ fixed[1] │ ... │ fixed[n] │ count:u16 │ v[0] │ v[1] │ ... │
//!             └──────────┴──────────┴─────┴──────────┴───────────┴──────┴──────┴─────┘
//!             ◄──────────────── min_item_size ──────────────────►
//!                                         (count only present with a variable field)
//! ```
//!
//! All multi-byte values are big-endian. Because the variable count sits at a
//! fixed distance from the record start, the size of an existing record can
//! be recovered from the arena alone (see [`Schema::entry_size`]), so no
//! separate length table is needed.
//!
//! ## Example
//!
//! ```
//! use sectorkit::schema::{FieldValue, Schema};
//!
//! let schema = Schema::parse(&["uint16", "double"], Some("int8")).unwrap();
//! assert_eq!(schema.min_item_size(), 2 + 8 + 2);
//!
//! let values = [
//!     FieldValue::Uint16(7),
//!     FieldValue::Float64(1.5),
//!     FieldValue::Int8(-1),
//!     FieldValue::Int8(2),
//! ];
//! let size = schema.measure(&values).unwrap();
//! assert_eq!(size, 14);
//!
//! let mut buf = vec![0u8; size];
//! schema.encode(&mut buf, &values);
//!
//! let mut out = Vec::new();
//! assert_eq!(schema.decode_into(&buf, 0, &mut out), Some(size));
//! assert_eq!(out, values);
//! ```

mod field;

pub use field::{FieldType, FieldValue};

use crate::error::{ConfigError, InsertError};

/// Width of the variable-field count prefix.
pub const COUNT_SIZE: usize = 2;

/// Immutable record layout for a packed cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldType>,
    var_field: Option<FieldType>,
    min_item_size: usize,
}

impl Schema {
    /// Builds a schema from fixed field kinds and an optional variable field.
    ///
    /// Fails if `fields` is empty.
    pub fn new(fields: Vec<FieldType>, var_field: Option<FieldType>) -> Result<Self, ConfigError> {
        if fields.is_empty() {
            return Err(ConfigError::new(
                "schema needs a non-empty list of fixed field types",
            ));
        }

        let fixed: usize = fields.iter().map(|ty| ty.size()).sum();
        let min_item_size = fixed + if var_field.is_some() { COUNT_SIZE } else { 0 };

        Ok(Self {
            fields,
            var_field,
            min_item_size,
        })
    }

    /// Builds a schema from type names (`"int8"`, `"uint32"`, `"float"`,
    /// `"double"`, ...).
    pub fn parse(fields: &[&str], var_field: Option<&str>) -> Result<Self, ConfigError> {
        let fields = fields
            .iter()
            .map(|name| name.parse::<FieldType>())
            .collect::<Result<Vec<_>, _>>()?;
        let var_field = var_field
            .map(|name| {
                name.parse::<FieldType>().map_err(|err| {
                    ConfigError::new(format!("{} (variable field)", err.message()))
                })
            })
            .transpose()?;
        Self::new(fields, var_field)
    }

    /// Fixed field kinds, in record order.
    #[inline]
    pub fn fields(&self) -> &[FieldType] {
        &self.fields
    }

    /// The repeated trailing field, if any.
    #[inline]
    pub fn var_field(&self) -> Option<FieldType> {
        self.var_field
    }

    /// Bytes used by a record with zero variable entries.
    #[inline]
    pub fn min_item_size(&self) -> usize {
        self.min_item_size
    }

    /// Bytes used by a record with `var_count` variable entries.
    #[inline]
    pub fn item_size(&self, var_count: usize) -> usize {
        match self.var_field {
            Some(ty) => self.min_item_size + var_count * ty.size(),
            None => self.min_item_size,
        }
    }

    /// Largest number of values a single record may carry.
    pub fn max_values(&self) -> usize {
        match self.var_field {
            Some(_) => self.fields.len() + u16::MAX as usize,
            None => self.fields.len(),
        }
    }

    /// Validates `values` against the schema and returns the encoded size.
    ///
    /// Checks value count and integer ranges; arena capacity is the caller's
    /// concern.
    pub fn measure(&self, values: &[FieldValue]) -> Result<usize, InsertError> {
        let fixed = self.fields.len();
        if values.len() < fixed {
            return Err(InsertError::MissingFields {
                expected: fixed,
                got: values.len(),
            });
        }
        if values.len() > self.max_values() {
            return Err(InsertError::TooManyFields {
                max: self.max_values(),
                got: values.len(),
            });
        }

        let (fixed_values, var_values) = values.split_at(fixed);
        for (index, (ty, value)) in self.fields.iter().zip(fixed_values).enumerate() {
            if !ty.accepts(*value) {
                return Err(InsertError::OutOfRange { index, field: *ty });
            }
        }
        if let Some(ty) = self.var_field {
            for (offset, value) in var_values.iter().enumerate() {
                if !ty.accepts(*value) {
                    return Err(InsertError::OutOfRange {
                        index: fixed + offset,
                        field: ty,
                    });
                }
            }
        }

        Ok(self.item_size(var_values.len()))
    }

    /// Encodes `values` at the start of `out`.
    ///
    /// `values` must have passed [`measure`](Self::measure) and `out` must be
    /// at least that many bytes long. Returns the number of bytes written.
    pub fn encode(&self, out: &mut [u8], values: &[FieldValue]) -> usize {
        let (fixed_values, var_values) = values.split_at(self.fields.len());
        let mut cursor = 0;

        for (ty, value) in self.fields.iter().zip(fixed_values) {
            let end = cursor + ty.size();
            ty.write(&mut out[cursor..end], *value);
            cursor = end;
        }

        if let Some(ty) = self.var_field {
            let count = var_values.len() as u16;
            out[cursor..cursor + COUNT_SIZE].copy_from_slice(&count.to_be_bytes());
            cursor += COUNT_SIZE;

            for value in var_values {
                let end = cursor + ty.size();
                ty.write(&mut out[cursor..end], *value);
                cursor = end;
            }
        }

        cursor
    }

    /// Decodes the record at `offset` in `arena`, appending to `out`.
    ///
    /// `out` is cleared first. Returns the record size, or `None` if the
    /// record would run past the end of `arena`.
    pub fn decode_into(
        &self,
        arena: &[u8],
        offset: usize,
        out: &mut Vec<FieldValue>,
    ) -> Option<usize> {
        out.clear();
        let mut cursor = offset;

        for ty in &self.fields {
            out.push(ty.read(arena.get(cursor..)?)?);
            cursor += ty.size();
        }

        if let Some(ty) = self.var_field {
            let count = read_count(arena, cursor)?;
            cursor += COUNT_SIZE;
            out.reserve(count);

            for _ in 0..count {
                out.push(ty.read(arena.get(cursor..)?)?);
                cursor += ty.size();
            }
        }

        Some(cursor - offset)
    }

    /// Size of the record already stored at `offset` in `arena`.
    ///
    /// Without a variable field this is always `min_item_size`; otherwise the
    /// count prefix is read back. Returns `None` if the count lies outside
    /// `arena`.
    pub fn entry_size(&self, arena: &[u8], offset: usize) -> Option<usize> {
        if self.var_field.is_none() {
            return Some(self.min_item_size);
        }
        let count = read_count(arena, offset + self.min_item_size - COUNT_SIZE)?;
        Some(self.item_size(count))
    }
}

#[inline]
fn read_count(arena: &[u8], at: usize) -> Option<usize> {
    let bytes: [u8; COUNT_SIZE] = arena.get(at..at + COUNT_SIZE)?.try_into().ok()?;
    Some(u16::from_be_bytes(bytes) as usize)
}
