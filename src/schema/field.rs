//! Field kinds and typed values stored in packed records.
//!
//! Every [`FieldType`] has a fixed wire width and is written big-endian.
//! [`FieldValue`] is the typed value handed to and returned from the packed
//! cache; a value of any kind may be written into a field of any kind as long
//! as it is representable there (integers are range-checked, floats written
//! into integer fields are truncated toward zero, anything written into a
//! `float32` field is rounded to `f32` precision).

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Numeric kind of a packed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl FieldType {
    /// All supported kinds, smallest first.
    pub const ALL: [FieldType; 8] = [
        FieldType::Int8,
        FieldType::Uint8,
        FieldType::Int16,
        FieldType::Uint16,
        FieldType::Int32,
        FieldType::Uint32,
        FieldType::Float32,
        FieldType::Float64,
    ];

    /// Wire width in bytes.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            FieldType::Int8 | FieldType::Uint8 => 1,
            FieldType::Int16 | FieldType::Uint16 => 2,
            FieldType::Int32 | FieldType::Uint32 | FieldType::Float32 => 4,
            FieldType::Float64 => 8,
        }
    }

    /// Canonical lowercase name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::Int8 => "int8",
            FieldType::Uint8 => "uint8",
            FieldType::Int16 => "int16",
            FieldType::Uint16 => "uint16",
            FieldType::Int32 => "int32",
            FieldType::Uint32 => "uint32",
            FieldType::Float32 => "float32",
            FieldType::Float64 => "float64",
        }
    }

    #[inline]
    const fn int_bounds(self) -> Option<(i64, i64)> {
        match self {
            FieldType::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            FieldType::Uint8 => Some((0, u8::MAX as i64)),
            FieldType::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            FieldType::Uint16 => Some((0, u16::MAX as i64)),
            FieldType::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            FieldType::Uint32 => Some((0, u32::MAX as i64)),
            FieldType::Float32 | FieldType::Float64 => None,
        }
    }

    /// Returns `true` if `value` can be written into a field of this kind.
    pub fn accepts(self, value: FieldValue) -> bool {
        match self.int_bounds() {
            None => true,
            Some((min, max)) => value
                .integral()
                .is_some_and(|int| (min..=max).contains(&int)),
        }
    }

    /// Writes `value` into `out`, which must be exactly [`size`](Self::size)
    /// bytes long. The caller has already checked [`accepts`](Self::accepts).
    pub(crate) fn write(self, out: &mut [u8], value: FieldValue) {
        let int = value.integral().unwrap_or(0);
        match self {
            FieldType::Int8 => out.copy_from_slice(&(int as i8).to_be_bytes()),
            FieldType::Uint8 => out.copy_from_slice(&(int as u8).to_be_bytes()),
            FieldType::Int16 => out.copy_from_slice(&(int as i16).to_be_bytes()),
            FieldType::Uint16 => out.copy_from_slice(&(int as u16).to_be_bytes()),
            FieldType::Int32 => out.copy_from_slice(&(int as i32).to_be_bytes()),
            FieldType::Uint32 => out.copy_from_slice(&(int as u32).to_be_bytes()),
            FieldType::Float32 => out.copy_from_slice(&(value.as_f64() as f32).to_be_bytes()),
            FieldType::Float64 => out.copy_from_slice(&value.as_f64().to_be_bytes()),
        }
    }

    /// Reads a value of this kind from the start of `bytes`.
    ///
    /// Returns `None` if `bytes` is shorter than the field width.
    pub(crate) fn read(self, bytes: &[u8]) -> Option<FieldValue> {
        let value = match self {
            FieldType::Int8 => FieldValue::Int8(i8::from_be_bytes(take(bytes)?)),
            FieldType::Uint8 => FieldValue::Uint8(u8::from_be_bytes(take(bytes)?)),
            FieldType::Int16 => FieldValue::Int16(i16::from_be_bytes(take(bytes)?)),
            FieldType::Uint16 => FieldValue::Uint16(u16::from_be_bytes(take(bytes)?)),
            FieldType::Int32 => FieldValue::Int32(i32::from_be_bytes(take(bytes)?)),
            FieldType::Uint32 => FieldValue::Uint32(u32::from_be_bytes(take(bytes)?)),
            FieldType::Float32 => FieldValue::Float32(f32::from_be_bytes(take(bytes)?)),
            FieldType::Float64 => FieldValue::Float64(f64::from_be_bytes(take(bytes)?)),
        };
        Some(value)
    }
}

#[inline]
fn take<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int8" => Ok(FieldType::Int8),
            "uint8" => Ok(FieldType::Uint8),
            "int16" => Ok(FieldType::Int16),
            "uint16" => Ok(FieldType::Uint16),
            "int32" => Ok(FieldType::Int32),
            "uint32" => Ok(FieldType::Uint32),
            "float" | "float32" => Ok(FieldType::Float32),
            "double" | "float64" => Ok(FieldType::Float64),
            other => Err(ConfigError::new(format!("unknown field type: {other}"))),
        }
    }
}

/// A typed value read from or written to a packed record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Float32(f32),
    Float64(f64),
}

impl FieldValue {
    /// Returns the value widened to `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Int8(v) => v as f64,
            FieldValue::Uint8(v) => v as f64,
            FieldValue::Int16(v) => v as f64,
            FieldValue::Uint16(v) => v as f64,
            FieldValue::Int32(v) => v as f64,
            FieldValue::Uint32(v) => v as f64,
            FieldValue::Float32(v) => v as f64,
            FieldValue::Float64(v) => v,
        }
    }

    /// Integer view of the value; floats are truncated toward zero.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn integral(self) -> Option<i64> {
        match self {
            FieldValue::Int8(v) => Some(v as i64),
            FieldValue::Uint8(v) => Some(v as i64),
            FieldValue::Int16(v) => Some(v as i64),
            FieldValue::Uint16(v) => Some(v as i64),
            FieldValue::Int32(v) => Some(v as i64),
            FieldValue::Uint32(v) => Some(v as i64),
            FieldValue::Float32(v) => finite_trunc(v as f64),
            FieldValue::Float64(v) => finite_trunc(v),
        }
    }

    /// The kind this value decodes as.
    pub fn field_type(self) -> FieldType {
        match self {
            FieldValue::Int8(_) => FieldType::Int8,
            FieldValue::Uint8(_) => FieldType::Uint8,
            FieldValue::Int16(_) => FieldType::Int16,
            FieldValue::Uint16(_) => FieldType::Uint16,
            FieldValue::Int32(_) => FieldType::Int32,
            FieldValue::Uint32(_) => FieldType::Uint32,
            FieldValue::Float32(_) => FieldType::Float32,
            FieldValue::Float64(_) => FieldType::Float64,
        }
    }
}

#[inline]
fn finite_trunc(v: f64) -> Option<i64> {
    v.is_finite().then(|| v.trunc() as i64)
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                #[inline]
                fn from(v: $ty) -> Self {
                    FieldValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    f32 => Float32,
    f64 => Float64,
}
