//! Typed values reconstructed by the decompiler

use glam::{Mat4, Vec3, Vec4};
use serde::Serialize;

use crate::formats::common::HashNames;

/// Pool words whose float reading lies beyond this magnitude are integers
pub const FLOAT_MAGNITUDE_LIMIT: f32 = 100_000.0;

/// A value on the VM stack or stored in a variable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    Float(f32),
    /// Integer literal or hash
    U32(u32),
    Short(i16),
    Byte(u8),
    Bool(bool),
    Vec3(Vec3),
    Vec4(Vec4),
    Matrix(Mat4),
    String(String),
    /// Raw argument list of a command that is not decoded
    Opaque(Vec<TypedValue>),
}

impl TypedValue {
    /// Numeric reading used when a command consumes the value as a float
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            Self::U32(v) => Some(*v as f32),
            Self::Short(v) => Some(f32::from(*v)),
            Self::Byte(v) => Some(f32::from(*v)),
            _ => None,
        }
    }

    /// Narrow to a 16-bit store
    #[must_use]
    pub fn to_short(&self) -> Self {
        match self {
            Self::Float(f) => Self::Short(*f as i16),
            Self::U32(v) => Self::Short(*v as i16),
            Self::Byte(v) => Self::Short(i16::from(*v)),
            other => other.clone(),
        }
    }

    /// Narrow to an 8-bit store
    #[must_use]
    pub fn to_byte(&self) -> Self {
        match self {
            Self::Float(f) => Self::Byte(*f as u8),
            Self::U32(v) => Self::Byte(*v as u8),
            Self::Short(v) => Self::Byte(*v as u8),
            other => other.clone(),
        }
    }

    /// The 32-bit pool words this value would occupy, one per component
    #[must_use]
    pub fn pool_words(&self) -> Option<Vec<u32>> {
        match self {
            Self::Float(f) => Some(vec![f.to_bits()]),
            Self::U32(v) => Some(vec![*v]),
            Self::Vec3(v) => Some(v.to_array().iter().map(|f| f.to_bits()).collect()),
            Self::Vec4(v) => Some(v.to_array().iter().map(|f| f.to_bits()).collect()),
            Self::Matrix(m) => Some(m.to_cols_array().iter().map(|f| f.to_bits()).collect()),
            _ => None,
        }
    }

    /// Short name of the variant
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::U32(_) => "uint",
            Self::Short(_) => "short",
            Self::Byte(_) => "byte",
            Self::Bool(_) => "bool",
            Self::Vec3(_) => "Vec3",
            Self::Vec4(_) => "Vec4",
            Self::Matrix(_) => "Matrix4x4",
            Self::String(_) => "string",
            Self::Opaque(_) => "opaque",
        }
    }
}

/// Decide whether a pool word is a float or an integer/hash.
///
/// A known hash is always an integer. Otherwise the word is an integer if
/// its float reading is strictly beyond +/-100000, and a float if not (NaN
/// included).
#[must_use]
pub fn classify_pool_word(bits: u32, names: &HashNames) -> TypedValue {
    if names.contains(bits) {
        return TypedValue::U32(bits);
    }
    let f = f32::from_bits(bits);
    if f > FLOAT_MAGNITUDE_LIMIT || f < -FLOAT_MAGNITUDE_LIMIT {
        TypedValue::U32(bits)
    } else {
        TypedValue::Float(f)
    }
}
