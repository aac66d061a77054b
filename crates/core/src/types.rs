//! Type codes and descriptors
//!
//! This module defines:
//! - TypeCode: the eighteen value types a frame field may carry
//! - TypeDescriptor: immutable metadata (code, tag, width, numeric flag)
//!
//! ## Type Code Values
//!
//! These values are part of the wire and persistence format and MUST NOT change
//! without a format version bump:
//!
//! | Code | Type        | Tag   | Width    |
//! |------|-------------|-------|----------|
//! | 0    | FRAME       | FRAME | variable |
//! | 1    | UDEF        | UDEF  | 0        |
//! | 2    | BYTEARRAY   | BYTE  | variable |
//! | 3    | STRING      | STR   | variable |
//! | 4-11 | S8..U64     | S8..  | 1/2/4/8  |
//! | 12   | FLOAT       | FLT   | 4        |
//! | 13   | DOUBLE      | DBL   | 8        |
//! | 14   | BOOLEANTYPE | BOL   | 1        |
//! | 15   | DATE        | DAT   | 8        |
//! | 16   | URI         | URI   | variable |
//! | 17   | ARRAY       | ARY   | variable |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminates the value types of the frame format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeCode {
    /// Nested frame
    Frame = 0,
    /// Explicit null / undefined, zero-length payload
    Udef = 1,
    /// Opaque bytes
    ByteArray = 2,
    /// UTF-8 text without terminator
    String = 3,
    /// Signed 8-bit integer
    S8 = 4,
    /// Unsigned 8-bit integer
    U8 = 5,
    /// Signed 16-bit integer
    S16 = 6,
    /// Unsigned 16-bit integer
    U16 = 7,
    /// Signed 32-bit integer
    S32 = 8,
    /// Unsigned 32-bit integer
    U32 = 9,
    /// Signed 64-bit integer
    S64 = 10,
    /// Unsigned 64-bit integer
    U64 = 11,
    /// IEEE-754 single precision
    Float = 12,
    /// IEEE-754 double precision
    Double = 13,
    /// Boolean stored as one byte
    Boolean = 14,
    /// Milliseconds since the Unix epoch
    Date = 15,
    /// URI in its string form
    Uri = 16,
    /// Sequence of anonymous elements
    Array = 17,
}

impl TypeCode {
    /// All type codes, in code order
    pub const ALL: [TypeCode; 18] = [
        TypeCode::Frame,
        TypeCode::Udef,
        TypeCode::ByteArray,
        TypeCode::String,
        TypeCode::S8,
        TypeCode::U8,
        TypeCode::S16,
        TypeCode::U16,
        TypeCode::S32,
        TypeCode::U32,
        TypeCode::S64,
        TypeCode::U64,
        TypeCode::Float,
        TypeCode::Double,
        TypeCode::Boolean,
        TypeCode::Date,
        TypeCode::Uri,
        TypeCode::Array,
    ];

    /// Convert to byte representation
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Try to create from byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        TypeCode::ALL.get(byte as usize).copied()
    }

    /// Short tag used in diagnostics and lookups
    pub fn name(&self) -> &'static str {
        match self {
            TypeCode::Frame => "FRAME",
            TypeCode::Udef => "UDEF",
            TypeCode::ByteArray => "BYTE",
            TypeCode::String => "STR",
            TypeCode::S8 => "S8",
            TypeCode::U8 => "U8",
            TypeCode::S16 => "S16",
            TypeCode::U16 => "U16",
            TypeCode::S32 => "S32",
            TypeCode::U32 => "U32",
            TypeCode::S64 => "S64",
            TypeCode::U64 => "U64",
            TypeCode::Float => "FLT",
            TypeCode::Double => "DBL",
            TypeCode::Boolean => "BOL",
            TypeCode::Date => "DAT",
            TypeCode::Uri => "URI",
            TypeCode::Array => "ARY",
        }
    }

    /// Look up a type by its tag (case-insensitive)
    pub fn from_name(tag: &str) -> Option<Self> {
        TypeCode::ALL
            .iter()
            .copied()
            .find(|code| code.name().eq_ignore_ascii_case(tag))
    }

    /// Encoded width for fixed-size types, `None` for variable-length ones
    pub fn fixed_size(&self) -> Option<u32> {
        match self {
            TypeCode::Udef => Some(0),
            TypeCode::S8 | TypeCode::U8 | TypeCode::Boolean => Some(1),
            TypeCode::S16 | TypeCode::U16 => Some(2),
            TypeCode::S32 | TypeCode::U32 | TypeCode::Float => Some(4),
            TypeCode::S64 | TypeCode::U64 | TypeCode::Double | TypeCode::Date => Some(8),
            TypeCode::Frame
            | TypeCode::ByteArray
            | TypeCode::String
            | TypeCode::Uri
            | TypeCode::Array => None,
        }
    }

    /// True when the payload carries a length prefix
    pub fn is_variable(&self) -> bool {
        self.fixed_size().is_none()
    }

    /// True for integer and floating point types
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, TypeCode::Float | TypeCode::Double)
    }

    /// True for the eight integer types
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            TypeCode::S8
                | TypeCode::U8
                | TypeCode::S16
                | TypeCode::U16
                | TypeCode::S32
                | TypeCode::U32
                | TypeCode::S64
                | TypeCode::U64
        )
    }

    /// True for FRAME and ARRAY, whose values contain other values
    pub fn is_composite(&self) -> bool {
        matches!(self, TypeCode::Frame | TypeCode::Array)
    }

    /// Inclusive range of an integer type, `None` for other types
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        let range = match self {
            TypeCode::S8 => (i8::MIN as i128, i8::MAX as i128),
            TypeCode::U8 => (0, u8::MAX as i128),
            TypeCode::S16 => (i16::MIN as i128, i16::MAX as i128),
            TypeCode::U16 => (0, u16::MAX as i128),
            TypeCode::S32 => (i32::MIN as i128, i32::MAX as i128),
            TypeCode::U32 => (0, u32::MAX as i128),
            TypeCode::S64 => (i64::MIN as i128, i64::MAX as i128),
            TypeCode::U64 => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    /// Full descriptor for this type
    pub fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor {
            code: *self,
            name: self.name(),
            fixed_size: self.fixed_size(),
            is_numeric: self.is_numeric(),
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for TypeCode {
    type Error = crate::error::Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        TypeCode::from_byte(byte).ok_or(crate::error::Error::UnknownType(byte))
    }
}

/// Immutable metadata describing one registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeDescriptor {
    /// Stable wire code
    pub code: TypeCode,
    /// Short tag, e.g. "STR", "BOL", "FRAME"
    pub name: &'static str,
    /// Width in bytes for fixed-size types
    pub fixed_size: Option<u32>,
    /// Whether the type is an integer or floating point type
    pub is_numeric: bool,
}
