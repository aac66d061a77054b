//! Value types for frame fields
//!
//! This module defines:
//! - Value: a closed enum over the eighteen registered types
//! - Uri: a string that carries an RFC 3986 scheme
//!
//! ## Type Rules
//!
//! - Each variant maps to exactly one [`TypeCode`] (see [`Value::type_code`])
//! - Unsigned types use native unsigned integers; there is no widening
//! - Different variants are never equal: `S32(1) != S64(1)`
//! - Float equality follows IEEE-754: `NaN != NaN`, `-0.0 == 0.0`

use crate::frame::Frame;
use crate::types::TypeCode;
use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use std::fmt;

/// A URI held in its string form
///
/// Only the scheme is validated; everything after the first `:` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri(String);

impl Uri {
    /// Parse a URI, requiring a scheme such as `http:` or `urn:`
    pub fn parse(s: &str) -> Option<Self> {
        if Uri::has_scheme(s) {
            Some(Uri(s.to_string()))
        } else {
            None
        }
    }

    /// Check for `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"` at the start
    pub fn has_scheme(s: &str) -> bool {
        let Some((scheme, _)) = s.split_once(':') else {
            return false;
        };
        let mut chars = scheme.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    }

    /// The scheme part, without the colon
    pub fn scheme(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }

    /// The full string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null (UDEF)
    Null,
    /// Opaque bytes (BYTEARRAY)
    Bytes(Vec<u8>),
    /// UTF-8 text (STRING)
    String(String),
    /// Signed 8-bit integer
    S8(i8),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Signed 16-bit integer
    S16(i16),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Signed 32-bit integer
    S32(i32),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 64-bit integer
    S64(i64),
    /// Unsigned 64-bit integer
    U64(u64),
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// Boolean (BOOLEANTYPE)
    Bool(bool),
    /// Milliseconds since the Unix epoch, UTC
    Date(i64),
    /// URI
    Uri(Uri),
    /// Anonymous elements, each independently typed
    Array(Vec<Value>),
    /// Nested frame
    Frame(Frame),
}

impl Value {
    /// The type code this variant encodes as by default
    pub fn type_code(&self) -> TypeCode {
        match self {
            Value::Null => TypeCode::Udef,
            Value::Bytes(_) => TypeCode::ByteArray,
            Value::String(_) => TypeCode::String,
            Value::S8(_) => TypeCode::S8,
            Value::U8(_) => TypeCode::U8,
            Value::S16(_) => TypeCode::S16,
            Value::U16(_) => TypeCode::U16,
            Value::S32(_) => TypeCode::S32,
            Value::U32(_) => TypeCode::U32,
            Value::S64(_) => TypeCode::S64,
            Value::U64(_) => TypeCode::U64,
            Value::Float(_) => TypeCode::Float,
            Value::Double(_) => TypeCode::Double,
            Value::Bool(_) => TypeCode::Boolean,
            Value::Date(_) => TypeCode::Date,
            Value::Uri(_) => TypeCode::Uri,
            Value::Array(_) => TypeCode::Array,
            Value::Frame(_) => TypeCode::Frame,
        }
    }

    /// Get the type tag as a string
    pub fn type_name(&self) -> &'static str {
        self.type_code().name()
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is an integer or floating point value
    pub fn is_numeric(&self) -> bool {
        self.type_code().is_numeric()
    }

    /// Check if this is a nested frame
    pub fn is_frame(&self) -> bool {
        matches!(self, Value::Frame(_))
    }

    /// Check if this is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// The mathematical value of an integer variant
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::S8(v) => Some(*v as i128),
            Value::U8(v) => Some(*v as i128),
            Value::S16(v) => Some(*v as i128),
            Value::U16(v) => Some(*v as i128),
            Value::S32(v) => Some(*v as i128),
            Value::U32(v) => Some(*v as i128),
            Value::S64(v) => Some(*v as i128),
            Value::U64(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &[u8] if this is a Bytes value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get as &Frame if this is a Frame value
    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Value::Frame(f) => Some(f),
            _ => None,
        }
    }

    /// Get as &mut Frame if this is a Frame value
    pub fn as_frame_mut(&mut self) -> Option<&mut Frame> {
        match self {
            Value::Frame(f) => Some(f),
            _ => None,
        }
    }

    /// Get as &[Value] if this is an Array value
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Build an integer value of the given type, truncating with
    /// two's-complement wrap-around when `n` is out of range
    ///
    /// Returns `None` when `code` is not an integer type.
    pub fn wrapping_from(code: TypeCode, n: i128) -> Option<Value> {
        let value = match code {
            TypeCode::S8 => Value::S8(n as i8),
            TypeCode::U8 => Value::U8(n as u8),
            TypeCode::S16 => Value::S16(n as i16),
            TypeCode::U16 => Value::U16(n as u16),
            TypeCode::S32 => Value::S32(n as i32),
            TypeCode::U32 => Value::U32(n as u32),
            TypeCode::S64 => Value::S64(n as i64),
            TypeCode::U64 => Value::U64(n as u64),
            _ => return None,
        };
        Some(value)
    }

    /// Build an integer value of the given type if `n` fits its range
    pub fn checked_from(code: TypeCode, n: i128) -> Option<Value> {
        let (min, max) = code.integer_range()?;
        if n < min || n > max {
            return None;
        }
        Value::wrapping_from(code, n)
    }

    /// DATE value as a chrono timestamp
    ///
    /// `None` for other variants and for millisecond counts chrono cannot
    /// represent.
    pub fn as_date_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(millis) => millis_to_date_time(*millis),
            _ => None,
        }
    }

    /// Scalar text form used by row-oriented storage
    ///
    /// Returns `None` for null and for composite values, which have no
    /// single-cell representation.
    pub fn to_text(&self) -> Option<String> {
        use base64::Engine as _;
        let text = match self {
            Value::Null | Value::Array(_) | Value::Frame(_) => return None,
            Value::Bytes(b) => base64::engine::general_purpose::STANDARD.encode(b),
            Value::String(s) => s.clone(),
            Value::S8(v) => v.to_string(),
            Value::U8(v) => v.to_string(),
            Value::S16(v) => v.to_string(),
            Value::U16(v) => v.to_string(),
            Value::S32(v) => v.to_string(),
            Value::U32(v) => v.to_string(),
            Value::S64(v) => v.to_string(),
            Value::U64(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Date(millis) => date_text(*millis),
            Value::Uri(u) => u.as_str().to_string(),
        };
        Some(text)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Array(_) | Value::Frame(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            other => match other.to_text() {
                Some(text) => f.write_str(&text),
                None => Ok(()),
            },
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar!(
    i8 => S8,
    u8 => U8,
    i16 => S16,
    u16 => U16,
    i32 => S32,
    u32 => U32,
    i64 => S64,
    u64 => U64,
    f32 => Float,
    f64 => Double,
    bool => Bool,
    String => String,
    Vec<u8> => Bytes,
    Uri => Uri,
    Vec<Value> => Array,
    Frame => Frame,
);

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d.timestamp_millis())
    }
}

pub(crate) fn millis_to_date_time(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// RFC 3339 with milliseconds for years 1 to 9999, decimal milliseconds
/// otherwise
pub(crate) fn date_text(millis: i64) -> String {
    match millis_to_date_time(millis) {
        Some(d) if (1..=9999).contains(&d.year()) => {
            d.to_rfc3339_opts(SecondsFormat::Millis, true)
        }
        _ => millis.to_string(),
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
