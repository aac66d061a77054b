//! Type registry
//!
//! The registry is the single entry point for per-type operations: lookup by
//! code or tag, type checking, payload encode/decode, and parsing of the scalar
//! text form used by row storage.
//!
//! ## Usage
//!
//! ```
//! use framestore_core::{registry, TypeCode, Value};
//!
//! let bytes = registry().encode(TypeCode::S16, &Value::S16(-32768)).unwrap();
//! assert_eq!(bytes, vec![0x80, 0x00]);
//!
//! // Integers are accepted by any integer type whose range holds them
//! assert!(registry().check_type(TypeCode::U8, &Value::S32(255)));
//! assert!(!registry().check_type(TypeCode::U8, &Value::S32(256)));
//! ```

use crate::codec::{decode_payload, encode_payload};
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::types::{TypeCode, TypeDescriptor};
use crate::value::{Uri, Value};
use chrono::DateTime;
use once_cell::sync::Lazy;
use std::borrow::Cow;

static DEFAULT_REGISTRY: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::default);

/// The process-wide registry with default [`Limits`]
pub fn registry() -> &'static TypeRegistry {
    &DEFAULT_REGISTRY
}

/// Per-type codec operations bound to a set of size limits
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    limits: Limits,
}

impl TypeRegistry {
    /// Create a registry with custom limits
    pub fn with_limits(limits: Limits) -> Self {
        TypeRegistry { limits }
    }

    /// Limits applied by this registry
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        TypeCode::ALL.len()
    }

    /// Always false; the registry is never empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All descriptors, in code order
    pub fn descriptors(&self) -> impl Iterator<Item = TypeDescriptor> {
        TypeCode::ALL.into_iter().map(|code| code.descriptor())
    }

    /// Look up a descriptor by wire code
    pub fn lookup(&self, code: u8) -> Result<TypeDescriptor> {
        TypeCode::try_from(code).map(|c| c.descriptor())
    }

    /// Look up a descriptor by tag, e.g. "STR"
    pub fn lookup_by_name(&self, tag: &str) -> Option<TypeDescriptor> {
        TypeCode::from_name(tag).map(|c| c.descriptor())
    }

    /// The type a value is given when no type is requested
    ///
    /// Variants are disjoint, so the value's own variant decides.
    pub fn type_of(&self, value: &Value) -> TypeCode {
        value.type_code()
    }

    /// Whether `value` may be encoded as `code`
    ///
    /// Exact variants are always accepted. In addition, any integer whose
    /// value fits the target integer range is accepted, and strings carrying
    /// a URI scheme are accepted as URI.
    pub fn check_type(&self, code: TypeCode, value: &Value) -> bool {
        if value.type_code() == code {
            return true;
        }
        if let (Some((min, max)), Some(n)) = (code.integer_range(), value.as_integer()) {
            return n >= min && n <= max;
        }
        matches!((code, value), (TypeCode::Uri, Value::String(s)) if Uri::has_scheme(s))
    }

    /// Convert `value` into the variant for `code`, failing if the type check rejects it
    pub fn coerce<'a>(&self, code: TypeCode, value: &'a Value) -> Result<Cow<'a, Value>> {
        if value.type_code() == code {
            return Ok(Cow::Borrowed(value));
        }
        if !self.check_type(code, value) {
            return Err(Error::encoding(
                code.name(),
                format!("type check rejected {} value {}", value.type_name(), value),
            ));
        }
        let converted = match (code, value) {
            (TypeCode::Uri, Value::String(s)) => Uri::parse(s).map(Value::Uri),
            _ => value
                .as_integer()
                .and_then(|n| Value::checked_from(code, n)),
        };
        converted.map(Cow::Owned).ok_or_else(|| {
            Error::encoding(code.name(), format!("cannot convert {}", value.type_name()))
        })
    }

    /// Encode the raw payload of `value` as `code`
    pub fn encode(&self, code: TypeCode, value: &Value) -> Result<Vec<u8>> {
        let value = self.coerce(code, value)?;
        encode_payload(code, &value, &self.limits, 0)
    }

    /// Decode a raw payload of type `code`
    pub fn decode(&self, code: TypeCode, bytes: &[u8]) -> Result<Value> {
        decode_payload(code, bytes, &self.limits, 0)
    }

    /// Parse the scalar text form produced by [`Value::to_text`]
    ///
    /// `None` text decodes to [`Value::Null`] for every type except STRING,
    /// where it is also null. Composite types accept JSON text.
    pub fn parse_text(&self, code: TypeCode, text: Option<&str>) -> Result<Value> {
        let Some(text) = text else {
            return Ok(Value::Null);
        };
        let reject = || Error::conversion("STR", code.name());

        let value = match code {
            TypeCode::Udef => Value::Null,
            TypeCode::String => Value::String(text.to_string()),
            TypeCode::Uri => Value::Uri(Uri::parse(text).ok_or_else(reject)?),
            TypeCode::ByteArray => {
                use base64::Engine as _;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(text.trim())
                    .map_err(|_| reject())?;
                Value::Bytes(bytes)
            }
            TypeCode::S8
            | TypeCode::U8
            | TypeCode::S16
            | TypeCode::U16
            | TypeCode::S32
            | TypeCode::U32
            | TypeCode::S64
            | TypeCode::U64 => {
                let n: i128 = text.trim().parse().map_err(|_| reject())?;
                Value::checked_from(code, n).ok_or_else(reject)?
            }
            TypeCode::Float => Value::Float(text.trim().parse().map_err(|_| reject())?),
            TypeCode::Double => Value::Double(text.trim().parse().map_err(|_| reject())?),
            TypeCode::Boolean => Value::Bool(parse_bool(text).ok_or_else(reject)?),
            TypeCode::Date => Value::Date(parse_date(text).ok_or_else(reject)?),
            TypeCode::Array => match crate::json::parse_value(text)? {
                array @ Value::Array(_) => array,
                _ => return Err(reject()),
            },
            TypeCode::Frame => Value::Frame(crate::frame::Frame::from_json(text)?),
        };
        Ok(value)
    }
}

/// "true"/"1" and "false"/"0", ignoring case and surrounding whitespace
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    let t = text.trim();
    if t.eq_ignore_ascii_case("true") || t == "1" {
        Some(true)
    } else if t.eq_ignore_ascii_case("false") || t == "0" {
        Some(false)
    } else {
        None
    }
}

/// Epoch milliseconds from RFC 3339 text or a bare integer count
pub(crate) fn parse_date(text: &str) -> Option<i64> {
    let t = text.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(t) {
        return Some(d.timestamp_millis());
    }
    t.parse::<i64>().ok()
}
