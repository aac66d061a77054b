//! A single named or anonymous typed value
//!
//! Wire form: `name_len(1) + name + type(1) + payload`. A zero `name_len`
//! marks an anonymous field; an empty name is normalized to anonymous.

use crate::codec::{read_field, write_field};
use crate::error::Result;
use crate::limits::Limits;
use crate::registry::registry;
use crate::types::TypeCode;
use crate::value::Value;
use std::io::Cursor;

/// One entry of a [`Frame`](crate::Frame)
///
/// Cloning is deep: a nested frame is copied, never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: Option<String>,
    type_code: TypeCode,
    value: Value,
}

impl Field {
    /// Create a named field, typed by its value
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        Field {
            name: normalize(Some(name.into())),
            type_code: registry().type_of(&value),
            value,
        }
    }

    /// Create an anonymous field, as used for array elements
    pub fn anonymous(value: impl Into<Value>) -> Self {
        let value = value.into();
        Field {
            name: None,
            type_code: registry().type_of(&value),
            value,
        }
    }

    /// Create a field with an explicit type
    ///
    /// The value is coerced into the requested type (e.g. an in-range `S32`
    /// stored as `U8`); values the type check rejects are an encoding error.
    pub fn with_type(
        name: Option<String>,
        type_code: TypeCode,
        value: impl Into<Value>,
    ) -> Result<Self> {
        let value = value.into();
        if value.type_code() == type_code {
            return Ok(Field {
                name: normalize(name),
                type_code,
                value,
            });
        }
        let value = registry().coerce(type_code, &value)?.into_owned();
        Ok(Field {
            name: normalize(name),
            type_code,
            value,
        })
    }

    pub(crate) fn with_type_unchecked(
        name: Option<String>,
        type_code: TypeCode,
        value: Value,
    ) -> Self {
        Field {
            name,
            type_code,
            value,
        }
    }

    /// Decode one field from the front of `bytes`
    ///
    /// Returns the field and the number of bytes consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Field, usize)> {
        Field::from_bytes_with(bytes, registry().limits())
    }

    /// Decode one field with custom limits
    pub fn from_bytes_with(bytes: &[u8], limits: &Limits) -> Result<(Field, usize)> {
        let mut cursor = Cursor::new(bytes);
        let field = read_field(&mut cursor, limits, 0)?;
        Ok((field, cursor.position() as usize))
    }

    /// Field name, `None` when anonymous
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the field has no name
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    /// Whether the field's name equals `name`
    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Rename the field; an empty name makes it anonymous
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = normalize(name);
    }

    /// Declared type
    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    /// Tag of the declared type
    pub fn type_name(&self) -> &'static str {
        self.type_code.name()
    }

    /// Decoded value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Mutable access to the value of a nested frame
    pub(crate) fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Consume the field, returning its value
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Replace the value, retyping the field by the new value
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
        self.type_code = registry().type_of(&self.value);
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        self.type_code == TypeCode::Udef
    }

    /// Check if the value is a nested frame
    pub fn is_frame(&self) -> bool {
        self.type_code == TypeCode::Frame
    }

    /// Check if the value is an array
    pub fn is_array(&self) -> bool {
        self.type_code == TypeCode::Array
    }

    /// Check if the value is numeric
    pub fn is_numeric(&self) -> bool {
        self.type_code.is_numeric()
    }

    /// Encoded value without name, type or length prefix
    pub fn payload_bytes(&self) -> Result<Vec<u8>> {
        registry().encode(self.type_code, &self.value)
    }

    /// Full wire encoding of this field
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(registry().limits())
    }

    /// Full wire encoding with custom limits
    pub fn to_bytes_with(&self, limits: &Limits) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out, limits, 0)?;
        Ok(out)
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>, limits: &Limits, depth: usize) -> Result<()> {
        write_field(out, self.name(), self.type_code, &self.value, limits, depth)
    }
}

fn normalize(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.is_empty())
}
