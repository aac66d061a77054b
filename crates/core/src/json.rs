//! JSON rendering and parsing
//!
//! Rendering goes through `serde::Serialize`, so field order and duplicate
//! names survive (`serde_json` writes map entries as they are produced):
//!
//! - a frame renders as an object, or as an array when [`Frame::is_array`]
//! - anonymous fields inside an object are keyed by their position
//! - BYTEARRAY renders as standard base64, DATE as RFC 3339, URI as a string
//! - non-finite floats render as `null`
//!
//! Parsing maps objects to frames, arrays to ARRAY values, integers to the
//! narrowest of S32/S64/U64 and all other numbers to DOUBLE.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::frame::Frame;
use crate::value::{date_text, Value};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bytes(b) => {
                use base64::Engine as _;
                serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(b))
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::S8(v) => serializer.serialize_i8(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::S16(v) => serializer.serialize_i16(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::S32(v) => serializer.serialize_i32(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::S64(v) => serializer.serialize_i64(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::Float(v) => serializer.serialize_f32(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Date(millis) => serializer.serialize_str(&date_text(*millis)),
            Value::Uri(u) => serializer.serialize_str(u.as_str()),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Frame(frame) => frame.serialize(serializer),
        }
    }
}

impl Serialize for Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_array() {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for field in self.fields() {
                seq.serialize_element(field.value())?;
            }
            return seq.end();
        }

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (index, field) in self.fields().iter().enumerate() {
            match field.name() {
                Some(name) => map.serialize_entry(name, field.value())?,
                None => map.serialize_entry(&index.to_string(), field.value())?,
            }
        }
        map.end()
    }
}

impl Frame {
    /// Compact JSON text
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON text
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON text into a frame
    ///
    /// A top-level object yields named fields; a top-level array yields
    /// anonymous fields. Scalars at the top level are rejected.
    pub fn from_json(text: &str) -> Result<Frame> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        match json {
            serde_json::Value::Object(map) => Ok(object_to_frame(map)),
            serde_json::Value::Array(items) => Ok(items
                .into_iter()
                .map(|item| Field::anonymous(from_json_value(item)))
                .collect()),
            other => Err(Error::Json(format!(
                "expected object or array at top level, found {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Parse any JSON text into a value
pub fn parse_value(text: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_json_value(json))
}

/// Convert a parsed JSON tree into a value
pub fn from_json_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(small) => Value::S32(small),
                    Err(_) => Value::S64(i),
                }
            } else if let Some(u) = n.as_u64() {
                Value::U64(u)
            } else {
                Value::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_json_value).collect())
        }
        serde_json::Value::Object(map) => Value::Frame(object_to_frame(map)),
    }
}

fn object_to_frame(map: serde_json::Map<String, serde_json::Value>) -> Frame {
    map.into_iter()
        .map(|(name, value)| Field::new(name, from_json_value(value)))
        .collect()
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
