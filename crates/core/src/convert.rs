//! Typed access with coercion
//!
//! Each conversion tries, in order:
//! 1. the matching variant
//! 2. numeric widening or narrowing (range-checked; floats truncate toward zero)
//! 3. parsing a string value
//!
//! When all three fail the result is [`Error::Conversion`] naming the stored
//! type and the requested type.

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::registry::{parse_bool, parse_date};
use crate::value::{millis_to_date_time, Value};
use chrono::{DateTime, Utc};

impl Value {
    fn fail(&self, to: &'static str) -> Error {
        Error::conversion(self.type_name(), to)
    }

    /// Integer view used by every integer target
    fn integer_for(&self, to: &'static str) -> Result<i128> {
        match self {
            Value::Float(f) => float_to_integer(*f as f64),
            Value::Double(d) => float_to_integer(*d),
            Value::Date(millis) => Some(*millis as i128),
            Value::String(s) => {
                let t = s.trim();
                t.parse::<i128>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().and_then(float_to_integer))
            }
            other => other.as_integer(),
        }
        .ok_or_else(|| self.fail(to))
    }

    /// Coerce to `bool`
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => parse_bool(s).ok_or_else(|| self.fail("bool")),
            other => match other.as_integer() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(self.fail("bool")),
            },
        }
    }

    /// Coerce to `f64`
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Value::Double(d) => Ok(*d),
            Value::Float(f) => Ok(*f as f64),
            Value::String(s) => s.trim().parse().map_err(|_| self.fail("f64")),
            other => other
                .as_integer()
                .map(|n| n as f64)
                .ok_or_else(|| self.fail("f64")),
        }
    }

    /// Coerce to `f32`
    pub fn to_f32(&self) -> Result<f32> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::String(s) => s.trim().parse().map_err(|_| self.fail("f32")),
            other => other.to_f64().map(|d| d as f32).map_err(|_| self.fail("f32")),
        }
    }

    /// Coerce to a string
    ///
    /// Scalars use their text form; frames and arrays render as JSON.
    pub fn to_string_value(&self) -> Result<String> {
        match self {
            Value::Null => Err(self.fail("string")),
            Value::Array(_) | Value::Frame(_) => {
                serde_json::to_string(self).map_err(|_| self.fail("string"))
            }
            other => other.to_text().ok_or_else(|| self.fail("string")),
        }
    }

    /// Coerce to a UTC timestamp
    pub fn to_date(&self) -> Result<DateTime<Utc>> {
        match self {
            Value::Date(millis) => Some(*millis),
            Value::String(s) => parse_date(s),
            other => other.as_integer().and_then(|n| i64::try_from(n).ok()),
        }
        .and_then(millis_to_date_time)
        .ok_or_else(|| self.fail("date"))
    }

    /// Coerce to bytes; strings yield their UTF-8 encoding
    pub fn to_byte_vec(&self) -> Result<Vec<u8>> {
        match self {
            Value::Bytes(b) => Ok(b.clone()),
            Value::String(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(self.fail("bytes")),
        }
    }
}

fn float_to_integer(f: f64) -> Option<i128> {
    if f.is_finite() {
        Some(f.trunc() as i128)
    } else {
        None
    }
}

macro_rules! integer_conversions {
    ($($fn_name:ident => $ty:ty),* $(,)?) => {
        impl Value {
            $(
                #[doc = concat!("Coerce to `", stringify!($ty), "`, failing when out of range")]
                pub fn $fn_name(&self) -> Result<$ty> {
                    let n = self.integer_for(stringify!($ty))?;
                    <$ty>::try_from(n).map_err(|_| self.fail(stringify!($ty)))
                }
            )*
        }
    };
}

integer_conversions!(
    to_i8 => i8,
    to_i16 => i16,
    to_i32 => i32,
    to_i64 => i64,
    to_u8 => u8,
    to_u16 => u16,
    to_u32 => u32,
    to_u64 => u64,
);

macro_rules! frame_getters {
    ($($getter:ident => $conv:ident -> $ty:ty),* $(,)?) => {
        impl Frame {
            $(
                #[doc = concat!(
                    "Value of the first field named `name`, coerced to `",
                    stringify!($ty),
                    "`"
                )]
                pub fn $getter(&self, name: &str) -> Result<$ty> {
                    self.require(name)?.$conv()
                }
            )*
        }
    };
}

frame_getters!(
    get_as_bool => to_bool -> bool,
    get_as_i8 => to_i8 -> i8,
    get_as_i16 => to_i16 -> i16,
    get_as_int => to_i32 -> i32,
    get_as_long => to_i64 -> i64,
    get_as_u8 => to_u8 -> u8,
    get_as_u16 => to_u16 -> u16,
    get_as_u32 => to_u32 -> u32,
    get_as_u64 => to_u64 -> u64,
    get_as_float => to_f32 -> f32,
    get_as_double => to_f64 -> f64,
    get_as_string => to_string_value -> String,
    get_as_date => to_date -> DateTime<Utc>,
    get_as_bytes => to_byte_vec -> Vec<u8>,
);

impl Frame {
    fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))
    }

    /// Nested frame stored under `name`
    pub fn get_as_frame(&self, name: &str) -> Result<&Frame> {
        let value = self.require(name)?;
        value.as_frame().ok_or_else(|| value.fail("frame"))
    }

    /// Array stored under `name`
    pub fn get_as_array(&self, name: &str) -> Result<&[Value]> {
        let value = self.require(name)?;
        value.as_array().ok_or_else(|| value.fail("array"))
    }
}
