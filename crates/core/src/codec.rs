//! Binary payload codec
//!
//! # Binary Format
//!
//! All fixed-width integers and floats are big-endian.
//!
//! - Field: `name_len(1) + name + type(1) + payload`
//! - Fixed payload: exactly the type's width
//! - Variable payload at field level: `len(4) + bytes`
//! - Frame: concatenated fields, no outer length
//! - Array payload: concatenated elements, each `type(1) + element payload`,
//!   where variable element payloads are `len(2) + bytes`
//!
//! Every length prefix is checked against [`Limits`] before allocation.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::frame::Frame;
use crate::limits::Limits;
use crate::types::TypeCode;
use crate::value::{Uri, Value};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::Cursor;

/// Encode the raw payload of `value` as type `code`
///
/// `value` must already have been coerced to the variant matching `code`.
pub(crate) fn encode_payload(
    code: TypeCode,
    value: &Value,
    limits: &Limits,
    depth: usize,
) -> Result<Vec<u8>> {
    let mismatch = || {
        Error::encoding(
            code.name(),
            format!("cannot encode {} value", value.type_name()),
        )
    };

    let mut out = Vec::with_capacity(code.fixed_size().unwrap_or(16) as usize);
    match (code, value) {
        (TypeCode::Udef, Value::Null) => {}
        (TypeCode::ByteArray, Value::Bytes(b)) => out.extend_from_slice(b),
        (TypeCode::String, Value::String(s)) => out.extend_from_slice(s.as_bytes()),
        (TypeCode::Uri, Value::Uri(u)) => out.extend_from_slice(u.as_str().as_bytes()),
        (TypeCode::S8, Value::S8(v)) => out.push(*v as u8),
        (TypeCode::U8, Value::U8(v)) => out.push(*v),
        (TypeCode::S16, Value::S16(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (TypeCode::U16, Value::U16(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (TypeCode::S32, Value::S32(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (TypeCode::U32, Value::U32(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (TypeCode::S64, Value::S64(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (TypeCode::U64, Value::U64(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (TypeCode::Float, Value::Float(v)) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
        (TypeCode::Double, Value::Double(v)) => {
            out.extend_from_slice(&v.to_bits().to_be_bytes())
        }
        (TypeCode::Boolean, Value::Bool(v)) => out.push(u8::from(*v)),
        (TypeCode::Date, Value::Date(millis)) => out.extend_from_slice(&millis.to_be_bytes()),
        (TypeCode::Array, Value::Array(items)) => {
            limits.check_depth(code, depth + 1, false)?;
            for item in items {
                encode_element(item, &mut out, limits, depth + 1)?;
            }
        }
        (TypeCode::Frame, Value::Frame(frame)) => {
            limits.check_depth(code, depth + 1, false)?;
            for field in frame.fields() {
                field.write_to(&mut out, limits, depth + 1)?;
            }
        }
        _ => return Err(mismatch()),
    }

    limits.check_encode(code, out.len())?;
    Ok(out)
}

/// Decode a raw payload of type `code`
///
/// For fixed-width types the slice must hold at least the type's width; extra
/// bytes are ignored. For variable-length types the whole slice is the payload.
pub(crate) fn decode_payload(
    code: TypeCode,
    bytes: &[u8],
    limits: &Limits,
    depth: usize,
) -> Result<Value> {
    if let Some(width) = code.fixed_size() {
        let width = width as usize;
        if bytes.len() < width {
            return Err(Error::decoding(
                code.name(),
                format!("need {} bytes, have {}", width, bytes.len()),
            ));
        }
    } else {
        limits.check_decode(code, bytes.len())?;
    }

    let value = match code {
        TypeCode::Udef => Value::Null,
        TypeCode::ByteArray => Value::Bytes(bytes.to_vec()),
        TypeCode::String => Value::String(utf8(code, bytes)?),
        TypeCode::Uri => {
            let text = utf8(code, bytes)?;
            let uri = Uri::parse(&text)
                .ok_or_else(|| Error::decoding(code.name(), format!("not a URI: {}", text)))?;
            Value::Uri(uri)
        }
        TypeCode::S8 => Value::S8(bytes[0] as i8),
        TypeCode::U8 => Value::U8(bytes[0]),
        TypeCode::S16 => Value::S16(BigEndian::read_i16(bytes)),
        TypeCode::U16 => Value::U16(BigEndian::read_u16(bytes)),
        TypeCode::S32 => Value::S32(BigEndian::read_i32(bytes)),
        TypeCode::U32 => Value::U32(BigEndian::read_u32(bytes)),
        TypeCode::S64 => Value::S64(BigEndian::read_i64(bytes)),
        TypeCode::U64 => Value::U64(BigEndian::read_u64(bytes)),
        TypeCode::Float => Value::Float(f32::from_bits(BigEndian::read_u32(bytes))),
        TypeCode::Double => Value::Double(f64::from_bits(BigEndian::read_u64(bytes))),
        TypeCode::Boolean => Value::Bool(bytes[0] != 0),
        TypeCode::Date => Value::Date(BigEndian::read_i64(bytes)),
        TypeCode::Array => {
            limits.check_depth(code, depth + 1, true)?;
            let mut cursor = Cursor::new(bytes);
            let mut items = Vec::new();
            while (cursor.position() as usize) < bytes.len() {
                items.push(decode_element(&mut cursor, limits, depth + 1)?);
            }
            Value::Array(items)
        }
        TypeCode::Frame => {
            limits.check_depth(code, depth + 1, true)?;
            Value::Frame(decode_fields(bytes, limits, depth + 1)?)
        }
    };
    Ok(value)
}

/// Decode a run of concatenated fields into a frame
pub(crate) fn decode_fields(bytes: &[u8], limits: &Limits, depth: usize) -> Result<Frame> {
    let mut cursor = Cursor::new(bytes);
    let mut frame = Frame::new();
    while (cursor.position() as usize) < bytes.len() {
        frame.add_field(read_field(&mut cursor, limits, depth)?);
    }
    frame.clear_modified();
    Ok(frame)
}

/// Read one field from the cursor
pub(crate) fn read_field(
    cursor: &mut Cursor<&[u8]>,
    limits: &Limits,
    depth: usize,
) -> Result<Field> {
    let name_len = cursor.read_u8().map_err(|_| eof("NAME", 1))? as usize;
    let name = if name_len == 0 {
        None
    } else {
        let raw = take(cursor, name_len, "NAME")?;
        Some(utf8_named("NAME", raw)?)
    };

    let code_byte = cursor.read_u8().map_err(|_| eof("TYPE", 1))?;
    let code = TypeCode::try_from(code_byte)?;

    let payload = match code.fixed_size() {
        Some(width) => take(cursor, width as usize, code.name())?,
        None => {
            let declared = cursor
                .read_u32::<BigEndian>()
                .map_err(|_| eof(code.name(), 4))? as usize;
            limits.check_decode(code, declared)?;
            take(cursor, declared, code.name())?
        }
    };

    let value = decode_payload(code, payload, limits, depth)?;
    Ok(Field::with_type_unchecked(name, code, value))
}

/// Append one field in wire form
pub(crate) fn write_field(
    out: &mut Vec<u8>,
    name: Option<&str>,
    code: TypeCode,
    value: &Value,
    limits: &Limits,
    depth: usize,
) -> Result<()> {
    let name_bytes = name.unwrap_or_default().as_bytes();
    limits.check_name(name.unwrap_or_default())?;

    let payload = encode_payload(code, value, limits, depth)?;

    out.push(name_bytes.len() as u8);
    out.extend_from_slice(name_bytes);
    out.push(code.as_byte());
    if code.is_variable() {
        let len = u32::try_from(payload.len()).map_err(|_| {
            Error::encoding(code.name(), "payload exceeds 4 GiB length prefix")
        })?;
        out.extend_from_slice(&len.to_be_bytes());
    }
    out.extend_from_slice(&payload);
    Ok(())
}

fn encode_element(item: &Value, out: &mut Vec<u8>, limits: &Limits, depth: usize) -> Result<()> {
    let code = item.type_code();
    let payload = encode_payload(code, item, limits, depth)?;
    out.push(code.as_byte());
    if code.is_variable() {
        let len = u16::try_from(payload.len()).map_err(|_| {
            Error::encoding(
                code.name(),
                format!("array element of {} bytes exceeds 65535", payload.len()),
            )
        })?;
        out.extend_from_slice(&len.to_be_bytes());
    }
    out.extend_from_slice(&payload);
    Ok(())
}

fn decode_element(cursor: &mut Cursor<&[u8]>, limits: &Limits, depth: usize) -> Result<Value> {
    let code_byte = cursor.read_u8().map_err(|_| eof("ARY", 1))?;
    let code = TypeCode::try_from(code_byte)?;
    let payload = match code.fixed_size() {
        Some(width) => take(cursor, width as usize, code.name())?,
        None => {
            let declared = cursor
                .read_u16::<BigEndian>()
                .map_err(|_| eof(code.name(), 2))? as usize;
            limits.check_decode(code, declared)?;
            take(cursor, declared, code.name())?
        }
    };
    decode_payload(code, payload, limits, depth)
}

/// Borrow the next `len` bytes, failing before any allocation if they are missing
fn take<'a>(cursor: &mut Cursor<&'a [u8]>, len: usize, what: &'static str) -> Result<&'a [u8]> {
    let start = cursor.position() as usize;
    let data: &'a [u8] = *cursor.get_ref();
    let remaining = data.len().saturating_sub(start);
    if remaining < len {
        return Err(Error::decoding(
            what,
            format!("need {} bytes, have {}", len, remaining),
        ));
    }
    cursor.set_position((start + len) as u64);
    Ok(&data[start..start + len])
}

fn eof(what: &'static str, needed: usize) -> Error {
    Error::decoding(what, format!("unexpected end of input, need {} bytes", needed))
}

fn utf8(code: TypeCode, bytes: &[u8]) -> Result<String> {
    utf8_named(code.name(), bytes)
}

fn utf8_named(what: &'static str, bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::decoding(what, format!("invalid UTF-8: {}", e)))
}
