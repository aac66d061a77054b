//! Per-type round trips through the registry and through the frame wire form

use crate::common::*;

/// Encode as the value's own type, decode, and return the decoded value
fn payload_round_trip(value: Value) -> Value {
    let code = registry().type_of(&value);
    let bytes = registry().encode(code, &value).unwrap();
    registry().decode(code, &bytes).unwrap()
}

/// Round trip through a named field inside a frame
fn frame_round_trip(value: Value) -> Value {
    let frame = Frame::new().with("v", value);
    let decoded = Frame::from_bytes(&frame.to_bytes().unwrap()).unwrap();
    decoded.get("v").unwrap().clone()
}

fn assert_round_trips(values: Vec<Value>) {
    for value in values {
        assert_eq!(payload_round_trip(value.clone()), value);
        assert_eq!(frame_round_trip(value.clone()), value);
    }
}

#[test]
fn test_s8_extremes() {
    assert_round_trips(vec![
        Value::S8(i8::MIN),
        Value::S8(i8::MAX),
        Value::S8(0),
        Value::S8(-1),
    ]);
}

#[test]
fn test_u8_extremes() {
    assert_round_trips(vec![Value::U8(0), Value::U8(u8::MAX)]);
}

#[test]
fn test_s16_extremes() {
    assert_round_trips(vec![
        Value::S16(i16::MIN),
        Value::S16(i16::MAX),
        Value::S16(0),
        Value::S16(-1),
    ]);
}

#[test]
fn test_u16_extremes() {
    assert_round_trips(vec![Value::U16(0), Value::U16(u16::MAX)]);
}

#[test]
fn test_s32_extremes() {
    assert_round_trips(vec![
        Value::S32(i32::MIN),
        Value::S32(i32::MAX),
        Value::S32(0),
        Value::S32(-1),
    ]);
}

#[test]
fn test_u32_extremes() {
    assert_round_trips(vec![Value::U32(0), Value::U32(u32::MAX)]);
}

#[test]
fn test_s64_extremes() {
    assert_round_trips(vec![
        Value::S64(i64::MIN),
        Value::S64(i64::MAX),
        Value::S64(0),
        Value::S64(-1),
    ]);
}

#[test]
fn test_u64_extremes() {
    assert_round_trips(vec![Value::U64(0), Value::U64(u64::MAX)]);
}

#[test]
fn test_float_extremes() {
    assert_round_trips(vec![
        Value::Float(f32::MAX),
        Value::Float(f32::MIN),
        Value::Float(f32::MIN_POSITIVE),
        Value::Float(f32::from_bits(1)),
        Value::Float(0.0),
        Value::Float(-1.0),
    ]);
}

#[test]
fn test_double_extremes() {
    assert_round_trips(vec![
        Value::Double(f64::MAX),
        Value::Double(f64::MIN),
        Value::Double(f64::MIN_POSITIVE),
        Value::Double(f64::from_bits(1)),
        Value::Double(0.0),
        Value::Double(-1.0),
    ]);
}

#[test]
fn test_nan_keeps_its_bits() {
    let nan = f64::from_bits(0x7FF8_0000_0000_0001);
    let back = payload_round_trip(Value::Double(nan));
    match back {
        Value::Double(d) => assert_eq!(d.to_bits(), nan.to_bits()),
        other => panic!("expected DBL, got {:?}", other),
    }
}

#[test]
fn test_boolean_date_udef() {
    assert_round_trips(vec![
        Value::Bool(true),
        Value::Bool(false),
        Value::Null,
        Value::Date(1_700_000_000_123),
    ]);
}

#[test]
fn test_date_extremes() {
    assert_round_trips(vec![
        Value::Date(i64::MIN),
        Value::Date(i64::MAX),
        Value::Date(0),
        Value::Date(-1),
    ]);
}

#[test]
fn test_date_sentinels_decode_from_wire() {
    for millis in [i64::MAX, i64::MIN] {
        let mut bytes = vec![0, 15];
        bytes.extend_from_slice(&millis.to_be_bytes());

        let frame = Frame::from_bytes(&bytes).unwrap();
        assert_eq!(frame.fields()[0].value(), &Value::Date(millis));
        assert_eq!(frame.to_bytes().unwrap(), bytes);
    }
}

#[test]
fn test_date_text_form_is_lossless() {
    for millis in [i64::MIN, i64::MAX, 0, -1, 253_402_300_800_000] {
        let value = Value::Date(millis);
        let text = value.to_text();
        assert_eq!(registry().parse_text(TypeCode::Date, text.as_deref()).unwrap(), value);
    }
    assert_eq!(
        Value::Date(-1).to_text().as_deref(),
        Some("1969-12-31T23:59:59.999Z")
    );
}

#[test]
fn test_variable_length_types() {
    assert_round_trips(vec![
        Value::from(""),
        Value::from("plain ascii"),
        Value::from("ünïcödé ✓"),
        Value::Bytes(vec![]),
        Value::Bytes((0..=255).collect()),
        Value::Uri(Uri::parse("urn:isbn:0451450523").unwrap()),
    ]);
}

#[test]
fn test_composites() {
    assert_round_trips(vec![
        Value::Array(vec![]),
        Value::Array(vec![Value::S64(-5), Value::from("x"), Value::Null]),
        Value::Frame(Frame::new()),
        Value::Frame(every_type()),
    ]);
}

#[test]
fn test_every_type_frame() {
    let frame = every_type();
    let decoded = Frame::from_bytes(&frame.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, frame);
    let codes: Vec<u8> = decoded.iter().map(|f| f.type_code().as_byte()).collect();
    assert_eq!(codes, (1..=17).chain([0]).collect::<Vec<u8>>());
}

#[test]
fn test_u8_accepts_in_range_integers() {
    assert!(registry().check_type(TypeCode::U8, &Value::S32(0)));
    assert!(registry().check_type(TypeCode::U8, &Value::S32(255)));
    assert_eq!(registry().encode(TypeCode::U8, &Value::S32(255)).unwrap(), vec![0xFF]);
    assert_eq!(registry().encode(TypeCode::U8, &Value::S64(0)).unwrap(), vec![0x00]);
}

#[test]
fn test_u8_rejects_out_of_range() {
    assert!(!registry().check_type(TypeCode::U8, &Value::S32(256)));
    assert!(!registry().check_type(TypeCode::U8, &Value::S32(-1)));

    let err = registry().encode(TypeCode::U8, &Value::S32(256)).unwrap_err();
    assert!(err.is_encoding());
    let err = registry().encode(TypeCode::U8, &Value::S32(-1)).unwrap_err();
    assert!(err.is_encoding());
}

#[test]
fn test_type_mismatch_is_an_encoding_error() {
    let err = registry().encode(TypeCode::S32, &Value::from("12")).unwrap_err();
    assert!(matches!(err, Error::Encoding { type_name: "S32", .. }));
    assert!(registry().encode(TypeCode::Boolean, &Value::S32(1)).is_err());
}

#[test]
fn test_uri_accepts_strings_with_scheme() {
    assert!(registry().check_type(TypeCode::Uri, &Value::from("mailto:a@b.c")));
    assert!(!registry().check_type(TypeCode::Uri, &Value::from("no scheme here")));
    let bytes = registry().encode(TypeCode::Uri, &Value::from("http://x")).unwrap();
    assert_eq!(bytes, b"http://x".to_vec());
}
