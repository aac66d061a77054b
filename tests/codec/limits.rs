//! Decode ceilings against hostile length prefixes

use crate::common::*;

#[test]
fn test_huge_declared_string_is_rejected_before_reading() {
    // anonymous STRING declaring 4 GiB - 1 bytes with none present
    let bytes = [0, 3, 0xFF, 0xFF, 0xFF, 0xFF];
    let err = Frame::from_bytes(&bytes).unwrap_err();
    assert!(err.is_decoding());
    assert!(err.to_string().contains("ceiling"), "{}", err);
}

#[test]
fn test_declared_length_past_end_is_rejected() {
    let bytes = [0, 3, 0, 0, 0, 10, b'a', b'b'];
    assert!(Frame::from_bytes(&bytes).unwrap_err().is_decoding());
}

#[test]
fn test_bytearray_ceiling() {
    let limits = Limits::default();
    let at_limit = Frame::new().with("b", vec![0u8; limits.max_bytes_len]);
    let bytes = at_limit.to_bytes().unwrap();
    assert_eq!(Frame::from_bytes(&bytes).unwrap(), at_limit);

    let over = Frame::new().with("b", vec![0u8; limits.max_bytes_len + 1]);
    assert!(over.to_bytes().unwrap_err().is_encoding());
}

#[test]
fn test_small_limits_apply_on_both_sides() {
    let limits = Limits::with_small_limits();
    let frame = Frame::new().with("s", "x".repeat(65));
    assert!(frame.to_bytes_with(&limits).unwrap_err().is_encoding());

    let bytes = frame.to_bytes().unwrap();
    assert!(Frame::from_bytes_with(&bytes, &limits).unwrap_err().is_decoding());
}

#[test]
fn test_nesting_depth_is_bounded() {
    let limits = Limits::with_small_limits();
    let mut frame = Frame::new().with("leaf", 1i32);
    for _ in 0..=limits.max_nesting_depth {
        frame = Frame::new().with("n", frame);
    }
    let bytes = frame.to_bytes().unwrap();
    assert!(frame.to_bytes_with(&limits).unwrap_err().is_encoding());
    assert!(Frame::from_bytes_with(&bytes, &limits).unwrap_err().is_decoding());

    let mut shallow = Frame::new().with("leaf", 1i32);
    for _ in 0..limits.max_nesting_depth {
        shallow = Frame::new().with("n", shallow);
    }
    let bytes = shallow.to_bytes_with(&limits).unwrap();
    assert_eq!(Frame::from_bytes_with(&bytes, &limits).unwrap(), shallow);
}

#[test]
fn test_long_names_fail_to_encode() {
    let frame = Frame::new().with("n".repeat(256), 1i32);
    assert!(frame.to_bytes().unwrap_err().is_encoding());
}
