//! JSON text forms

use crate::common::*;

#[test]
fn test_team_renders_as_nested_objects() {
    assert_eq!(
        team().to_string(),
        r#"{"Team":[{"First":"Alice","Last":"Smith"},{"First":"Bob","Last":"Jones"}]}"#
    );
}

#[test]
fn test_team_survives_wire_then_json() {
    let decoded = Frame::from_bytes(&team().to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.to_json().unwrap(), team().to_json().unwrap());
}

#[test]
fn test_team_parses_back() {
    let parsed = Frame::from_json(&team().to_json().unwrap()).unwrap();
    assert_eq!(parsed, team());
}

#[test]
fn test_every_type_renders() {
    let json = every_type().to_json().unwrap();
    assert!(json.starts_with(
        r#"{"udef":null,"bytes":"AAH+/w==","string":"héllo","s8":-128,"u8":255"#
    ));
    assert!(json.contains(r#""u64":18446744073709551615"#));
    assert!(json.contains(r#""date":"2023-11-14T22:13:20.123Z""#));
    assert!(json.contains(r#""uri":"https://example.com/a?b=c""#));
    assert!(json.contains(r#""array":[1,"two",false]"#));
    assert!(json.ends_with(r#""frame":{"First":"Ada","Last":"Lovelace"}}"#));
}

#[test]
fn test_pretty_output_parses_to_same_frame() {
    let pretty = team().to_pretty_json().unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(Frame::from_json(&pretty).unwrap(), team());
}

#[test]
fn test_mixed_anonymous_fields_are_keyed_by_position() {
    let mut frame = Frame::new().with("a", 1i32);
    frame.add_anonymous("x");
    assert_eq!(frame.to_json().unwrap(), r#"{"a":1,"1":"x"}"#);
}
