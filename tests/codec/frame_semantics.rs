//! Frame container behavior

use crate::common::*;

#[test]
fn test_clone_is_structurally_equal_but_independent() {
    let original = Frame::new().with("child", person("Alice", "Smith"));
    let mut copy = original.clone();
    assert_eq!(copy, original);

    copy.frame_mut("child").unwrap().put("First", "Eve");

    let original_child = original.get_as_frame("child").unwrap();
    let copy_child = copy.get_as_frame("child").unwrap();
    assert_eq!(original_child.get_as_string("First").unwrap(), "Alice");
    assert_eq!(copy_child.get_as_string("First").unwrap(), "Eve");
    assert_ne!(copy, original);
}

#[test]
fn test_lookup_returns_first_of_duplicates() {
    let frame = Frame::new().with("k", 1i32).with("k", 2i32);
    assert_eq!(frame.get_as_int("k").unwrap(), 1);
    assert_eq!(frame.len(), 2);
}

#[test]
fn test_typed_getters_coerce() {
    let frame = Frame::new()
        .with("small", 7u8)
        .with("text_number", "42")
        .with("flag", "false")
        .with("when", "2020-01-01T00:00:00Z");
    assert_eq!(frame.get_as_long("small").unwrap(), 7);
    assert_eq!(frame.get_as_double("small").unwrap(), 7.0);
    assert_eq!(frame.get_as_u16("text_number").unwrap(), 42);
    assert!(!frame.get_as_bool("flag").unwrap());
    assert_eq!(frame.get_as_date("when").unwrap().timestamp(), 1_577_836_800);
}

#[test]
fn test_typed_getter_failures() {
    let frame = Frame::new().with("neg", -5i32).with("word", "abc");
    assert_eq!(
        frame.get_as_u8("neg").unwrap_err(),
        Error::Conversion {
            from: "S32",
            to: "u8"
        }
    );
    assert!(frame.get_as_double("word").is_err());
    assert_eq!(
        frame.get_as_int("missing").unwrap_err(),
        Error::FieldNotFound("missing".into())
    );
}

#[test]
fn test_array_access() {
    let team = team();
    let members = team.get_as_array("Team").unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(
        members[1].as_frame().unwrap().get_as_string("Last").unwrap(),
        "Jones"
    );
}

#[test]
fn test_merge_and_remove() {
    let mut frame = person("Alice", "Smith");
    frame.merge(Frame::new().with("Last", "Jones").with("Age", 40i32));
    assert_eq!(frame.names(), vec!["First", "Last", "Age"]);
    assert_eq!(frame.get_as_string("Last").unwrap(), "Jones");

    assert!(frame.remove("First").is_some());
    assert_eq!(frame.remove_all("Age"), 1);
    assert_eq!(frame.names(), vec!["Last"]);
    frame.clear();
    assert!(frame.is_empty());
}

#[test]
fn test_decoded_frame_is_unmodified_until_changed() {
    let mut decoded = Frame::from_bytes(&team().to_bytes().unwrap()).unwrap();
    assert!(!decoded.is_modified());
    decoded.add("extra", 1i32);
    assert!(decoded.is_modified());
}

#[test]
fn test_explicit_type_narrows() {
    let field = Field::with_type(Some("n".into()), TypeCode::U16, 512i64).unwrap();
    assert_eq!(field.value(), &Value::U16(512));
    assert_eq!(field.to_bytes().unwrap(), vec![1, b'n', 7, 2, 0]);
    assert!(Field::with_type(None, TypeCode::S8, 128i32).is_err());
}

#[test]
fn test_type_descriptors() {
    assert_eq!(registry().len(), 18);
    let names: Vec<&str> = registry().descriptors().map(|d| d.name).collect();
    assert_eq!(
        names,
        vec![
            "FRAME", "UDEF", "BYTE", "STR", "S8", "U8", "S16", "U16", "S32", "U32", "S64",
            "U64", "FLT", "DBL", "BOL", "DAT", "URI", "ARY"
        ]
    );
    assert_eq!(registry().lookup(13).unwrap().fixed_size, Some(8));
    assert_eq!(registry().lookup_by_name("str").unwrap().code, TypeCode::String);
    assert!(registry().lookup(18).is_err());
}
