//! # Property Extraction Test Suite

use crate::message::Message;
use crate::property::{PathSegment, PropertyPath, Selector, extract};
use serde_json::json;

#[test]
fn test_parse_dotted_path() {
  let path = PropertyPath::parse("payload.a.b").unwrap();
  assert_eq!(
    path.segments(),
    &[
      PathSegment::Key("payload".to_string()),
      PathSegment::Key("a".to_string()),
      PathSegment::Key("b".to_string()),
    ]
  );
}

#[test]
fn test_parse_brackets_and_msg_prefix() {
  let path = PropertyPath::parse(r#"msg.payload.readings[2]["sensor id"]['x.y']"#).unwrap();
  assert_eq!(
    path.segments(),
    &[
      PathSegment::Key("payload".to_string()),
      PathSegment::Key("readings".to_string()),
      PathSegment::Index(2),
      PathSegment::Key("sensor id".to_string()),
      PathSegment::Key("x.y".to_string()),
    ]
  );
}

#[test]
fn test_parse_rejects_malformed_selectors() {
  for selector in ["", "msg.", ".a", "a.", "a..b", "a[", "a[]", "a]b", "a[0]b", "a.[0]", "a[x]"] {
    assert!(
      PropertyPath::parse(selector).is_err(),
      "selector {selector:?} should not parse"
    );
  }
}

#[test]
fn test_extract_missing_path_is_no_value() {
  let message = Message::from(json!({"payload": {"a": 1}}));
  let extraction = extract(&message, &Selector::parse("b.c"));
  assert_eq!(extraction.value, None);
  assert_eq!(extraction.property, "b.c");
}

#[test]
fn test_extract_nested_value() {
  let message = Message::from(json!({"payload": {"list": [{"v": "x"}, {"v": "y"}]}}));
  let extraction = extract(&message, &Selector::parse("payload.list[1].v"));
  assert_eq!(extraction.value, Some(json!("y")));
}

#[test]
fn test_extract_explicit_null_is_a_value() {
  let message = Message::from(json!({"payload": null}));
  let extraction = extract(&message, &Selector::parse("payload"));
  assert_eq!(extraction.value, Some(json!(null)));
}

#[test]
fn test_extract_through_scalar_is_no_value() {
  let message = Message::from(json!({"payload": 5}));
  assert_eq!(extract(&message, &Selector::parse("payload.a")).value, None);
  assert_eq!(extract(&message, &Selector::parse("payload[0]")).value, None);
}

#[test]
fn test_extract_index_on_object_uses_digit_key() {
  let message = Message::from(json!({"payload": {"0": "zero"}}));
  assert_eq!(
    extract(&message, &Selector::parse("payload[0]")).value,
    Some(json!("zero"))
  );
}

#[test]
fn test_entire_message_selector() {
  let message = Message::from(json!({"payload": 1, "topic": "t"}));
  let extraction = extract(&message, &Selector::parse("true"));
  assert_eq!(extraction.value, Some(json!({"payload": 1, "topic": "t"})));
  assert_eq!(extraction.property, "payload");
}

#[test]
fn test_path_selector_treats_sentinel_as_key() {
  let message = Message::from(json!({"payload": 1, "true": "yes"}));
  assert_eq!(
    extract(&message, &Selector::path("true")).value,
    Some(json!("yes"))
  );
}

#[test]
fn test_unresolvable_selector_never_panics() {
  let message = Message::from(json!({"payload": 1}));
  let selector = Selector::parse("payload[");
  assert!(matches!(selector, Selector::Unresolvable(_)));
  let extraction = extract(&message, &selector);
  assert_eq!(extraction.value, None);
  assert_eq!(extraction.property, "payload[");
}
