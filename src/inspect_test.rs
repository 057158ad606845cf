//! # Value Rendering Test Suite

use crate::inspect::{DEEP_DEPTH, SHALLOW_DEPTH, render, render_number};
use serde_json::{Number, json};

#[test]
fn test_render_scalars() {
  assert_eq!(render(Some(&json!(null)), DEEP_DEPTH), "null");
  assert_eq!(render(Some(&json!(true)), DEEP_DEPTH), "true");
  assert_eq!(render(Some(&json!(42)), DEEP_DEPTH), "42");
  assert_eq!(render(Some(&json!(-1.5)), DEEP_DEPTH), "-1.5");
  assert_eq!(render(Some(&json!("hi")), DEEP_DEPTH), "'hi'");
  assert_eq!(render(None, DEEP_DEPTH), "undefined");
}

#[test]
fn test_render_integral_float_drops_fraction() {
  let number = Number::from_f64(3.0).unwrap();
  assert_eq!(render_number(&number), "3");
}

#[test]
fn test_render_escapes_strings() {
  assert_eq!(
    render(Some(&json!("it's\nfine")), DEEP_DEPTH),
    r"'it\'s\nfine'"
  );
}

#[test]
fn test_render_collections() {
  assert_eq!(render(Some(&json!([])), DEEP_DEPTH), "[]");
  assert_eq!(render(Some(&json!({})), DEEP_DEPTH), "{}");
  assert_eq!(
    render(Some(&json!({"a": 1, "b": [true, null]})), DEEP_DEPTH),
    "{ a: 1, b: [ true, null ] }"
  );
}

#[test]
fn test_render_quotes_non_identifier_keys() {
  assert_eq!(
    render(Some(&json!({"sensor-1": 2, "_ok": 3})), DEEP_DEPTH),
    "{ _ok: 3, 'sensor-1': 2 }"
  );
}

#[test]
fn test_render_depth_cap() {
  let value = json!({"a": {"b": {"c": {"d": 1}}}});
  assert_eq!(
    render(Some(&value), SHALLOW_DEPTH),
    "{ a: { b: { c: [Object] } } }"
  );
  assert_eq!(
    render(Some(&value), DEEP_DEPTH),
    "{ a: { b: { c: { d: 1 } } } }"
  );
  assert_eq!(render(Some(&json!([[[[1]]]])), 1), "[ [ [Array] ] ]");
}
