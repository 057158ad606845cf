//! # Output Router Test Suite

use crate::message::Message;
use crate::router::{LogSubject, OutputRouter, render_log_line};
use serde_json::json;

#[test]
fn test_publish_requires_active_and_sidebar() {
  let subject = LogSubject::Extracted(None);
  assert!(OutputRouter::new(false, true).route(true, subject).publish);
  assert!(!OutputRouter::new(false, true).route(false, subject).publish);
  assert!(!OutputRouter::new(false, false).route(true, subject).publish);
}

#[test]
fn test_log_requires_console() {
  let value = json!(1);
  let subject = LogSubject::Extracted(Some(&value));
  assert_eq!(OutputRouter::new(false, true).route(true, subject).log, None);
  assert_eq!(
    OutputRouter::new(true, false).route(false, subject).log,
    Some("1".to_string())
  );
}

#[test]
fn test_log_and_publish_are_independent() {
  let value = json!("hi");
  let decision = OutputRouter::new(true, true).route(true, LogSubject::Extracted(Some(&value)));
  assert_eq!(decision.log.as_deref(), Some("hi"));
  assert!(decision.publish);
}

#[test]
fn test_render_strings() {
  let single = json!("plain");
  assert_eq!(render_log_line(LogSubject::Extracted(Some(&single))), "plain");
  let multi = json!("a\nb");
  assert_eq!(render_log_line(LogSubject::Extracted(Some(&multi))), "\na\nb");
}

#[test]
fn test_render_objects_deeply_on_fresh_line() {
  let value = json!({"a": {"b": {"c": {"d": 1}}}});
  assert_eq!(
    render_log_line(LogSubject::Extracted(Some(&value))),
    "\n{ a: { b: { c: { d: 1 } } } }"
  );
  let null = json!(null);
  assert_eq!(render_log_line(LogSubject::Extracted(Some(&null))), "\nnull");
}

#[test]
fn test_render_primitives_shallowly() {
  let number = json!(3.5);
  assert_eq!(render_log_line(LogSubject::Extracted(Some(&number))), "3.5");
  let flag = json!(false);
  assert_eq!(render_log_line(LogSubject::Extracted(Some(&flag))), "false");
  assert_eq!(render_log_line(LogSubject::Extracted(None)), "undefined");
}

#[test]
fn test_render_entire_message() {
  let message = Message::from(json!({"payload": "x", "topic": "t"}));
  assert_eq!(
    render_log_line(LogSubject::EntireMessage(&message)),
    "\n{ payload: 'x', topic: 't' }"
  );
}
