//! # Change-Gated Emitter Test Suite

use crate::emitter::ChangeGatedEmitter;
use crate::status::{Badge, Fill, Shape};
use crate::test_support::{RecordingStatus, StatusEvent};

#[test]
fn test_equal_badges_emit_once() {
  let sink = RecordingStatus::default();
  let mut emitter = ChangeGatedEmitter::new();
  let badge = Badge::new(Fill::Grey, Shape::Dot, "same");

  assert!(emitter.emit(&badge, &sink));
  assert!(!emitter.emit(&badge.clone(), &sink));
  assert_eq!(sink.events(), vec![StatusEvent::Set(badge)]);
}

#[test]
fn test_different_badges_emit_twice() {
  let sink = RecordingStatus::default();
  let mut emitter = ChangeGatedEmitter::new();
  let first = Badge::new(Fill::Grey, Shape::Dot, "a");
  let second = Badge::new(Fill::Grey, Shape::Ring, "a");

  assert!(emitter.emit(&first, &sink));
  assert!(emitter.emit(&second, &sink));
  assert_eq!(sink.badges(), vec![first, second.clone()]);
  assert_eq!(emitter.last_serialized(), Some(second.serialized().as_str()));
}

#[test]
fn test_reset_clears_only_when_shown() {
  let sink = RecordingStatus::default();
  let mut emitter = ChangeGatedEmitter::new();
  assert!(!emitter.reset(&sink));
  assert!(sink.events().is_empty());

  emitter.emit(&Badge::new(Fill::Green, Shape::Dot, "ok"), &sink);
  assert!(emitter.reset(&sink));
  assert_eq!(sink.events().last(), Some(&StatusEvent::Cleared));
  assert_eq!(emitter.last_serialized(), None);
}

#[test]
fn test_mark_shown_enables_reset() {
  let sink = RecordingStatus::default();
  let mut emitter = ChangeGatedEmitter::new();
  emitter.mark_shown();
  assert!(emitter.reset(&sink));
  assert_eq!(sink.events(), vec![StatusEvent::Cleared]);
}

#[test]
fn test_badge_repeats_after_reset() {
  let sink = RecordingStatus::default();
  let mut emitter = ChangeGatedEmitter::new();
  let badge = Badge::new(Fill::Grey, Shape::Dot, "x");
  emitter.emit(&badge, &sink);
  emitter.reset(&sink);
  assert!(emitter.emit(&badge, &sink));
}
