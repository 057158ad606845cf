//! # Change-Gated Status Emitter
//!
//! Pushes a content badge to the host only when it differs from the last one
//! pushed, compared by serialized form.

use crate::host::StatusSink;
use crate::status::Badge;

/// Remembers the last content badge and suppresses repeats.
#[derive(Debug, Default)]
pub struct ChangeGatedEmitter {
  last: Option<String>,
  shown: bool,
}

impl ChangeGatedEmitter {
  /// Creates an emitter that has not shown anything yet.
  pub fn new() -> Self {
    Self::default()
  }

  /// Pushes `badge` unless it equals the last badge pushed.
  ///
  /// Returns whether the badge was pushed.
  pub fn emit(&mut self, badge: &Badge, sink: &dyn StatusSink) -> bool {
    let serialized = badge.serialized();
    if self.last.as_deref() == Some(serialized.as_str()) {
      return false;
    }
    sink.set_status(badge);
    self.last = Some(serialized);
    self.shown = true;
    true
  }

  /// Records that a badge was shown outside the gate (the initial badge), so
  /// [`reset`](Self::reset) knows to clear it.
  pub fn mark_shown(&mut self) {
    self.shown = true;
  }

  /// Clears the badge if anything was ever shown, bypassing the comparison.
  ///
  /// Returns whether the badge was cleared.
  pub fn reset(&mut self, sink: &dyn StatusSink) -> bool {
    self.last = None;
    if !std::mem::take(&mut self.shown) {
      return false;
    }
    sink.clear_status();
    true
  }

  /// Serialized form of the last badge pushed.
  pub fn last_serialized(&self) -> Option<&str> {
    self.last.as_deref()
  }
}
