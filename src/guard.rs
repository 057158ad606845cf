//! # Feedback Guard
//!
//! A node's badge can be turned back into a message (a status watcher emits
//! `{status: {source: {id}, ...}}`). If that message is wired back into the same
//! node, processing it would update the badge, which would emit another status
//! message, forever. Such echoes are recognised by the `status.source.id` naming
//! this node, and dropped.

use crate::message::Message;
use serde_json::Value;

/// Returns whether `message` is an echo of a status emitted by node `self_id`.
pub fn is_echo(message: &Message, self_id: &str) -> bool {
  message
    .status()
    .and_then(|status| status.get("source"))
    .and_then(|source| source.get("id"))
    .and_then(Value::as_str)
    .is_some_and(|id| id == self_id)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_own_status_is_echo() {
    let message = Message::from(json!({"status": {"text": "x", "source": {"id": "n1"}}}));
    assert!(is_echo(&message, "n1"));
  }

  #[test]
  fn test_other_source_is_not_echo() {
    let message = Message::from(json!({"status": {"text": "x", "source": {"id": "n2"}}}));
    assert!(!is_echo(&message, "n1"));
  }

  #[test]
  fn test_incomplete_envelopes_are_not_echo() {
    for value in [
      json!({"payload": 1}),
      json!({"status": "n1"}),
      json!({"status": {"source": "n1"}}),
      json!({"status": {"source": {"id": 1}}}),
    ] {
      assert!(!is_echo(&Message::from(value), "n1"));
    }
  }
}
