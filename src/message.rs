//! # Message Model
//!
//! Messages flowing through a graph are loosely structured JSON objects. The
//! inspector never mutates them; it only reads `topic`, `payload`, `status`,
//! `error` and whatever the configured selectors point at.
//!
//! "No value" (a missing property) is represented as `None` throughout the crate,
//! distinct from an explicit JSON `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message flowing through the inspected node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
  fields: Map<String, Value>,
}

impl Message {
  /// Creates an empty message.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a message whose only field is `payload`.
  pub fn with_payload(payload: Value) -> Self {
    let mut fields = Map::new();
    fields.insert("payload".to_string(), payload);
    Self { fields }
  }

  /// Returns a top-level field, if present.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.fields.get(key)
  }

  /// Returns whether a top-level field is present, even if it is `null`.
  pub fn has(&self, key: &str) -> bool {
    self.fields.contains_key(key)
  }

  /// Sets a top-level field.
  pub fn set(&mut self, key: impl Into<String>, value: Value) {
    self.fields.insert(key.into(), value);
  }

  /// Returns the `topic` field.
  pub fn topic(&self) -> Option<&Value> {
    self.get("topic")
  }

  /// Returns the `payload` field.
  pub fn payload(&self) -> Option<&Value> {
    self.get("payload")
  }

  /// Returns the `status` envelope.
  pub fn status(&self) -> Option<&Value> {
    self.get("status")
  }

  /// Returns the `error` envelope.
  pub fn error(&self) -> Option<&Value> {
    self.get("error")
  }

  /// Returns the fields of the message.
  pub fn fields(&self) -> &Map<String, Value> {
    &self.fields
  }

  /// Returns the whole message as a JSON value.
  pub fn to_value(&self) -> Value {
    Value::Object(self.fields.clone())
  }
}

impl From<Value> for Message {
  /// Objects become messages field by field; any other value becomes the payload.
  fn from(value: Value) -> Self {
    match value {
      Value::Object(fields) => Self { fields },
      other => Self::with_payload(other),
    }
  }
}

impl From<Map<String, Value>> for Message {
  fn from(fields: Map<String, Value>) -> Self {
    Self { fields }
  }
}
