//! # Debug Records
//!
//! A [`DebugRecord`] is what an inspector node publishes for each message: the
//! node's identifiers, the message topic, the property that was selected (only in
//! property mode) and the selected value.
//!
//! Before publishing, records are size-bounded by [`encode_record`], producing an
//! [`EncodedRecord`] whose `msg` is always a string and whose `format` tells the
//! viewer how to present it:
//!
//! | Value | `format` | `msg` |
//! |-------|----------|-------|
//! | no value | `undefined` | `(undefined)` |
//! | `null` | `null` | `null` |
//! | string | `string[N]` | the string, cut at the max length + `...` |
//! | number / boolean | `number` / `boolean` | literal form |
//! | array | `array[N]` | JSON, see below |
//! | object | `Object` | JSON, see below |
//!
//! Inside JSON encodings, strings longer than the max length are cut the same
//! way, and arrays longer than the max length are replaced by
//! `{"__enc__": true, "type": "array", "data": [first max-length items], "length": N}`.

use crate::config::NodeIdentity;
use crate::inspect::render_number;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Marker appended to truncated strings.
const TRUNCATION_MARKER: &str = "...";

/// A record describing one inspected message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugRecord {
  /// Node id.
  pub id: String,
  /// Flow id.
  pub flow_id: String,
  /// Subflow template id.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alias_id: Option<String>,
  /// Flow path.
  pub path: String,
  /// Node name.
  pub name: String,
  /// Message topic.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub topic: Option<Value>,
  /// Selected property; present only in property mode.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub property: Option<String>,
  /// Selected value; `None` when the property is missing.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub msg: Option<Value>,
}

impl DebugRecord {
  /// Creates a record for a node, without topic, property or value.
  pub fn new(identity: &NodeIdentity, name: impl Into<String>) -> Self {
    Self {
      id: identity.id.clone(),
      flow_id: identity.flow_id.clone(),
      alias_id: identity.alias_id.clone(),
      path: identity.path.clone(),
      name: name.into(),
      topic: None,
      property: None,
      msg: None,
    }
  }

  /// Sets the topic.
  #[must_use]
  pub fn with_topic(mut self, topic: Option<Value>) -> Self {
    self.topic = topic;
    self
  }

  /// Sets the property name.
  #[must_use]
  pub fn with_property(mut self, property: impl Into<String>) -> Self {
    self.property = Some(property.into());
    self
  }

  /// Sets the value.
  #[must_use]
  pub fn with_msg(mut self, msg: Option<Value>) -> Self {
    self.msg = msg;
    self
  }
}

/// A size-bounded record ready for the observer channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedRecord {
  /// Node id.
  pub id: String,
  /// Flow id.
  pub flow_id: String,
  /// Subflow template id.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alias_id: Option<String>,
  /// Flow path.
  pub path: String,
  /// Node name.
  pub name: String,
  /// Message topic.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub topic: Option<Value>,
  /// Selected property; present only in property mode.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub property: Option<String>,
  /// Description of the encoded value.
  pub format: String,
  /// The encoded value.
  pub msg: String,
}

/// Encodes a record, bounding strings and arrays to `max_length`.
///
/// Encoding never fails; oversized content is truncated.
pub fn encode_record(record: DebugRecord, max_length: usize) -> EncodedRecord {
  let (format, msg) = encode_value(record.msg.as_ref(), max_length);
  EncodedRecord {
    id: record.id,
    flow_id: record.flow_id,
    alias_id: record.alias_id,
    path: record.path,
    name: record.name,
    topic: record.topic,
    property: record.property,
    format,
    msg,
  }
}

fn encode_value(value: Option<&Value>, max_length: usize) -> (String, String) {
  match value {
    None => ("undefined".to_string(), "(undefined)".to_string()),
    Some(Value::Null) => ("null".to_string(), "null".to_string()),
    Some(Value::Bool(flag)) => ("boolean".to_string(), flag.to_string()),
    Some(Value::Number(number)) => ("number".to_string(), render_number(number)),
    Some(Value::String(text)) => (
      format!("string[{}]", text.chars().count()),
      truncate(text, max_length),
    ),
    Some(array @ Value::Array(items)) => (
      format!("array[{}]", items.len()),
      bounded(array, max_length).to_string(),
    ),
    Some(object @ Value::Object(_)) => ("Object".to_string(), bounded(object, max_length).to_string()),
  }
}

fn truncate(text: &str, max_length: usize) -> String {
  match text.char_indices().nth(max_length) {
    Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
    None => text.to_string(),
  }
}

/// Copy of `value` with every string and array bounded to `max_length`.
fn bounded(value: &Value, max_length: usize) -> Value {
  match value {
    Value::String(text) => Value::String(truncate(text, max_length)),
    Value::Array(items) if items.len() > max_length => json!({
      "__enc__": true,
      "type": "array",
      "data": items.iter().take(max_length).map(|item| bounded(item, max_length)).collect::<Vec<_>>(),
      "length": items.len(),
    }),
    Value::Array(items) => Value::Array(items.iter().map(|item| bounded(item, max_length)).collect()),
    Value::Object(map) => Value::Object(
      map
        .iter()
        .map(|(key, item)| (key.clone(), bounded(item, max_length)))
        .collect::<Map<String, Value>>(),
    ),
    other => other.clone(),
  }
}
