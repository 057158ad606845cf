//! # Inspector Configuration
//!
//! Three layers of configuration feed an inspector node:
//!
//! - [`NodeDefinition`]: the node record exactly as the host stores it in a flow
//!   file (loosely typed, legacy field names).
//! - [`InspectorConfig`]: the typed, validated configuration the node runs with.
//!   Immutable after construction.
//! - [`InspectorSettings`]: process-wide tuning shared by every node.
//!
//! Plus [`NodeIdentity`], the identifiers the host assigns to a node instance.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use streamweave_inspector::config::{InspectorConfig, OutputMode};
//!
//! let config = InspectorConfig::from_json(json!({
//!   "name": "probe",
//!   "complete": "payload.temperature",
//!   "console": "true",
//!   "tostatus": true
//! }))
//! .unwrap();
//! assert_eq!(config.output, OutputMode::Property("payload.temperature".to_string()));
//! assert!(config.console);
//! ```

use crate::error::{InspectorError, InspectorResult};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Selector value meaning "the entire message".
pub const ENTIRE_MESSAGE: &str = "true";

/// Target type marking `complete` as an expression rather than a property path.
const EXPRESSION_TARGET_TYPE: &str = "jsonata";

/// Status type selecting a message property as the status source.
const PROPERTY_STATUS_TYPE: &str = "msg";

/// Node record in the host's flow-file format.
///
/// Every field is optional; [`InspectorConfig::from`] applies the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
  /// Display name of the node.
  #[serde(default)]
  pub name: Option<String>,
  /// Property path, the entire-message sentinel `"true"`, or expression text.
  #[serde(default)]
  pub complete: Option<Value>,
  /// `"jsonata"` when `complete` holds an expression.
  #[serde(default)]
  pub target_type: Option<String>,
  /// Console logging flag; a boolean or the strings `"true"`/`"false"`.
  #[serde(default)]
  pub console: Option<Value>,
  /// Whether the content status badge is enabled.
  #[serde(default, rename = "tostatus")]
  pub to_status: Option<bool>,
  /// `"auto"`, `"jsonata"` or `"msg"`.
  #[serde(default)]
  pub status_type: Option<String>,
  /// Status expression text or property path.
  #[serde(default)]
  pub status_val: Option<String>,
  /// Whether records are published to the observer channel.
  #[serde(default, rename = "tosidebar")]
  pub to_sidebar: Option<bool>,
  /// Whether the node starts enabled.
  #[serde(default)]
  pub active: Option<bool>,
}

/// Where the value routed to the log and observer channel comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
  /// The whole message.
  EntireMessage,
  /// A property selected by a dotted/bracket path.
  Property(String),
  /// The result of an expression.
  Expression(String),
}

/// Where the content status badge gets its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSource {
  /// Reuse the output value, honouring `error`/`status` envelopes.
  Auto,
  /// A property selected by a dotted/bracket path.
  Property(String),
  /// The result of an expression.
  Expression(String),
}

impl StatusSource {
  /// Returns whether this is the auto source.
  pub fn is_auto(&self) -> bool {
    matches!(self, StatusSource::Auto)
  }
}

/// Typed configuration of one inspector node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
  /// Display name.
  pub name: String,
  /// Output value source.
  pub output: OutputMode,
  /// Log each value to the host log sink.
  pub console: bool,
  /// Maintain a content status badge.
  pub to_status: bool,
  /// Content status source.
  pub status: StatusSource,
  /// Publish records to the observer channel.
  pub to_sidebar: bool,
  /// Initial enabled state; toggled at runtime through the admin surface.
  pub active: bool,
}

impl Default for InspectorConfig {
  fn default() -> Self {
    Self {
      name: String::new(),
      output: OutputMode::Property("payload".to_string()),
      console: false,
      to_status: false,
      status: StatusSource::Auto,
      to_sidebar: true,
      active: true,
    }
  }
}

impl InspectorConfig {
  /// Decodes a node record in the host's flow-file format.
  ///
  /// # Errors
  ///
  /// Returns [`InspectorError::Config`] if the value is not a valid node record.
  pub fn from_json(value: Value) -> InspectorResult<Self> {
    let definition: NodeDefinition =
      serde_json::from_value(value).map_err(|e| InspectorError::Config(e.to_string()))?;
    Ok(Self::from(definition))
  }

  /// Sets the display name.
  #[must_use]
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  /// Sets the output mode.
  #[must_use]
  pub fn with_output(mut self, output: OutputMode) -> Self {
    self.output = output;
    self
  }

  /// Enables or disables console logging.
  #[must_use]
  pub fn with_console(mut self, console: bool) -> Self {
    self.console = console;
    self
  }

  /// Enables or disables the content status badge.
  #[must_use]
  pub fn with_to_status(mut self, to_status: bool) -> Self {
    self.to_status = to_status;
    self
  }

  /// Sets the content status source.
  #[must_use]
  pub fn with_status(mut self, status: StatusSource) -> Self {
    self.status = status;
    self
  }

  /// Enables or disables observer-channel publishing.
  #[must_use]
  pub fn with_to_sidebar(mut self, to_sidebar: bool) -> Self {
    self.to_sidebar = to_sidebar;
    self
  }

  /// Sets the initial enabled state.
  #[must_use]
  pub fn with_active(mut self, active: bool) -> Self {
    self.active = active;
    self
  }
}

impl From<NodeDefinition> for InspectorConfig {
  fn from(definition: NodeDefinition) -> Self {
    let complete = definition.complete.as_ref().and_then(truthy_text);
    let expression_mode =
      definition.target_type.as_deref() == Some(EXPRESSION_TARGET_TYPE);

    let output = if expression_mode {
      OutputMode::Expression(complete.clone().unwrap_or_default())
    } else {
      match complete.as_deref() {
        None | Some("false") => OutputMode::Property("payload".to_string()),
        Some(ENTIRE_MESSAGE) => OutputMode::EntireMessage,
        Some(path) => OutputMode::Property(path.to_string()),
      }
    };

    // The status value falls back to the output selector, never to an expression.
    let status_val = definition
      .status_val
      .filter(|value| !value.is_empty())
      .or_else(|| match &output {
        OutputMode::EntireMessage => Some(ENTIRE_MESSAGE.to_string()),
        OutputMode::Property(path) => Some(path.clone()),
        OutputMode::Expression(_) => None,
      })
      .unwrap_or_default();

    let status = match definition.status_type.as_deref() {
      Some(EXPRESSION_TARGET_TYPE) => StatusSource::Expression(status_val),
      Some(PROPERTY_STATUS_TYPE) => StatusSource::Property(status_val),
      _ => StatusSource::Auto,
    };

    let console = match definition.console {
      Some(Value::Bool(flag)) => flag,
      Some(Value::String(text)) => text == "true",
      _ => false,
    };

    Self {
      name: definition.name.unwrap_or_default(),
      output,
      console,
      to_status: definition.to_status.unwrap_or(false),
      status,
      to_sidebar: definition.to_sidebar.unwrap_or(true),
      active: definition.active.unwrap_or(true),
    }
  }
}

/// Text of a flow-file value, or `None` when the value is falsy.
fn truthy_text(value: &Value) -> Option<String> {
  match value {
    Value::Null | Value::Bool(false) => None,
    Value::String(text) if text.is_empty() => None,
    Value::String(text) => Some(text.clone()),
    Value::Bool(true) => Some(ENTIRE_MESSAGE.to_string()),
    other => Some(other.to_string()),
  }
}

/// Identifiers assigned to a node instance by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
  /// Node id; echo detection compares against it.
  pub id: String,
  /// Id of the flow containing the node.
  pub flow_id: String,
  /// Id of the template node when this instance lives inside a subflow.
  pub alias_id: Option<String>,
  /// Path of the flow within nested subflows.
  pub path: String,
}

impl NodeIdentity {
  /// Creates an identity for a node in a top-level flow.
  pub fn new(id: impl Into<String>, flow_id: impl Into<String>) -> Self {
    let flow_id = flow_id.into();
    Self {
      id: id.into(),
      path: flow_id.clone(),
      flow_id,
      alias_id: None,
    }
  }

  /// Sets the subflow alias id.
  #[must_use]
  pub fn with_alias(mut self, alias_id: impl Into<String>) -> Self {
    self.alias_id = Some(alias_id.into());
    self
  }

  /// Sets the flow path.
  #[must_use]
  pub fn with_path(mut self, path: impl Into<String>) -> Self {
    self.path = path.into();
    self
  }
}

/// Process-wide settings shared by every inspector node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorSettings {
  /// Maximum length of strings and arrays in encoded debug records (default: 1000).
  pub debug_max_length: usize,
  /// Period of the counter badge tick (default: 1 second).
  pub tick_interval: Duration,
  /// Inter-arrival gap above which a message flushes the counter immediately
  /// (default: 100 milliseconds).
  pub burst_gap: Duration,
  /// Capacity of a node's command queue (default: 64).
  pub command_buffer: usize,
}

impl Default for InspectorSettings {
  fn default() -> Self {
    Self {
      debug_max_length: 1000,
      tick_interval: Duration::from_millis(1000),
      burst_gap: Duration::from_millis(100),
      command_buffer: 64,
    }
  }
}

impl InspectorSettings {
  /// Sets the maximum encoded length.
  #[must_use]
  pub fn with_debug_max_length(mut self, max_length: usize) -> Self {
    self.debug_max_length = max_length;
    self
  }

  /// Sets the counter tick period.
  #[must_use]
  pub fn with_tick_interval(mut self, interval: Duration) -> Self {
    self.tick_interval = interval;
    self
  }

  /// Sets the immediate-flush gap.
  #[must_use]
  pub fn with_burst_gap(mut self, gap: Duration) -> Self {
    self.burst_gap = gap;
    self
  }

  /// Sets the command queue capacity.
  #[must_use]
  pub fn with_command_buffer(mut self, capacity: usize) -> Self {
    self.command_buffer = capacity.max(1);
    self
  }
}
