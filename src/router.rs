//! # Output Routing
//!
//! Decides where an inspected value goes:
//!
//! - **Log sink** when console output is enabled. Whole messages and objects
//!   are rendered deeply on a fresh line; strings are logged as-is (on a fresh
//!   line when they span several); other primitives are rendered shallowly.
//! - **Observer channel** when the node is both active and publishing to the
//!   sidebar.

use crate::inspect::{DEEP_DEPTH, SHALLOW_DEPTH, render};
use crate::message::Message;
use serde_json::Value;

/// What is being routed.
#[derive(Debug, Clone, Copy)]
pub enum LogSubject<'a> {
  /// The whole message.
  EntireMessage(&'a Message),
  /// A value extracted from the message, or no value.
  Extracted(Option<&'a Value>),
}

/// Where one message's output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
  /// Line for the log sink, when console output is enabled.
  pub log: Option<String>,
  /// Whether to publish a record to the observer channel.
  pub publish: bool,
}

/// Output routing flags of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRouter {
  console: bool,
  to_sidebar: bool,
}

impl OutputRouter {
  /// Creates a router from the node's console and sidebar flags.
  pub fn new(console: bool, to_sidebar: bool) -> Self {
    Self {
      console,
      to_sidebar,
    }
  }

  /// Routes one subject; `active` is the node's current enabled state.
  pub fn route(&self, active: bool, subject: LogSubject<'_>) -> RouteDecision {
    RouteDecision {
      log: self.console.then(|| render_log_line(subject)),
      publish: active && self.to_sidebar,
    }
  }
}

/// Renders a subject for the log sink.
pub fn render_log_line(subject: LogSubject<'_>) -> String {
  match subject {
    LogSubject::EntireMessage(message) => {
      format!("\n{}", render(Some(&message.to_value()), DEEP_DEPTH))
    }
    LogSubject::Extracted(Some(Value::String(text))) => {
      if text.contains('\n') {
        format!("\n{text}")
      } else {
        text.clone()
      }
    }
    LogSubject::Extracted(Some(value @ (Value::Object(_) | Value::Array(_) | Value::Null))) => {
      format!("\n{}", render(Some(value), DEEP_DEPTH))
    }
    LogSubject::Extracted(value) => render(value, SHALLOW_DEPTH),
  }
}
