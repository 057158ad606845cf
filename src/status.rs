//! # Status Badges
//!
//! A badge is the compact indicator shown next to a node: a fill colour, a shape
//! and at most 32 characters of text.
//!
//! The [`StatusFormatter`] turns whatever value the status pipeline resolved into
//! a badge:
//!
//! 1. A value that already looks like a badge (an object with `fill`, `shape` and
//!    `text`) passes through as [`StatusContent::Preformatted`].
//! 2. Anything else is [`StatusContent::Raw`]: its text is the string itself or a
//!    deep rendering, on a grey dot.
//! 3. In auto mode, an `error` envelope on the message turns the badge red with
//!    the error message, and a `status` envelope replaces the badge entirely.
//!    The status envelope is applied last and wins.
//! 4. Text longer than 32 characters is cut to 32 and suffixed with `...`.

use crate::inspect::{DEEP_DEPTH, render};
use crate::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of characters of badge text before truncation.
pub const MAX_STATUS_TEXT: usize = 32;

/// Marker appended to truncated badge text.
pub const ELLIPSIS: &str = "...";

/// Badge fill colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
  /// Red.
  Red,
  /// Green.
  Green,
  /// Yellow.
  Yellow,
  /// Blue.
  Blue,
  /// Grey.
  Grey,
}

impl Fill {
  /// Parses a colour name; `gray` is accepted for grey.
  pub fn parse(name: &str) -> Option<Self> {
    match name {
      "red" => Some(Fill::Red),
      "green" => Some(Fill::Green),
      "yellow" => Some(Fill::Yellow),
      "blue" => Some(Fill::Blue),
      "grey" | "gray" => Some(Fill::Grey),
      _ => None,
    }
  }
}

/// Badge shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
  /// Hollow ring.
  Ring,
  /// Filled dot.
  Dot,
}

impl Shape {
  /// Parses a shape name.
  pub fn parse(name: &str) -> Option<Self> {
    match name {
      "ring" => Some(Shape::Ring),
      "dot" => Some(Shape::Dot),
      _ => None,
    }
  }
}

/// A status badge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Badge {
  /// Fill colour.
  pub fill: Fill,
  /// Shape.
  pub shape: Shape,
  /// Short text.
  pub text: String,
}

impl Badge {
  /// Creates a badge.
  pub fn new(fill: Fill, shape: Shape, text: impl Into<String>) -> Self {
    Self {
      fill,
      shape,
      text: text.into(),
    }
  }

  /// The counter badge: a blue ring showing a message count.
  pub fn counter(count: u64) -> Self {
    Self::new(Fill::Blue, Shape::Ring, count.to_string())
  }

  /// The badge shown when a status-enabled node starts: a grey ring, no text.
  pub fn initial() -> Self {
    Self::new(Fill::Grey, Shape::Ring, "")
  }

  /// Deterministic serialization used for change detection.
  pub fn serialized(&self) -> String {
    // field order is fixed by the struct, so equal badges serialize equally
    serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
  }

  /// Returns the badge with its text truncated to [`MAX_STATUS_TEXT`].
  #[must_use]
  pub fn truncated(mut self) -> Self {
    self.text = truncate_text(&self.text);
    self
  }
}

/// Truncates text to [`MAX_STATUS_TEXT`] characters plus [`ELLIPSIS`].
pub fn truncate_text(text: &str) -> String {
  match text.char_indices().nth(MAX_STATUS_TEXT) {
    Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
    None => text.to_string(),
  }
}

/// The resolved content of the status pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusContent {
  /// An arbitrary value, or no value.
  Raw(Option<Value>),
  /// A value that is already shaped like a badge.
  Preformatted(Badge),
}

impl StatusContent {
  /// Classifies a value by shape: objects carrying `fill`, `shape` and `text`
  /// are preformatted badges.
  pub fn classify(value: Option<Value>) -> Self {
    match value {
      Some(Value::Object(map))
        if map.contains_key("fill") && map.contains_key("shape") && map.contains_key("text") =>
      {
        StatusContent::Preformatted(Badge::new(
          field_str(&map, "fill").and_then(Fill::parse).unwrap_or(Fill::Grey),
          field_str(&map, "shape").and_then(Shape::parse).unwrap_or(Shape::Dot),
          text_of(map.get("text")),
        ))
      }
      other => StatusContent::Raw(other),
    }
  }

  /// Renders the content as a badge, before overrides and truncation.
  pub fn into_badge(self) -> Badge {
    match self {
      StatusContent::Preformatted(badge) => badge,
      StatusContent::Raw(value) => Badge::new(Fill::Grey, Shape::Dot, text_of(value.as_ref())),
    }
  }
}

fn field_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
  map.get(key).and_then(Value::as_str)
}

/// Badge text of a value: strings verbatim, anything else rendered deeply.
fn text_of(value: Option<&Value>) -> String {
  match value {
    Some(Value::String(text)) => text.clone(),
    other => render(other, DEEP_DEPTH),
  }
}

/// Formats resolved status values into badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFormatter {
  auto: bool,
}

impl StatusFormatter {
  /// Creates a formatter; `auto` enables the `error`/`status` envelope overrides.
  pub fn new(auto: bool) -> Self {
    Self { auto }
  }

  /// Formats a resolved value for a message.
  pub fn format(&self, value: Option<Value>, message: &Message) -> Badge {
    let mut badge = StatusContent::classify(value).into_badge();

    if self.auto {
      if let Some(error) = message.error() {
        badge.fill = Fill::Red;
        badge.text = match error {
          Value::Object(map) => map.get("message").map(|m| text_of(Some(m))).unwrap_or_default(),
          other => text_of(Some(other)),
        };
      }
      if let Some(status) = message.status() {
        let envelope = status.as_object();
        let field = |key: &str| envelope.and_then(|map| map.get(key));
        badge.fill = field("fill")
          .and_then(Value::as_str)
          .and_then(Fill::parse)
          .unwrap_or(Fill::Grey);
        badge.shape = field("shape")
          .and_then(Value::as_str)
          .and_then(Shape::parse)
          .unwrap_or(Shape::Ring);
        badge.text = match field("text") {
          None | Some(Value::Null) => String::new(),
          Some(Value::String(text)) => text.clone(),
          Some(other) => text_of(Some(other)),
        };
      }
    }

    badge.truncated()
  }
}
