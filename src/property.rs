//! # Property Extraction
//!
//! Selects a sub-value of a message with a dotted/bracket path such as
//! `payload.readings[0]["sensor id"]`. A leading `msg.` is accepted and ignored.
//!
//! Extraction never fails: a missing intermediate key, an out-of-range index or
//! a selector that does not even parse all resolve to "no value" (`None`).

use crate::config::ENTIRE_MESSAGE;
use crate::message::Message;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

/// Property name reported for whole-message extraction.
const WHOLE_MESSAGE_PROPERTY: &str = "payload";

/// Contents of a `[...]` accessor: an index, or a single/double quoted key.
static BRACKET: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"^(?:(\d+)|'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")$"#)
    .expect("bracket accessor pattern is valid")
});

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
  /// Object key.
  Key(String),
  /// Array index (also matches the same key spelled as digits on an object).
  Index(usize),
}

/// Reason a selector failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
  /// The selector text.
  pub selector: String,
  /// Byte offset of the problem.
  pub position: usize,
}

impl fmt::Display for PathError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "invalid property expression '{}' at position {}",
      self.selector, self.position
    )
  }
}

impl std::error::Error for PathError {}

/// A parsed property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
  raw: String,
  segments: Vec<PathSegment>,
}

impl PropertyPath {
  /// Parses a dotted/bracket selector.
  ///
  /// # Errors
  ///
  /// Returns a [`PathError`] for empty selectors, empty segments and malformed
  /// bracket accessors.
  pub fn parse(selector: &str) -> Result<Self, PathError> {
    let body = selector.strip_prefix("msg.").unwrap_or(selector);
    let offset = selector.len() - body.len();
    let error = |position: usize| PathError {
      selector: selector.to_string(),
      position: offset + position,
    };

    if body.is_empty() {
      return Err(error(0));
    }

    let bytes = body.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;
    // true right after a closing bracket, where only '.' or '[' may follow
    let mut after_bracket = false;

    while i < bytes.len() {
      match bytes[i] {
        b'.' => {
          if !after_bracket {
            if i == start {
              return Err(error(i));
            }
            segments.push(PathSegment::Key(body[start..i].to_string()));
          }
          after_bracket = false;
          i += 1;
          start = i;
          if i == bytes.len() {
            return Err(error(i));
          }
        }
        b'[' => {
          if !after_bracket && i > start {
            segments.push(PathSegment::Key(body[start..i].to_string()));
          } else if !after_bracket && i == 0 {
            // a leading accessor is allowed: ["a b"].c
          } else if !after_bracket {
            return Err(error(i));
          }
          let close = find_bracket_end(bytes, i + 1).ok_or_else(|| error(i))?;
          let inner = &body[i + 1..close];
          segments.push(parse_bracket(inner).ok_or_else(|| error(i + 1))?);
          i = close + 1;
          start = i;
          after_bracket = true;
        }
        b']' => return Err(error(i)),
        _ if after_bracket => return Err(error(i)),
        _ => i += 1,
      }
    }
    if !after_bracket && start < bytes.len() {
      segments.push(PathSegment::Key(body[start..].to_string()));
    }

    Ok(Self {
      raw: selector.to_string(),
      segments,
    })
  }

  /// Returns the selector text this path was parsed from.
  pub fn as_str(&self) -> &str {
    &self.raw
  }

  /// Returns the parsed segments.
  pub fn segments(&self) -> &[PathSegment] {
    &self.segments
  }

  /// Looks the path up in a JSON value.
  pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
    walk(&self.segments, root)
  }

  /// Looks the path up in a message.
  pub fn lookup_message<'a>(&self, message: &'a Message) -> Option<&'a Value> {
    let (first, rest) = self.segments.split_first()?;
    let head = match first {
      PathSegment::Key(key) => message.get(key),
      PathSegment::Index(index) => message.get(&index.to_string()),
    }?;
    walk(rest, head)
  }
}

fn walk<'a>(segments: &[PathSegment], root: &'a Value) -> Option<&'a Value> {
  segments
    .iter()
    .try_fold(root, |current, segment| match (segment, current) {
      (PathSegment::Key(key), Value::Object(map)) => map.get(key),
      (PathSegment::Key(key), Value::Array(items)) => {
        key.parse::<usize>().ok().and_then(|index| items.get(index))
      }
      (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
      (PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
      _ => None,
    })
}

/// Finds the `]` closing a bracket accessor, skipping quoted content.
fn find_bracket_end(bytes: &[u8], from: usize) -> Option<usize> {
  let mut quote: Option<u8> = None;
  let mut i = from;
  while i < bytes.len() {
    let b = bytes[i];
    match quote {
      Some(_) if b == b'\\' => i += 1,
      Some(q) if b == q => quote = None,
      Some(_) => {}
      None if b == b'\'' || b == b'"' => quote = Some(b),
      None if b == b']' => return Some(i),
      None => {}
    }
    i += 1;
  }
  None
}

fn parse_bracket(inner: &str) -> Option<PathSegment> {
  let captures = BRACKET.captures(inner.trim())?;
  if let Some(index) = captures.get(1) {
    return index.as_str().parse().ok().map(PathSegment::Index);
  }
  let quoted = captures.get(2).or_else(|| captures.get(3))?;
  Some(PathSegment::Key(unescape(quoted.as_str())))
}

fn unescape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut chars = text.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(next) = chars.next() {
        out.push(next);
      }
    } else {
      out.push(c);
    }
  }
  out
}

/// A compiled output or status selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
  /// The whole message.
  EntireMessage,
  /// A valid property path.
  Path(PropertyPath),
  /// A selector that does not parse; it always yields no value.
  Unresolvable(String),
}

impl Selector {
  /// Compiles selector text. Unparseable text is kept as [`Selector::Unresolvable`].
  pub fn parse(selector: &str) -> Self {
    if selector == ENTIRE_MESSAGE {
      return Selector::EntireMessage;
    }
    Self::path(selector)
  }

  /// Compiles selector text as a property path only; the entire-message sentinel
  /// is treated as an ordinary key.
  pub fn path(selector: &str) -> Self {
    match PropertyPath::parse(selector) {
      Ok(path) => Selector::Path(path),
      Err(e) => {
        tracing::debug!(error = %e, "selector resolves to no value");
        Selector::Unresolvable(selector.to_string())
      }
    }
  }

  /// Property name reported alongside values extracted with this selector.
  pub fn property_name(&self) -> &str {
    match self {
      Selector::EntireMessage => WHOLE_MESSAGE_PROPERTY,
      Selector::Path(path) => path.as_str(),
      Selector::Unresolvable(raw) => raw,
    }
  }
}

/// A value extracted from a message, with the property it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
  /// The selected value; `None` when the property is missing.
  pub value: Option<Value>,
  /// The property name, `"payload"` for whole-message extraction.
  pub property: String,
}

/// Extracts the value a selector points at.
pub fn extract(message: &Message, selector: &Selector) -> Extraction {
  let value = match selector {
    Selector::EntireMessage => Some(message.to_value()),
    Selector::Path(path) => path.lookup_message(message).cloned(),
    Selector::Unresolvable(_) => None,
  };
  Extraction {
    value,
    property: selector.property_name().to_string(),
  }
}
