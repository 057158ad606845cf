//! # Value Rendering
//!
//! Single-line, human-readable rendering of message values for logs and status
//! text. Strings are quoted, object keys are bare when they are identifiers,
//! and anything nested deeper than the depth cap collapses to `[Object]` or
//! `[Array]`.
//!
//! ```rust
//! use serde_json::json;
//! use streamweave_inspector::inspect::{render, DEEP_DEPTH};
//!
//! let value = json!({"a": [1, "two"], "b c": null});
//! assert_eq!(render(Some(&value), DEEP_DEPTH), "{ a: [ 1, 'two' ], 'b c': null }");
//! assert_eq!(render(None, DEEP_DEPTH), "undefined");
//! ```

use serde_json::{Number, Value};

/// Depth cap for deep renderings (whole messages, objects, status text).
pub const DEEP_DEPTH: usize = 10;

/// Depth cap for shallow renderings.
pub const SHALLOW_DEPTH: usize = 2;

/// Renders a value, or `undefined` for no value.
pub fn render(value: Option<&Value>, depth: usize) -> String {
  let mut out = String::new();
  match value {
    Some(value) => render_into(&mut out, value, 0, depth),
    None => out.push_str("undefined"),
  }
  out
}

/// Renders a JSON number the way a script runtime prints it: integral floats
/// lose their fractional part.
pub fn render_number(number: &Number) -> String {
  match number.as_f64() {
    Some(f) if number.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
      format!("{}", f as i128)
    }
    _ => number.to_string(),
  }
}

fn render_into(out: &mut String, value: &Value, level: usize, depth: usize) {
  match value {
    Value::Null => out.push_str("null"),
    Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
    Value::Number(number) => out.push_str(&render_number(number)),
    Value::String(text) => push_quoted(out, text),
    Value::Array(items) if items.is_empty() => out.push_str("[]"),
    Value::Array(_) if level > depth => out.push_str("[Array]"),
    Value::Array(items) => {
      out.push_str("[ ");
      for (i, item) in items.iter().enumerate() {
        if i > 0 {
          out.push_str(", ");
        }
        render_into(out, item, level + 1, depth);
      }
      out.push_str(" ]");
    }
    Value::Object(map) if map.is_empty() => out.push_str("{}"),
    Value::Object(_) if level > depth => out.push_str("[Object]"),
    Value::Object(map) => {
      out.push_str("{ ");
      for (i, (key, item)) in map.iter().enumerate() {
        if i > 0 {
          out.push_str(", ");
        }
        if is_identifier(key) {
          out.push_str(key);
        } else {
          push_quoted(out, key);
        }
        out.push_str(": ");
        render_into(out, item, level + 1, depth);
      }
      out.push_str(" }");
    }
  }
}

fn push_quoted(out: &mut String, text: &str) {
  out.push('\'');
  for c in text.chars() {
    match c {
      '\'' => out.push_str("\\'"),
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c => out.push(c),
    }
  }
  out.push('\'');
}

fn is_identifier(key: &str) -> bool {
  let mut chars = key.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
