//! # Expressions
//!
//! Inspector nodes can reformat values with a declarative expression instead of
//! a plain property path. The expression engine is a collaborator behind two
//! traits:
//!
//! - [`ExpressionCompiler`]: compiles expression text once, at node construction.
//! - [`CompiledExpression`]: evaluates asynchronously against each message.
//!
//! [`PathExpressionCompiler`] is the built-in engine. It understands a small,
//! JSONata-flavoured subset:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `payload.a[0]`, `$.payload` | property path (missing → no value) |
//! | `$` | the whole message |
//! | `'text'`, `"text"`, `42` | literals |
//! | `a & b` | string concatenation (no value → empty text) |
//! | `$string(x)` | string form of `x` |
//! | `$error(x)` | fail evaluation with message `x` |
//! | `( x )` | grouping |

use crate::error::{InspectorError, InspectorResult};
use crate::inspect::render_number;
use crate::message::Message;
use crate::property::PropertyPath;
use async_trait::async_trait;
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

/// Context an expression is compiled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingContext {
  /// Id of the node owning the expression.
  pub node_id: String,
  /// Display name of the node owning the expression.
  pub node_name: String,
}

impl BindingContext {
  /// Creates a binding context for a node.
  pub fn new(node_id: impl Into<String>, node_name: impl Into<String>) -> Self {
    Self {
      node_id: node_id.into(),
      node_name: node_name.into(),
    }
  }
}

/// An expression compiled once and evaluated per message.
#[async_trait]
pub trait CompiledExpression: Send + Sync + fmt::Debug {
  /// Returns the source text of the expression.
  fn source(&self) -> &str;

  /// Evaluates the expression against a message.
  ///
  /// # Returns
  ///
  /// `Ok(Some(value))` for a result, `Ok(None)` when the expression selects
  /// nothing, or [`InspectorError::Evaluation`] when evaluation fails.
  async fn evaluate(&self, message: &Message) -> InspectorResult<Option<Value>>;
}

/// Compiles expression text into a [`CompiledExpression`].
pub trait ExpressionCompiler: Send + Sync {
  /// Compiles an expression.
  ///
  /// # Errors
  ///
  /// Returns [`InspectorError::InvalidExpression`] if the text does not compile.
  fn compile(
    &self,
    text: &str,
    context: &BindingContext,
  ) -> InspectorResult<Arc<dyn CompiledExpression>>;
}

/// Compiler for the built-in expression subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathExpressionCompiler;

impl ExpressionCompiler for PathExpressionCompiler {
  fn compile(
    &self,
    text: &str,
    context: &BindingContext,
  ) -> InspectorResult<Arc<dyn CompiledExpression>> {
    let invalid = |reason: String| InspectorError::InvalidExpression {
      expression: text.to_string(),
      reason,
    };
    let mut parser = Parser::new(text);
    let expr = parser.parse_concat().map_err(invalid)?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
      return Err(invalid(format!(
        "unexpected '{c}' at position {}",
        parser.pos
      )));
    }
    Ok(Arc::new(PathExpression {
      source: text.to_string(),
      node_id: context.node_id.clone(),
      expr,
    }))
  }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
  Context,
  Path(PropertyPath),
  Text(String),
  Number(Number),
  Concat(Vec<Expr>),
  ToString(Box<Expr>),
  Fail(Box<Expr>),
}

/// An expression compiled by [`PathExpressionCompiler`].
#[derive(Debug)]
pub struct PathExpression {
  source: String,
  node_id: String,
  expr: Expr,
}

#[async_trait]
impl CompiledExpression for PathExpression {
  fn source(&self) -> &str {
    &self.source
  }

  async fn evaluate(&self, message: &Message) -> InspectorResult<Option<Value>> {
    eval(&self.expr, message).map_err(|reason| {
      tracing::debug!(node = %self.node_id, expression = %self.source, %reason, "expression failed");
      InspectorError::Evaluation {
        expression: self.source.clone(),
        reason,
      }
    })
  }
}

fn eval(expr: &Expr, message: &Message) -> Result<Option<Value>, String> {
  match expr {
    Expr::Context => Ok(Some(message.to_value())),
    Expr::Path(path) => Ok(path.lookup_message(message).cloned()),
    Expr::Text(text) => Ok(Some(Value::String(text.clone()))),
    Expr::Number(number) => Ok(Some(Value::Number(number.clone()))),
    Expr::Concat(parts) => {
      let mut out = String::new();
      for part in parts {
        if let Some(value) = eval(part, message)? {
          out.push_str(&string_form(&value));
        }
      }
      Ok(Some(Value::String(out)))
    }
    Expr::ToString(inner) => Ok(eval(inner, message)?.map(|v| Value::String(string_form(&v)))),
    Expr::Fail(inner) => {
      let reason = eval(inner, message)?
        .map(|v| string_form(&v))
        .unwrap_or_else(|| "$error() called".to_string());
      Err(reason)
    }
  }
}

/// String form used by concatenation and `$string`.
fn string_form(value: &Value) -> String {
  match value {
    Value::String(text) => text.clone(),
    Value::Number(number) => render_number(number),
    other => other.to_string(),
  }
}

struct Parser<'a> {
  text: &'a str,
  pos: usize,
}

impl<'a> Parser<'a> {
  fn new(text: &'a str) -> Self {
    Self { text, pos: 0 }
  }

  fn peek(&self) -> Option<char> {
    self.text[self.pos..].chars().next()
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += c.len_utf8();
    Some(c)
  }

  fn skip_whitespace(&mut self) {
    while self.peek().is_some_and(char::is_whitespace) {
      self.bump();
    }
  }

  fn parse_concat(&mut self) -> Result<Expr, String> {
    let mut parts = vec![self.parse_term()?];
    loop {
      self.skip_whitespace();
      if self.peek() != Some('&') {
        break;
      }
      self.bump();
      parts.push(self.parse_term()?);
    }
    Ok(if parts.len() == 1 {
      parts.remove(0)
    } else {
      Expr::Concat(parts)
    })
  }

  fn parse_term(&mut self) -> Result<Expr, String> {
    self.skip_whitespace();
    match self.peek() {
      None => Err(format!("unexpected end of expression at position {}", self.pos)),
      Some(quote @ ('\'' | '"')) => {
        self.bump();
        self.parse_string(quote).map(Expr::Text)
      }
      Some('(') => {
        self.bump();
        let inner = self.parse_concat()?;
        self.expect(')')?;
        Ok(inner)
      }
      Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number(),
      Some('$') => self.parse_dollar(),
      Some(_) => self.parse_path(),
    }
  }

  fn expect(&mut self, wanted: char) -> Result<(), String> {
    self.skip_whitespace();
    match self.bump() {
      Some(c) if c == wanted => Ok(()),
      Some(c) => Err(format!("expected '{wanted}' but found '{c}' at position {}", self.pos - c.len_utf8())),
      None => Err(format!("expected '{wanted}' at end of expression")),
    }
  }

  fn parse_string(&mut self, quote: char) -> Result<String, String> {
    let start = self.pos;
    let mut out = String::new();
    while let Some(c) = self.bump() {
      match c {
        '\\' => match self.bump() {
          Some('n') => out.push('\n'),
          Some('t') => out.push('\t'),
          Some(other) => out.push(other),
          None => break,
        },
        c if c == quote => return Ok(out),
        c => out.push(c),
      }
    }
    Err(format!("unterminated string starting at position {}", start - 1))
  }

  fn parse_number(&mut self) -> Result<Expr, String> {
    let start = self.pos;
    if self.peek() == Some('-') {
      self.bump();
    }
    while self
      .peek()
      .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
      self.bump();
    }
    let literal = &self.text[start..self.pos];
    if let Ok(int) = literal.parse::<i64>() {
      return Ok(Expr::Number(Number::from(int)));
    }
    literal
      .parse::<f64>()
      .ok()
      .and_then(Number::from_f64)
      .map(Expr::Number)
      .ok_or_else(|| format!("invalid number '{literal}' at position {start}"))
  }

  fn parse_dollar(&mut self) -> Result<Expr, String> {
    let start = self.pos;
    self.bump();
    match self.peek() {
      Some('.') => {
        self.bump();
        self.parse_path()
      }
      Some(c) if c.is_ascii_alphabetic() => {
        let name_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
          self.bump();
        }
        let name = &self.text[name_start..self.pos];
        let wrap: fn(Box<Expr>) -> Expr = match name {
          "string" => Expr::ToString,
          "error" => Expr::Fail,
          other => return Err(format!("unknown function '${other}' at position {start}")),
        };
        self.expect('(')?;
        let argument = self.parse_concat()?;
        self.expect(')')?;
        Ok(wrap(Box::new(argument)))
      }
      _ => Ok(Expr::Context),
    }
  }

  fn parse_path(&mut self) -> Result<Expr, String> {
    let start = self.pos;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    while let Some(c) = self.peek() {
      match (quote, c) {
        (Some(_), '\\') => {
          self.bump();
        }
        (Some(q), c) if c == q => quote = None,
        (Some(_), _) => {}
        (None, '\'' | '"') => quote = Some(c),
        (None, '[') => depth += 1,
        (None, ']') => depth = depth.saturating_sub(1),
        (None, c) if depth == 0 && (c.is_whitespace() || matches!(c, '&' | '(' | ')')) => break,
        (None, _) => {}
      }
      self.bump();
    }
    let raw = &self.text[start..self.pos];
    PropertyPath::parse(raw)
      .map(Expr::Path)
      .map_err(|e| e.to_string())
  }
}
