//! # Error Handling
//!
//! Errors raised by inspector nodes and their collaborators.
//!
//! Only [`InspectorError::InvalidExpression`] is fatal, and only to the node that
//! owns the expression: the node logs it once and turns inert. Evaluation
//! failures abort the pipeline of a single message. A missing property is not an
//! error at all, it resolves to "no value".

use thiserror::Error;

/// Error type for inspector node operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectorError {
  /// An expression failed to compile.
  #[error("invalid expression: {expression}: {reason}")]
  InvalidExpression {
    /// The expression source text.
    expression: String,
    /// Why compilation failed.
    reason: String,
  },
  /// An expression failed while being evaluated against a message.
  #[error("invalid expression: {expression}: {reason}")]
  Evaluation {
    /// The expression source text.
    expression: String,
    /// Why evaluation failed.
    reason: String,
  },
  /// A node definition could not be decoded.
  #[error("configuration error: {0}")]
  Config(String),
  /// The node has been closed and no longer accepts work.
  #[error("inspector node {0} is closed")]
  Closed(String),
}

/// Convenience alias for results carrying an [`InspectorError`].
pub type InspectorResult<T> = Result<T, InspectorError>;

/// Error type for the administration server.
#[derive(Error, Debug)]
pub enum AdminError {
  /// The bind address could not be parsed or bound.
  #[error("failed to bind {address}: {source}")]
  Bind {
    /// The configured address.
    address: String,
    /// The underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Any other I/O failure while serving.
  #[error("admin server I/O error: {0}")]
  Io(#[from] std::io::Error),
}
