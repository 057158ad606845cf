//! # Host Collaborators
//!
//! Everything an inspector node needs from its host is injected at construction
//! through [`HostServices`]:
//!
//! - [`StatusSink`]: shows badges next to the node (fire-and-forget).
//! - [`LogSink`]: the append-only host log.
//! - [`Publisher`]: the observer channel that streams debug records to viewers.
//! - [`ExpressionCompiler`]: compiles output and status expressions.
//!
//! Default implementations route the status and log sinks through `tracing`, and
//! [`ObserverChannel`] is an in-process broadcast publisher.

use crate::expression::{ExpressionCompiler, PathExpressionCompiler};
use crate::record::EncodedRecord;
use crate::status::Badge;
use futures::Stream;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, error, info, warn};

/// Channel name debug records are published on.
pub const DEBUG_CHANNEL: &str = "debug";

/// Host status API.
pub trait StatusSink: Send + Sync {
  /// Shows a badge next to the node.
  fn set_status(&self, badge: &Badge);

  /// Removes the badge.
  fn clear_status(&self);
}

/// Host log sink.
pub trait LogSink: Send + Sync {
  /// Appends an informational line.
  fn log(&self, text: &str);

  /// Appends an error line.
  fn error(&self, text: &str);
}

/// Observer channel transport.
pub trait Publisher: Send + Sync {
  /// Publishes an encoded record on a named channel.
  fn publish(&self, channel: &str, record: EncodedRecord);
}

/// The collaborators injected into an inspector node.
#[derive(Clone)]
pub struct HostServices {
  /// Status API.
  pub status: Arc<dyn StatusSink>,
  /// Log sink.
  pub log: Arc<dyn LogSink>,
  /// Observer channel.
  pub publisher: Arc<dyn Publisher>,
  /// Expression compiler.
  pub compiler: Arc<dyn ExpressionCompiler>,
}

impl HostServices {
  /// Bundles host collaborators with the built-in expression compiler.
  pub fn new(
    status: Arc<dyn StatusSink>,
    log: Arc<dyn LogSink>,
    publisher: Arc<dyn Publisher>,
  ) -> Self {
    Self {
      status,
      log,
      publisher,
      compiler: Arc::new(PathExpressionCompiler),
    }
  }

  /// Replaces the expression compiler.
  #[must_use]
  pub fn with_compiler(mut self, compiler: Arc<dyn ExpressionCompiler>) -> Self {
    self.compiler = compiler;
    self
  }
}

impl fmt::Debug for HostServices {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HostServices").finish_non_exhaustive()
  }
}

/// Log sink writing through `tracing`, tagged with the node.
#[derive(Debug, Clone)]
pub struct TracingLogSink {
  node_id: String,
  name: String,
}

impl TracingLogSink {
  /// Creates a sink for one node.
  pub fn new(node_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      node_id: node_id.into(),
      name: name.into(),
    }
  }
}

impl LogSink for TracingLogSink {
  fn log(&self, text: &str) {
    info!(node = %self.node_id, name = %self.name, "{}", text);
  }

  fn error(&self, text: &str) {
    error!(node = %self.node_id, name = %self.name, "{}", text);
  }
}

/// Status sink writing badge changes through `tracing` at debug level.
#[derive(Debug, Clone)]
pub struct TracingStatusSink {
  node_id: String,
}

impl TracingStatusSink {
  /// Creates a sink for one node.
  pub fn new(node_id: impl Into<String>) -> Self {
    Self {
      node_id: node_id.into(),
    }
  }
}

impl StatusSink for TracingStatusSink {
  fn set_status(&self, badge: &Badge) {
    debug!(node = %self.node_id, fill = ?badge.fill, shape = ?badge.shape, text = %badge.text, "status");
  }

  fn clear_status(&self) {
    debug!(node = %self.node_id, "status cleared");
  }
}

/// An event delivered to observer-channel subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverEvent {
  /// Channel name.
  pub channel: String,
  /// The encoded record.
  pub record: EncodedRecord,
}

/// In-process observer channel backed by a broadcast queue.
///
/// Subscribers that fall behind by more than the capacity miss the oldest
/// records; publishing never blocks and never fails.
#[derive(Debug, Clone)]
pub struct ObserverChannel {
  sender: broadcast::Sender<ObserverEvent>,
}

impl Default for ObserverChannel {
  fn default() -> Self {
    Self::new(1024)
  }
}

impl ObserverChannel {
  /// Creates a channel buffering up to `capacity` records per subscriber.
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity.max(1));
    Self { sender }
  }

  /// Subscribes to every channel.
  pub fn subscribe(&self) -> impl Stream<Item = ObserverEvent> + Send + Unpin + 'static {
    BroadcastStream::new(self.sender.subscribe()).filter_map(|event| match event {
      Ok(event) => Some(event),
      Err(e) => {
        warn!(error = %e, "observer subscriber lagged");
        None
      }
    })
  }

  /// Number of live subscribers.
  pub fn subscriber_count(&self) -> usize {
    self.sender.receiver_count()
  }
}

impl Publisher for ObserverChannel {
  fn publish(&self, channel: &str, record: EncodedRecord) {
    // no subscribers is not an error
    let _ = self.sender.send(ObserverEvent {
      channel: channel.to_string(),
      record,
    });
  }
}
