//! # Test Support
//!
//! Recording fakes for the host collaborators, plus an expression compiler
//! whose evaluations take a configurable amount of (tokio) time.

use crate::config::{InspectorConfig, InspectorSettings, NodeIdentity};
use crate::error::{InspectorError, InspectorResult};
use crate::expression::{BindingContext, CompiledExpression, ExpressionCompiler, PathExpressionCompiler};
use crate::host::{HostServices, LogSink, Publisher, StatusSink};
use crate::message::Message;
use crate::node::InspectorNode;
use crate::record::EncodedRecord;
use crate::status::Badge;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A status API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
  Set(Badge),
  Cleared,
}

#[derive(Debug, Default)]
pub struct RecordingStatus {
  events: Mutex<Vec<StatusEvent>>,
}

impl RecordingStatus {
  pub fn events(&self) -> Vec<StatusEvent> {
    self.events.lock().unwrap().clone()
  }

  pub fn badges(&self) -> Vec<Badge> {
    self
      .events()
      .into_iter()
      .filter_map(|event| match event {
        StatusEvent::Set(badge) => Some(badge),
        StatusEvent::Cleared => None,
      })
      .collect()
  }

  /// Counter badges only (blue rings).
  pub fn counter_flushes(&self) -> Vec<String> {
    self
      .badges()
      .into_iter()
      .filter(|badge| *badge == Badge::counter(badge.text.parse().unwrap_or(u64::MAX)))
      .map(|badge| badge.text)
      .collect()
  }

  /// Every badge that is not a counter badge.
  pub fn content_badges(&self) -> Vec<Badge> {
    self
      .badges()
      .into_iter()
      .filter(|badge| *badge != Badge::counter(badge.text.parse().unwrap_or(u64::MAX)))
      .collect()
  }

  pub fn clear(&self) {
    self.events.lock().unwrap().clear();
  }
}

impl StatusSink for RecordingStatus {
  fn set_status(&self, badge: &Badge) {
    self.events.lock().unwrap().push(StatusEvent::Set(badge.clone()));
  }

  fn clear_status(&self) {
    self.events.lock().unwrap().push(StatusEvent::Cleared);
  }
}

#[derive(Debug, Default)]
pub struct RecordingLog {
  lines: Mutex<Vec<String>>,
  errors: Mutex<Vec<String>>,
}

impl RecordingLog {
  pub fn lines(&self) -> Vec<String> {
    self.lines.lock().unwrap().clone()
  }

  pub fn errors(&self) -> Vec<String> {
    self.errors.lock().unwrap().clone()
  }
}

impl LogSink for RecordingLog {
  fn log(&self, text: &str) {
    self.lines.lock().unwrap().push(text.to_string());
  }

  fn error(&self, text: &str) {
    self.errors.lock().unwrap().push(text.to_string());
  }
}

#[derive(Debug, Default)]
pub struct RecordingPublisher {
  records: Mutex<Vec<(String, EncodedRecord)>>,
}

impl RecordingPublisher {
  pub fn records(&self) -> Vec<EncodedRecord> {
    self
      .records
      .lock()
      .unwrap()
      .iter()
      .map(|(_, record)| record.clone())
      .collect()
  }

  pub fn channels(&self) -> Vec<String> {
    self
      .records
      .lock()
      .unwrap()
      .iter()
      .map(|(channel, _)| channel.clone())
      .collect()
  }
}

impl Publisher for RecordingPublisher {
  fn publish(&self, channel: &str, record: EncodedRecord) {
    self
      .records
      .lock()
      .unwrap()
      .push((channel.to_string(), record));
  }
}

/// Compiler whose expressions wait `payload.delay_ms` milliseconds before
/// delegating to the built-in engine.
#[derive(Debug, Default)]
pub struct DelayedCompiler;

#[derive(Debug)]
struct DelayedExpression {
  inner: Arc<dyn CompiledExpression>,
}

impl ExpressionCompiler for DelayedCompiler {
  fn compile(
    &self,
    text: &str,
    context: &BindingContext,
  ) -> InspectorResult<Arc<dyn CompiledExpression>> {
    Ok(Arc::new(DelayedExpression {
      inner: PathExpressionCompiler.compile(text, context)?,
    }))
  }
}

#[async_trait]
impl CompiledExpression for DelayedExpression {
  fn source(&self) -> &str {
    self.inner.source()
  }

  async fn evaluate(&self, message: &Message) -> Result<Option<Value>, InspectorError> {
    let delay = message
      .payload()
      .and_then(|payload| payload.get("delay_ms"))
      .and_then(Value::as_u64)
      .unwrap_or(0);
    tokio::time::sleep(Duration::from_millis(delay)).await;
    self.inner.evaluate(message).await
  }
}

/// Host fakes wired into [`HostServices`].
#[derive(Debug, Default, Clone)]
pub struct TestHost {
  pub status: Arc<RecordingStatus>,
  pub log: Arc<RecordingLog>,
  pub publisher: Arc<RecordingPublisher>,
}

impl TestHost {
  pub fn services(&self) -> HostServices {
    HostServices::new(self.status.clone(), self.log.clone(), self.publisher.clone())
  }

  pub fn delayed_services(&self) -> HostServices {
    self.services().with_compiler(Arc::new(DelayedCompiler))
  }

  /// Builds a node with identity `n1` in flow `f1`.
  pub fn node(&self, config: InspectorConfig) -> InspectorNode {
    InspectorNode::new(
      NodeIdentity::new("n1", "f1"),
      config,
      InspectorSettings::default(),
      self.services(),
    )
  }
}
