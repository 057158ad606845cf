//! # Inspector Node
//!
//! The per-node state machine. One [`InspectorNode`] owns the runtime state of
//! one inspected graph node (counter, last badge, enabled flag) and is driven by
//! four events:
//!
//! - [`admit`](InspectorNode::admit): a message arrived. Runs the feedback guard,
//!   counts the message and possibly flushes the counter badge, all
//!   synchronously. Returns the [`PendingWork`] for the message.
//! - [`PendingWork::run`]: resolves the output and status values. This is the
//!   only step that may suspend (expression evaluation) and it does not touch
//!   node state, so several messages can be in flight at once.
//! - [`complete`](InspectorNode::complete): applies a finished [`WorkOutcome`]:
//!   formats and gates the content badge, then logs and publishes.
//! - [`tick`](InspectorNode::tick) / [`close`](InspectorNode::close): the
//!   periodic counter flush and node stop.
//!
//! Because the counter flush happens in `admit` and the content badge in
//! `complete`, a message's counter flush always precedes its content badge.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use serde_json::json;
//! # use streamweave_inspector::config::{InspectorConfig, InspectorSettings, NodeIdentity};
//! # use streamweave_inspector::host::{HostServices, ObserverChannel, TracingLogSink, TracingStatusSink};
//! # use streamweave_inspector::message::Message;
//! # use streamweave_inspector::node::{Disposition, InspectorNode};
//! # async fn run() {
//! let host = HostServices::new(
//!   Arc::new(TracingStatusSink::new("n1")),
//!   Arc::new(TracingLogSink::new("n1", "")),
//!   Arc::new(ObserverChannel::default()),
//! );
//! let mut node = InspectorNode::new(
//!   NodeIdentity::new("n1", "f1"),
//!   InspectorConfig::default(),
//!   InspectorSettings::default(),
//!   host,
//! );
//! let disposition = node.handle(Message::from(json!({"payload": 1}))).await;
//! assert_eq!(disposition, Disposition::Processed);
//! node.close();
//! # }
//! ```

use crate::config::{InspectorConfig, InspectorSettings, NodeIdentity, OutputMode, StatusSource};
use crate::counter::ThroughputCounter;
use crate::emitter::ChangeGatedEmitter;
use crate::error::InspectorResult;
use crate::expression::{BindingContext, CompiledExpression, ExpressionCompiler};
use crate::guard::is_echo;
use crate::host::{DEBUG_CHANNEL, HostServices};
use crate::message::Message;
use crate::property::{Selector, extract};
use crate::record::{DebugRecord, encode_record};
use crate::router::{LogSubject, OutputRouter};
use crate::status::{Badge, StatusFormatter};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, trace};

/// How the handling of one message ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
  /// The message went through the status and output pipelines.
  Processed,
  /// An expression failed; the failure was logged and the message dropped.
  Failed,
  /// The message echoed this node's own status and was ignored.
  Echo,
  /// The node's expression did not compile; the message was ignored.
  Inert,
  /// The node was closed before the message finished; nothing was emitted.
  Stale,
}

/// Result of admitting a message.
#[derive(Debug)]
pub enum Admission {
  /// The message was counted and needs its pipelines run.
  Accepted(PendingWork),
  /// The message was not processed.
  Skipped(Disposition),
}

/// A source of values: a selector or a compiled expression.
#[derive(Debug, Clone)]
enum ValueSource {
  Selector(Selector),
  Expression(Arc<dyn CompiledExpression>),
}

impl ValueSource {
  fn compile(
    mode: &OutputMode,
    compiler: &dyn ExpressionCompiler,
    context: &BindingContext,
  ) -> InspectorResult<Self> {
    Ok(match mode {
      OutputMode::EntireMessage => ValueSource::Selector(Selector::EntireMessage),
      OutputMode::Property(path) => ValueSource::Selector(Selector::parse(path)),
      OutputMode::Expression(text) => ValueSource::Expression(compiler.compile(text, context)?),
    })
  }

  async fn resolve(&self, message: &Message) -> InspectorResult<OutputValue> {
    match self {
      ValueSource::Selector(selector) => {
        let extraction = extract(message, selector);
        let property = match selector {
          Selector::EntireMessage => None,
          _ => Some(extraction.property),
        };
        Ok(OutputValue {
          value: extraction.value,
          property,
        })
      }
      ValueSource::Expression(expression) => Ok(OutputValue {
        value: expression.evaluate(message).await?,
        property: None,
      }),
    }
  }
}

/// Where the content badge gets its value.
#[derive(Debug, Clone)]
enum StatusPlan {
  Disabled,
  Auto,
  Resolve(ValueSource),
}

/// Compiled pipelines of a node, shared with in-flight work.
#[derive(Debug)]
struct Pipeline {
  output: ValueSource,
  status: StatusPlan,
}

impl Pipeline {
  fn entire_message(&self) -> bool {
    matches!(self.output, ValueSource::Selector(Selector::EntireMessage))
  }
}

/// The output value of one message.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputValue {
  /// The value; `None` when nothing was selected.
  pub value: Option<Value>,
  /// The selected property, in property mode only.
  pub property: Option<String>,
}

/// The pipelines of one admitted message, ready to run.
#[derive(Debug)]
pub struct PendingWork {
  message: Message,
  pipeline: Arc<Pipeline>,
}

impl PendingWork {
  /// Resolves the output and status values of the message.
  ///
  /// Does not touch node state; the result is applied with
  /// [`InspectorNode::complete`].
  pub async fn run(self) -> WorkOutcome {
    let output = self.pipeline.output.resolve(&self.message).await;
    let status = match &self.pipeline.status {
      StatusPlan::Disabled => None,
      StatusPlan::Auto if self.pipeline.entire_message() => {
        Some(Ok(self.message.payload().cloned()))
      }
      // reuses the output value; an output failure is reported once, by the output
      StatusPlan::Auto => output.as_ref().ok().map(|out| Ok(out.value.clone())),
      StatusPlan::Resolve(source) => Some(source.resolve(&self.message).await.map(|out| out.value)),
    };
    WorkOutcome {
      message: self.message,
      output,
      status,
    }
  }
}

/// The resolved values of one message.
#[derive(Debug)]
pub struct WorkOutcome {
  message: Message,
  output: InspectorResult<OutputValue>,
  status: Option<InspectorResult<Option<Value>>>,
}

/// The state machine of one inspector node.
#[derive(Debug)]
pub struct InspectorNode {
  identity: NodeIdentity,
  config: InspectorConfig,
  settings: InspectorSettings,
  host: HostServices,
  /// `None` when an expression failed to compile.
  pipeline: Option<Arc<Pipeline>>,
  router: OutputRouter,
  formatter: StatusFormatter,
  counter: ThroughputCounter,
  emitter: ChangeGatedEmitter,
  active: bool,
  alive: bool,
}

impl InspectorNode {
  /// Creates a node, compiling its expressions.
  ///
  /// A compilation failure is logged to the host log once and leaves the node
  /// inert: it ignores every message.
  pub fn new(
    identity: NodeIdentity,
    config: InspectorConfig,
    settings: InspectorSettings,
    host: HostServices,
  ) -> Self {
    Self::new_at(identity, config, settings, host, Instant::now())
  }

  /// Creates a node whose counter starts at `now`.
  pub fn new_at(
    identity: NodeIdentity,
    config: InspectorConfig,
    settings: InspectorSettings,
    host: HostServices,
    now: Instant,
  ) -> Self {
    let context = BindingContext::new(identity.id.clone(), config.name.clone());
    let pipeline = match Self::compile(&config, host.compiler.as_ref(), &context) {
      Ok(pipeline) => Some(Arc::new(pipeline)),
      Err(e) => {
        host.log.error(&e.to_string());
        None
      }
    };

    let mut emitter = ChangeGatedEmitter::new();
    if config.to_status {
      host.status.set_status(&Badge::initial());
      emitter.mark_shown();
    }

    debug!(node = %identity.id, inert = pipeline.is_none(), "inspector node created");

    Self {
      router: OutputRouter::new(config.console, config.to_sidebar),
      formatter: StatusFormatter::new(config.status.is_auto()),
      counter: ThroughputCounter::new(now, settings.burst_gap),
      active: config.active,
      alive: true,
      emitter,
      pipeline,
      identity,
      config,
      settings,
      host,
    }
  }

  fn compile(
    config: &InspectorConfig,
    compiler: &dyn ExpressionCompiler,
    context: &BindingContext,
  ) -> InspectorResult<Pipeline> {
    let output = ValueSource::compile(&config.output, compiler, context)?;
    // the status expression is compiled even when the badge is off, so a broken
    // configuration is reported either way
    let resolved = match &config.status {
      StatusSource::Auto => StatusPlan::Auto,
      StatusSource::Property(path) => StatusPlan::Resolve(ValueSource::Selector(Selector::path(path))),
      StatusSource::Expression(text) => {
        StatusPlan::Resolve(ValueSource::Expression(compiler.compile(text, context)?))
      }
    };
    let status = if config.to_status {
      resolved
    } else {
      StatusPlan::Disabled
    };
    Ok(Pipeline { output, status })
  }

  /// Admits a message arriving at `now`.
  ///
  /// Echoes, messages to an inert node and messages after close are skipped
  /// without counting. Anything else is counted, flushing the counter badge if
  /// the node was idle for longer than the burst gap.
  pub fn admit(&mut self, message: Message, now: Instant) -> Admission {
    if !self.alive {
      return Admission::Skipped(Disposition::Stale);
    }
    let Some(pipeline) = &self.pipeline else {
      return Admission::Skipped(Disposition::Inert);
    };
    if is_echo(&message, &self.identity.id) {
      trace!(node = %self.identity.id, "dropping status echo");
      return Admission::Skipped(Disposition::Echo);
    }
    if let Some(badge) = self.counter.record_arrival(now) {
      self.host.status.set_status(&badge);
    }
    Admission::Accepted(PendingWork {
      message,
      pipeline: Arc::clone(pipeline),
    })
  }

  /// Applies the outcome of a message's pipelines.
  ///
  /// After [`close`](Self::close) this is a no-op returning
  /// [`Disposition::Stale`].
  pub fn complete(&mut self, outcome: WorkOutcome) -> Disposition {
    if !self.alive {
      return Disposition::Stale;
    }
    let WorkOutcome {
      message,
      output,
      status,
    } = outcome;
    let mut disposition = Disposition::Processed;

    match status {
      Some(Ok(value)) => {
        let badge = self.formatter.format(value, &message);
        self.emitter.emit(&badge, self.host.status.as_ref());
      }
      Some(Err(e)) => {
        self.host.log.error(&e.to_string());
        disposition = Disposition::Failed;
      }
      None => {}
    }

    match output {
      Ok(output) => self.route_output(&message, output),
      Err(e) => {
        self.host.log.error(&e.to_string());
        disposition = Disposition::Failed;
      }
    }
    disposition
  }

  fn route_output(&self, message: &Message, output: OutputValue) {
    let entire = self
      .pipeline
      .as_ref()
      .is_some_and(|pipeline| pipeline.entire_message());
    let subject = if entire {
      LogSubject::EntireMessage(message)
    } else {
      LogSubject::Extracted(output.value.as_ref())
    };
    let decision = self.router.route(self.active, subject);

    if let Some(line) = decision.log {
      self.host.log.log(&line);
    }
    if decision.publish {
      let mut record = DebugRecord::new(&self.identity, self.config.name.clone())
        .with_topic(message.topic().cloned())
        .with_msg(output.value);
      record.property = output.property;
      self.host.publisher.publish(
        DEBUG_CHANNEL,
        encode_record(record, self.settings.debug_max_length),
      );
    }
  }

  /// Runs one message end to end: admit, run, complete.
  pub async fn handle(&mut self, message: Message) -> Disposition {
    match self.admit(message, Instant::now()) {
      Admission::Accepted(work) => {
        let outcome = work.run().await;
        self.complete(outcome)
      }
      Admission::Skipped(disposition) => disposition,
    }
  }

  /// Periodic tick: flushes the counter badge if the count moved.
  pub fn tick(&mut self) {
    if !self.alive || self.pipeline.is_none() {
      return;
    }
    if let Some(badge) = self.counter.on_tick() {
      self.host.status.set_status(&badge);
    }
  }

  /// Stops the node: resets the counter and flushes the zero badge, then clears
  /// the content badge if one was ever shown. Later calls do nothing.
  pub fn close(&mut self) {
    if !std::mem::replace(&mut self.alive, false) || self.pipeline.is_none() {
      return;
    }
    let badge = self.counter.reset();
    self.host.status.set_status(&badge);
    self.emitter.reset(self.host.status.as_ref());
    debug!(node = %self.identity.id, "inspector node closed");
  }

  /// Enables or disables observer-channel publishing.
  pub fn set_active(&mut self, active: bool) {
    self.active = active;
  }

  /// Returns whether observer-channel publishing is enabled.
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Returns whether the node has not been closed.
  pub fn is_alive(&self) -> bool {
    self.alive
  }

  /// Returns whether an expression failed to compile.
  pub fn is_inert(&self) -> bool {
    self.pipeline.is_none()
  }

  /// Messages counted since start or close.
  pub fn count(&self) -> u64 {
    self.counter.count()
  }

  /// The node's identity.
  pub fn identity(&self) -> &NodeIdentity {
    &self.identity
  }

  /// The node's configuration.
  pub fn config(&self) -> &InspectorConfig {
    &self.config
  }

  /// The process settings the node runs with.
  pub fn settings(&self) -> &InspectorSettings {
    &self.settings
  }
}
