//! # StreamWeave Inspector
//!
//! Per-node traffic inspection for StreamWeave graphs.
//!
//! An inspector node sits on a graph edge and looks at every message passing
//! through it. For each message it extracts a configured property (or the whole
//! message, or the result of an expression) and routes it to:
//!
//! - the host **log sink** (when console output is enabled),
//! - the live **observer channel** as an encoded debug record (when the node is
//!   active and sidebar output is enabled),
//! - a compact **status badge** next to the node.
//!
//! The badge carries two independent layers: a throttled message counter and an
//! optional content status summarised from the message itself. Messages that are
//! echoes of a status this node emitted are dropped to break feedback loops.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use streamweave_inspector::config::{InspectorConfig, InspectorSettings, NodeIdentity};
//! use streamweave_inspector::host::{HostServices, ObserverChannel, TracingLogSink, TracingStatusSink};
//! use streamweave_inspector::message::Message;
//! use streamweave_inspector::node::InspectorNode;
//! use streamweave_inspector::runtime::spawn_inspector;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = NodeIdentity::new("n1", "flow-1");
//! let observers = Arc::new(ObserverChannel::default());
//! let host = HostServices::new(
//!   Arc::new(TracingStatusSink::new("n1")),
//!   Arc::new(TracingLogSink::new("n1", "probe")),
//!   observers.clone(),
//! );
//! let config = InspectorConfig::default().with_to_status(true);
//! let node = InspectorNode::new(identity, config, InspectorSettings::default(), host);
//! let handle = spawn_inspector(node);
//! handle.input(Message::from(json!({"payload": 42}))).await?;
//! handle.close().await;
//! # Ok(())
//! # }
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// HTTP administration surface: enable/disable toggles and the viewer assets.
pub mod admin;
/// Node configuration, host wire format and process settings.
pub mod config;
/// Throughput counter with a rate-limited badge.
pub mod counter;
/// Change-gated status emission.
pub mod emitter;
/// Error types.
pub mod error;
/// Expression compilation and evaluation.
pub mod expression;
/// Feedback-loop guard.
pub mod guard;
/// Host collaborator interfaces and default implementations.
pub mod host;
/// Human-readable rendering of message values.
pub mod inspect;
/// Inbound message model.
pub mod message;
/// The inspector node state machine.
pub mod node;
/// Property selectors and extraction.
pub mod property;
/// Debug records and their size-bounded encoding.
pub mod record;
/// Registry of running inspector nodes.
pub mod registry;
/// Output routing to the log sink and the observer channel.
pub mod router;
/// Async runtime driving one inspector node.
pub mod runtime;
/// Status badges and the status formatter.
pub mod status;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod counter_test;
#[cfg(test)]
mod emitter_test;
#[cfg(test)]
mod inspect_test;
#[cfg(test)]
mod property_test;
#[cfg(test)]
mod router_test;
#[cfg(test)]
mod runtime_test;
