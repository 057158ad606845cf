//! # Inspector Runtime
//!
//! Drives an [`InspectorNode`] from a dedicated tokio task.
//!
//! The task owns the node and multiplexes four event sources:
//!
//! - **shutdown**: [`InspectorHandle::close`] cancels the task's token; the node
//!   is closed and every message still queued or in flight is acknowledged as
//!   [`Disposition::Stale`].
//! - **completions**: admitted messages run their pipelines concurrently in a
//!   [`FuturesUnordered`]; whichever finishes first is completed first, so a
//!   slow expression never holds back later messages.
//! - **ticks**: every `tick_interval` the counter badge is flushed if it moved.
//! - **commands**: inputs and active toggles sent through the handle.
//!
//! All node state is touched from this one task only, so the node needs no
//! locking.

use crate::error::{InspectorError, InspectorResult};
use crate::message::Message;
use crate::node::{Admission, Disposition, InspectorNode, WorkOutcome};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Shortest tick period accepted by the runtime.
const MIN_TICK: Duration = Duration::from_millis(1);

enum Command {
  Input {
    message: Message,
    ack: oneshot::Sender<Disposition>,
  },
  SetActive {
    active: bool,
    ack: oneshot::Sender<()>,
  },
}

impl std::fmt::Debug for Command {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Command::Input { .. } => f.write_str("Input"),
      Command::SetActive { active, .. } => write!(f, "SetActive({active})"),
    }
  }
}

type InFlight = BoxFuture<'static, (WorkOutcome, oneshot::Sender<Disposition>)>;

/// Cloneable handle to a running inspector node.
#[derive(Debug, Clone)]
pub struct InspectorHandle {
  id: String,
  commands: mpsc::Sender<Command>,
  shutdown: CancellationToken,
  closed: watch::Receiver<bool>,
}

/// Spawns the node onto the current tokio runtime.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_inspector(node: InspectorNode) -> InspectorHandle {
  let id = node.identity().id.clone();
  let (commands, receiver) = mpsc::channel(node.settings().command_buffer.max(1));
  let shutdown = CancellationToken::new();
  let (closed_tx, closed) = watch::channel(false);

  tokio::spawn(drive(node, receiver, shutdown.clone(), closed_tx));

  InspectorHandle {
    id,
    commands,
    shutdown,
    closed,
  }
}

async fn drive(
  mut node: InspectorNode,
  mut commands: mpsc::Receiver<Command>,
  shutdown: CancellationToken,
  closed: watch::Sender<bool>,
) {
  let period = node.settings().tick_interval.max(MIN_TICK);
  let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  let mut in_flight: FuturesUnordered<InFlight> = FuturesUnordered::new();

  debug!(node = %node.identity().id, "inspector runtime started");

  loop {
    tokio::select! {
      biased;

      _ = shutdown.cancelled() => break,

      Some((outcome, ack)) = in_flight.next(), if !in_flight.is_empty() => {
        let disposition = node.complete(outcome);
        let _ = ack.send(disposition);
      }

      _ = ticker.tick() => node.tick(),

      command = commands.recv() => match command {
        Some(Command::Input { message, ack }) => match node.admit(message, Instant::now()) {
          Admission::Accepted(work) => {
            in_flight.push(Box::pin(async move { (work.run().await, ack) }));
          }
          Admission::Skipped(disposition) => {
            trace!(node = %node.identity().id, ?disposition, "message skipped");
            let _ = ack.send(disposition);
          }
        },
        Some(Command::SetActive { active, ack }) => {
          node.set_active(active);
          let _ = ack.send(());
        }
        None => break,
      },
    }
  }

  node.close();
  commands.close();
  while let Ok(command) = commands.try_recv() {
    match command {
      Command::Input { ack, .. } => {
        let _ = ack.send(Disposition::Stale);
      }
      Command::SetActive { ack, .. } => {
        let _ = ack.send(());
      }
    }
  }
  let abandoned = in_flight.len();
  drop(in_flight);

  debug!(node = %node.identity().id, abandoned, "inspector runtime stopped");
  let _ = closed.send(true);
}

impl InspectorHandle {
  /// The id of the node behind this handle.
  pub fn id(&self) -> &str {
    &self.id
  }

  /// Feeds a message to the node and waits until it has been handled.
  ///
  /// Messages still in flight when the node closes resolve to
  /// [`Disposition::Stale`].
  ///
  /// # Errors
  ///
  /// Returns [`InspectorError::Closed`] if the node no longer accepts input.
  pub async fn input(&self, message: Message) -> InspectorResult<Disposition> {
    let (ack, done) = oneshot::channel();
    self
      .commands
      .send(Command::Input { message, ack })
      .await
      .map_err(|_| self.closed_error())?;
    Ok(done.await.unwrap_or(Disposition::Stale))
  }

  /// Enables or disables observer-channel publishing.
  ///
  /// # Errors
  ///
  /// Returns [`InspectorError::Closed`] if the node has stopped.
  pub async fn set_active(&self, active: bool) -> InspectorResult<()> {
    let (ack, done) = oneshot::channel();
    self
      .commands
      .send(Command::SetActive { active, ack })
      .await
      .map_err(|_| self.closed_error())?;
    done.await.map_err(|_| self.closed_error())
  }

  /// Closes the node and waits for its task to finish. Closing twice is fine.
  pub async fn close(&self) {
    self.shutdown.cancel();
    let mut closed = self.closed.clone();
    let _ = closed.wait_for(|closed| *closed).await;
  }

  /// Returns whether the node's task has finished.
  pub fn is_closed(&self) -> bool {
    *self.closed.borrow()
  }

  fn closed_error(&self) -> InspectorError {
    InspectorError::Closed(self.id.clone())
  }
}
