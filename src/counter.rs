//! # Throughput Counter
//!
//! Counts messages since the node started (or was last reset) and decides when
//! the count is worth flushing to the badge. Two triggers share the counter:
//!
//! - **Arrival**: every message increments the count. If the previous message
//!   arrived more than the burst gap ago, the badge is flushed right away, so
//!   the first message after an idle period shows up immediately.
//! - **Tick**: a periodic timer flushes the count only if it moved since the last
//!   flush, so a sustained burst costs about one flush per tick.
//!
//! A reset (node stop) zeroes the count and always flushes.
//!
//! The counter is a plain state machine: callers pass in the current instant and
//! push the returned badges themselves.

use crate::status::Badge;
use std::time::Duration;
use tokio::time::Instant;

/// Message counter with rate-limited badge flushes.
#[derive(Debug, Clone)]
pub struct ThroughputCounter {
  count: u64,
  last_flushed: u64,
  last_arrival: Instant,
  burst_gap: Duration,
}

impl ThroughputCounter {
  /// Creates a counter at zero; `now` counts as the last arrival.
  pub fn new(now: Instant, burst_gap: Duration) -> Self {
    Self {
      count: 0,
      last_flushed: 0,
      last_arrival: now,
      burst_gap,
    }
  }

  /// Records an arrival at `now`.
  ///
  /// Returns the badge to flush when more than the burst gap elapsed since the
  /// previous arrival.
  pub fn record_arrival(&mut self, now: Instant) -> Option<Badge> {
    self.count = self.count.saturating_add(1);
    let elapsed = now.saturating_duration_since(self.last_arrival);
    self.last_arrival = now;
    if elapsed > self.burst_gap {
      self.last_flushed = self.count;
      Some(Badge::counter(self.count))
    } else {
      None
    }
  }

  /// Periodic tick: returns the badge to flush if the count changed since the
  /// last flush.
  pub fn on_tick(&mut self) -> Option<Badge> {
    if self.count == self.last_flushed {
      return None;
    }
    self.last_flushed = self.count;
    Some(Badge::counter(self.count))
  }

  /// Resets the count to zero and returns the zero badge, which must always be
  /// flushed.
  pub fn reset(&mut self) -> Badge {
    self.count = 0;
    self.last_flushed = 0;
    Badge::counter(0)
  }

  /// Messages counted since start or the last reset.
  pub fn count(&self) -> u64 {
    self.count
  }

  /// Count shown by the most recent flush.
  pub fn last_flushed(&self) -> u64 {
    self.last_flushed
  }
}
