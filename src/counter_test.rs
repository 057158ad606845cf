//! # Throughput Counter Test Suite

use crate::counter::ThroughputCounter;
use crate::status::Badge;
use std::time::Duration;
use tokio::time::Instant;

const GAP: Duration = Duration::from_millis(100);

#[test]
fn test_first_arrival_after_idle_flushes() {
  let start = Instant::now();
  let mut counter = ThroughputCounter::new(start, GAP);
  let badge = counter.record_arrival(start + Duration::from_millis(150));
  assert_eq!(badge, Some(Badge::counter(1)));
  assert_eq!(counter.last_flushed(), 1);
}

#[test]
fn test_arrival_within_gap_does_not_flush() {
  let start = Instant::now();
  let mut counter = ThroughputCounter::new(start, GAP);
  assert_eq!(counter.record_arrival(start + Duration::from_millis(10)), None);
  assert_eq!(counter.record_arrival(start + Duration::from_millis(110)), None);
  // exactly the gap is not "more than" the gap
  assert_eq!(counter.record_arrival(start + Duration::from_millis(210)), None);
  assert_eq!(counter.count(), 3);
  assert_eq!(counter.last_flushed(), 0);
}

#[test]
fn test_tick_flushes_only_on_change() {
  let start = Instant::now();
  let mut counter = ThroughputCounter::new(start, GAP);
  assert_eq!(counter.on_tick(), None);

  counter.record_arrival(start);
  counter.record_arrival(start);
  assert_eq!(counter.on_tick(), Some(Badge::counter(2)));
  assert_eq!(counter.on_tick(), None);
}

#[test]
fn test_tick_after_immediate_flush_is_quiet() {
  let start = Instant::now();
  let mut counter = ThroughputCounter::new(start, GAP);
  assert!(counter.record_arrival(start + Duration::from_secs(1)).is_some());
  assert_eq!(counter.on_tick(), None);
}

#[test]
fn test_burst_is_bounded_to_two_flushes() {
  let start = Instant::now();
  let mut counter = ThroughputCounter::new(start, GAP);
  let burst_start = start + Duration::from_millis(500);

  let mut flushes = 0;
  for i in 0..1000u64 {
    // 1000 messages spread across 50ms
    let at = burst_start + Duration::from_micros(i * 50);
    if counter.record_arrival(at).is_some() {
      flushes += 1;
    }
  }
  if counter.on_tick().is_some() {
    flushes += 1;
  }

  assert_eq!(counter.count(), 1000);
  assert_eq!(flushes, 2);
  assert_eq!(counter.last_flushed(), 1000);
}

#[test]
fn test_reset_zeroes_and_always_flushes() {
  let start = Instant::now();
  let mut counter = ThroughputCounter::new(start, GAP);
  counter.record_arrival(start);
  assert_eq!(counter.reset(), Badge::counter(0));
  assert_eq!(counter.count(), 0);
  assert_eq!(counter.reset(), Badge::counter(0));
  assert_eq!(counter.on_tick(), None);
}

#[test]
fn test_count_is_monotonic() {
  let start = Instant::now();
  let mut counter = ThroughputCounter::new(start, GAP);
  let mut previous = 0;
  for i in 0..50u64 {
    counter.record_arrival(start + Duration::from_millis(i * 37));
    assert!(counter.count() > previous);
    previous = counter.count();
    if i % 7 == 0 {
      counter.on_tick();
    }
  }
}
