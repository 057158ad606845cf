//! # Inspector Runtime Test Suite

use crate::config::{InspectorConfig, InspectorSettings, NodeIdentity, OutputMode};
use crate::error::InspectorError;
use crate::message::Message;
use crate::node::{Disposition, InspectorNode};
use crate::runtime::spawn_inspector;
use crate::status::Badge;
use crate::test_support::{StatusEvent, TestHost};
use serde_json::json;
use std::time::Duration;

fn delayed_node(host: &TestHost, config: InspectorConfig) -> InspectorNode {
  InspectorNode::new(
    NodeIdentity::new("n1", "f1"),
    config,
    InspectorSettings::default(),
    host.delayed_services(),
  )
}

#[tokio::test(start_paused = true)]
async fn test_slow_message_does_not_block_later_ones() {
  let host = TestHost::default();
  let config = InspectorConfig::default().with_output(OutputMode::Expression("payload.tag".to_string()));
  let handle = spawn_inspector(delayed_node(&host, config));

  let slow = Message::from(json!({"payload": {"tag": "slow", "delay_ms": 50}}));
  let fast = Message::from(json!({"payload": {"tag": "fast", "delay_ms": 0}}));
  let (slow_done, fast_done) = tokio::join!(handle.input(slow), handle.input(fast));

  assert_eq!(slow_done, Ok(Disposition::Processed));
  assert_eq!(fast_done, Ok(Disposition::Processed));
  let order: Vec<String> = host.publisher.records().into_iter().map(|r| r.msg).collect();
  assert_eq!(order, vec!["fast".to_string(), "slow".to_string()]);

  handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_tick_flushes_counter() {
  let host = TestHost::default();
  let handle = spawn_inspector(host.node(InspectorConfig::default()));

  handle
    .input(Message::from(json!({"payload": 1})))
    .await
    .unwrap();
  assert!(host.status.counter_flushes().is_empty());

  tokio::time::sleep(Duration::from_millis(1100)).await;
  assert_eq!(host.status.counter_flushes(), vec!["1".to_string()]);

  tokio::time::sleep(Duration::from_secs(3)).await;
  assert_eq!(host.status.counter_flushes(), vec!["1".to_string()]);

  handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_close_marks_in_flight_work_stale() {
  let host = TestHost::default();
  let config = InspectorConfig::default().with_output(OutputMode::Expression("payload.tag".to_string()));
  let handle = spawn_inspector(delayed_node(&host, config));

  let pending = {
    let handle = handle.clone();
    tokio::spawn(async move {
      handle
        .input(Message::from(json!({"payload": {"tag": "late", "delay_ms": 500}})))
        .await
    })
  };
  tokio::time::sleep(Duration::from_millis(10)).await;

  handle.close().await;

  assert_eq!(pending.await.unwrap(), Ok(Disposition::Stale));
  assert!(handle.is_closed());
  assert!(host.publisher.records().is_empty());
  assert_eq!(host.status.events(), vec![StatusEvent::Set(Badge::counter(0))]);
}

#[tokio::test(start_paused = true)]
async fn test_closed_handle_rejects_input() {
  let host = TestHost::default();
  let handle = spawn_inspector(host.node(InspectorConfig::default()));
  handle.close().await;
  handle.close().await;

  let result = handle.input(Message::from(json!({"payload": 1}))).await;
  assert_eq!(result, Err(InspectorError::Closed("n1".to_string())));
  assert_eq!(
    handle.set_active(true).await,
    Err(InspectorError::Closed("n1".to_string()))
  );
}

#[tokio::test(start_paused = true)]
async fn test_set_active_through_handle() {
  let host = TestHost::default();
  let handle = spawn_inspector(host.node(InspectorConfig::default()));

  handle.set_active(false).await.unwrap();
  handle.input(Message::from(json!({"payload": 1}))).await.unwrap();
  assert!(host.publisher.records().is_empty());

  handle.set_active(true).await.unwrap();
  handle.input(Message::from(json!({"payload": 2}))).await.unwrap();
  assert_eq!(host.publisher.records().len(), 1);

  handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_skipped_messages_are_acknowledged() {
  let host = TestHost::default();
  let handle = spawn_inspector(host.node(InspectorConfig::default()));
  assert_eq!(handle.id(), "n1");

  let echo = Message::from(json!({"status": {"source": {"id": "n1"}}}));
  assert_eq!(handle.input(echo).await, Ok(Disposition::Echo));

  handle.close().await;
}
