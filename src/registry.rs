//! # Inspector Registry
//!
//! Process-wide lookup of running inspector nodes by id, used by the admin
//! endpoints to toggle nodes.

use crate::runtime::InspectorHandle;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared map of node id to [`InspectorHandle`]. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InspectorRegistry {
  nodes: Arc<RwLock<HashMap<String, InspectorHandle>>>,
}

impl InspectorRegistry {
  /// Creates an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a node, replacing any previous node with the same id.
  pub async fn register(&self, handle: InspectorHandle) -> Option<InspectorHandle> {
    debug!(node = %handle.id(), "registering inspector node");
    self
      .nodes
      .write()
      .await
      .insert(handle.id().to_string(), handle)
  }

  /// Looks up a node.
  pub async fn get(&self, id: &str) -> Option<InspectorHandle> {
    self.nodes.read().await.get(id).cloned()
  }

  /// Removes a node. The node itself keeps running until closed.
  pub async fn remove(&self, id: &str) -> Option<InspectorHandle> {
    self.nodes.write().await.remove(id)
  }

  /// Ids of all registered nodes, sorted.
  pub async fn ids(&self) -> Vec<String> {
    let mut ids: Vec<String> = self.nodes.read().await.keys().cloned().collect();
    ids.sort();
    ids
  }

  /// Closes and removes every node.
  pub async fn close_all(&self) {
    let handles: Vec<InspectorHandle> = self.nodes.write().await.drain().map(|(_, h)| h).collect();
    for handle in handles {
      handle.close().await;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::InspectorConfig;
  use crate::runtime::spawn_inspector;
  use crate::test_support::TestHost;

  #[tokio::test]
  async fn test_register_get_remove() {
    let host = TestHost::default();
    let registry = InspectorRegistry::new();
    let handle = spawn_inspector(host.node(InspectorConfig::default()));

    assert!(registry.register(handle.clone()).await.is_none());
    assert_eq!(registry.ids().await, vec!["n1".to_string()]);
    assert_eq!(registry.get("n1").await.map(|h| h.id().to_string()), Some("n1".to_string()));
    assert!(registry.get("n2").await.is_none());

    assert!(registry.register(handle.clone()).await.is_some());
    assert!(registry.remove("n1").await.is_some());
    assert!(registry.ids().await.is_empty());
    handle.close().await;
  }

  #[tokio::test]
  async fn test_close_all() {
    let host = TestHost::default();
    let registry = InspectorRegistry::new();
    let handle = spawn_inspector(host.node(InspectorConfig::default()));
    registry.register(handle.clone()).await;

    registry.close_all().await;

    assert!(handle.is_closed());
    assert!(registry.ids().await.is_empty());
  }
}
