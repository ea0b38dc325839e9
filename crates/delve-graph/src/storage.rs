//! Graph storage abstraction.
//!
//! [`GraphStorage`] is the four-operation contract the service depends on.
//! Every method is async so a durable backend can be dropped in without
//! changing the service's call contract.
//!
//! `get` hands back an owned snapshot and `save` is an atomic replace keyed
//! by the graph's own id; callers mutate their copy and write it back.

use crate::Graph;
use async_trait::async_trait;
use delve_core::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keyed store of [`Graph`] aggregates.
#[async_trait]
pub trait GraphStorage: Send + Sync {
    /// Loads a graph snapshot. Absence is `Ok(None)`, never an error.
    async fn get(&self, id: &str) -> Result<Option<Graph>>;

    /// Upserts a graph keyed by `graph.id`.
    async fn save(&self, graph: Graph) -> Result<()>;

    /// Removes a graph. Returns `true` if one was stored under `id`.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Lists stored graph ids in ascending order.
    async fn list(&self) -> Result<Vec<String>>;
}

/// Process-local, volatile storage backed by a map.
///
/// Nothing survives a restart. Suitable for a research session's scratch
/// graphs and for tests.
#[derive(Debug, Default)]
pub struct InMemoryGraphStorage {
    graphs: RwLock<HashMap<String, Graph>>,
}

impl InMemoryGraphStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored graphs.
    pub async fn len(&self) -> usize {
        self.graphs.read().await.len()
    }

    /// Returns `true` when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.graphs.read().await.is_empty()
    }
}

#[async_trait]
impl GraphStorage for InMemoryGraphStorage {
    async fn get(&self, id: &str) -> Result<Option<Graph>> {
        Ok(self.graphs.read().await.get(id).cloned())
    }

    async fn save(&self, graph: Graph) -> Result<()> {
        log::debug!("Saving graph {} ({} nodes)", graph.id, graph.node_count());
        self.graphs.write().await.insert(graph.id.clone(), graph);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.graphs.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.graphs.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

// ============================================================================
// Tests
// ============================================================================
