//! Common test utilities for the graph engine integration tests.

#![allow(dead_code)]

use delve_graph::{
    EntityInput, GraphStorage, InMemoryGraphStorage, KnowledgeGraphService, RelationshipRequest,
};
use std::sync::Arc;

/// A service wired over a fresh in-memory store.
///
/// The store is kept alongside so tests can inspect persisted state
/// without going through the service.
pub struct TestHarness {
    pub storage: Arc<InMemoryGraphStorage>,
    pub service: Arc<KnowledgeGraphService>,
}

impl TestHarness {
    pub fn new() -> Self {
        let storage = Arc::new(InMemoryGraphStorage::new());
        let backend: Arc<dyn GraphStorage> = storage.clone();
        let service = Arc::new(KnowledgeGraphService::new(backend));
        Self { storage, service }
    }

    /// Creates an empty graph and returns its id.
    pub async fn empty_graph(&self, name: &str) -> String {
        self.service
            .create_graph(name, vec![])
            .await
            .expect("create_graph should succeed")
            .graph_id
    }

    /// Adds a directed `next` relationship between two concept nodes.
    pub async fn link(&self, graph_id: &str, source: &str, target: &str) {
        self.service
            .add_relationship(RelationshipRequest::new(
                graph_id,
                concept(source),
                concept(target),
                "next",
            ))
            .await
            .expect("add_relationship should succeed");
    }

    /// Builds `ids[0] -> ids[1] -> ...` in a new graph.
    pub async fn chain(&self, ids: &[&str]) -> String {
        let graph_id = self.empty_graph("chain").await;
        for pair in ids.windows(2) {
            self.link(&graph_id, pair[0], pair[1]).await;
        }
        graph_id
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Entity descriptor with type "concept" and an upper-cased label.
pub fn concept(id: &str) -> EntityInput {
    EntityInput::new(id, id.to_uppercase(), "concept")
}
