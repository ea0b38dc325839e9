//! Concurrent mutation of shared graphs.

use delve_graph::{MergeRequest, RelationshipRequest};
use std::collections::HashSet;

use crate::common::{TestHarness, concept};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_add_relationship_loses_no_updates() {
    let harness = TestHarness::new();
    let graph_id = harness.empty_graph("parallel").await;

    let mut handles = Vec::new();
    for i in 0..64 {
        let service = harness.service.clone();
        let graph_id = graph_id.clone();
        handles.push(tokio::spawn(async move {
            service
                .add_relationship(RelationshipRequest::new(
                    &graph_id,
                    concept("root"),
                    concept(&format!("leaf{i}")),
                    "has",
                ))
                .await
                .unwrap()
                .edge_id
        }));
    }

    let mut edge_ids = HashSet::new();
    for handle in handles {
        edge_ids.insert(handle.await.unwrap());
    }

    let graph = harness.service.get_graph(&graph_id).await.unwrap();
    assert_eq!(edge_ids.len(), 64);
    assert_eq!(graph.edge_count(), 64);
    assert_eq!(graph.node_count(), 65);
    assert_eq!(graph.out_degree("root"), 64);
    assert!(edge_ids.iter().all(|id| graph.edges.contains_key(id)));
    assert_eq!(harness.service.locked_graph_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_writers_on_separate_graphs() {
    let harness = TestHarness::new();
    let first = harness.empty_graph("first").await;
    let second = harness.empty_graph("second").await;

    let mut handles = Vec::new();
    for i in 0..20 {
        for graph_id in [first.clone(), second.clone()] {
            let service = harness.service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .add_relationship(RelationshipRequest::new(
                        &graph_id,
                        concept(&format!("s{i}")),
                        concept(&format!("t{i}")),
                        "pairs",
                    ))
                    .await
                    .unwrap();
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for graph_id in [&first, &second] {
        let graph = harness.service.get_graph(graph_id).await.unwrap();
        assert_eq!(graph.edge_count(), 20);
        assert!(graph.invariant_violations().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_merge_while_writing_reads_consistent_snapshots() {
    let harness = TestHarness::new();
    let first = harness.chain(&["a", "b"]).await;
    let second = harness.chain(&["c", "d"]).await;

    let writer = {
        let service = harness.service.clone();
        let first = first.clone();
        tokio::spawn(async move {
            for i in 0..10 {
                service
                    .add_relationship(RelationshipRequest::new(
                        &first,
                        concept("a"),
                        concept(&format!("x{i}")),
                        "grows",
                    ))
                    .await
                    .unwrap();
            }
        })
    };

    let merged = harness
        .service
        .merge_graphs(MergeRequest::new([first.clone(), second]))
        .await
        .unwrap();
    writer.await.unwrap();

    let graph = harness
        .service
        .get_graph(&merged.merged_graph_id)
        .await
        .unwrap();
    assert!(graph.invariant_violations().is_empty());
    assert_eq!(harness.service.get_graph(&first).await.unwrap().edge_count(), 11);
}
