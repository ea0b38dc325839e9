//! Structural properties of the engine operations.

use delve_graph::{
    AnalysisResult, AnalysisType, ConflictResolution, EntityInput, GraphQuery, MergeRequest,
    QueryResult, RelationshipRequest,
};
use proptest::prelude::*;
use std::collections::HashSet;

use crate::common::{TestHarness, concept};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

// ----------------------------------------------------------------------------
// Node auto-creation and adjacency
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_repeated_relationship_does_not_duplicate_nodes() {
    let harness = TestHarness::new();
    let graph_id = harness.empty_graph("repeat").await;

    harness.link(&graph_id, "a", "b").await;
    let graph = harness.service.get_graph(&graph_id).await.unwrap();
    let nodes_before = graph.nodes.clone();

    harness.link(&graph_id, "a", "b").await;
    let graph = harness.service.get_graph(&graph_id).await.unwrap();

    assert_eq!(graph.nodes, nodes_before);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.out_degree("a"), 1);
}

#[tokio::test]
async fn test_existing_node_keeps_properties_from_first_descriptor() {
    let harness = TestHarness::new();
    let graph_id = harness.empty_graph("props").await;

    let first = concept("a").with_property("source", "arxiv").with_property("year", 2017);
    harness
        .service
        .add_relationship(RelationshipRequest::new(&graph_id, first, concept("b"), "cites"))
        .await
        .unwrap();
    let before = harness.service.get_graph(&graph_id).await.unwrap();

    let second = EntityInput::new("a", "Other label", "paper")
        .with_property("source", "blog")
        .with_property("extra", true);
    let result = harness
        .service
        .add_relationship(RelationshipRequest::new(&graph_id, second, concept("c"), "cites"))
        .await
        .unwrap();
    assert_eq!(result.node_count, 3);

    let after = harness.service.get_graph(&graph_id).await.unwrap();
    assert_eq!(after.get_node("a"), before.get_node("a"));
    let node = after.get_node("a").unwrap();
    assert_eq!(node.properties["source"], "arxiv");
    assert_eq!(node.properties["year"], 2017);
    assert!(!node.properties.contains_key("extra"));
}

#[tokio::test]
async fn test_adjacency_symmetry_only_when_bidirectional() {
    let harness = TestHarness::new();
    let graph_id = harness.empty_graph("sym").await;

    harness
        .service
        .add_relationship(
            RelationshipRequest::new(&graph_id, concept("a"), concept("b"), "peer").bidirectional(),
        )
        .await
        .unwrap();
    harness.link(&graph_id, "c", "d").await;

    let graph = harness.service.get_graph(&graph_id).await.unwrap();
    assert!(graph.is_adjacent("a", "b") && graph.is_adjacent("b", "a"));
    assert!(graph.is_adjacent("c", "d"));
    assert!(!graph.is_adjacent("d", "c"));
}

#[tokio::test]
async fn test_centrality_zero_for_single_node() {
    let harness = TestHarness::new();
    let graph_id = harness
        .service
        .create_graph("one", vec![concept("a")])
        .await
        .unwrap()
        .graph_id;

    let AnalysisResult::Centrality(report) = harness
        .service
        .analyze_graph(&graph_id, AnalysisType::Centrality)
        .await
        .unwrap()
    else {
        unreachable!("Expected centrality report");
    };
    assert_eq!(report.top_nodes.len(), 1);
    assert_eq!(report.top_nodes[0].score, 0.0);
}

#[tokio::test]
async fn test_centrality_with_self_loop_stays_in_unit_interval() {
    let harness = TestHarness::new();
    let graph_id = harness.empty_graph("loop").await;
    harness.link(&graph_id, "a", "a").await;
    harness.link(&graph_id, "a", "b").await;

    let AnalysisResult::Centrality(report) = harness
        .service
        .analyze_graph(&graph_id, AnalysisType::Centrality)
        .await
        .unwrap()
    else {
        unreachable!("Expected centrality report");
    };
    assert_eq!(report.top_nodes[0].node_id, "a");
    assert_eq!(report.top_nodes[0].score, 1.0);
    assert!(report.top_nodes.iter().all(|s| (0.0..=1.0).contains(&s.score)));
}

// ----------------------------------------------------------------------------
// Merge
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_disjoint_merge_conserves_counts() {
    let harness = TestHarness::new();
    let g1 = harness.chain(&["a", "b", "c"]).await;
    let g2 = harness.chain(&["x", "y"]).await;

    let merged = harness
        .service
        .merge_graphs(MergeRequest::new([g1, g2]))
        .await
        .unwrap();
    assert_eq!(merged.node_count, 5);
    assert_eq!(merged.edge_count, 3);
    assert_eq!(merged.conflict_count, 0);
    assert!(merged.conflicts.is_empty());
}

#[tokio::test]
async fn test_merge_properties_second_graph_wins() {
    let harness = TestHarness::new();
    let g1 = harness
        .service
        .create_graph(
            "one",
            vec![
                EntityInput::new("n", "N", "t")
                    .with_property("only_first", true)
                    .with_property("shared", "first"),
            ],
        )
        .await
        .unwrap()
        .graph_id;
    let g2 = harness
        .service
        .create_graph(
            "two",
            vec![
                EntityInput::new("n", "Other", "u")
                    .with_property("only_second", true)
                    .with_property("shared", "second"),
            ],
        )
        .await
        .unwrap()
        .graph_id;

    let merged = harness
        .service
        .merge_graphs(
            MergeRequest::new([g1, g2]).with_resolution(ConflictResolution::MergeProperties),
        )
        .await
        .unwrap();
    let graph = harness
        .service
        .get_graph(&merged.merged_graph_id)
        .await
        .unwrap();
    let node = graph.get_node("n").unwrap();

    let keys: HashSet<&str> = node.properties.keys().map(String::as_str).collect();
    assert_eq!(keys, HashSet::from(["only_first", "only_second", "shared"]));
    assert_eq!(node.properties["shared"], "second");
    assert_eq!(node.label, "N");
}

// ----------------------------------------------------------------------------
// Generated graphs
// ----------------------------------------------------------------------------

fn arb_links() -> impl Strategy<Value = Vec<(u8, u8, bool)>> {
    prop::collection::vec((0u8..6, 0u8..6, any::<bool>()), 1..16)
}

async fn build(harness: &TestHarness, links: &[(u8, u8, bool)]) -> String {
    let graph_id = harness.empty_graph("generated").await;
    for (s, t, bidirectional) in links {
        let mut request = RelationshipRequest::new(
            &graph_id,
            concept(&format!("n{s}")),
            concept(&format!("n{t}")),
            "rel",
        );
        request.bidirectional = *bidirectional;
        harness.service.add_relationship(request).await.unwrap();
    }
    graph_id
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_paths_are_bounded_and_simple(links in arb_links(), k in 0usize..5) {
        runtime().block_on(async {
            let harness = TestHarness::new();
            let graph_id = build(&harness, &links).await;
            let QueryResult::Path(result) = harness
                .service
                .query_graph(&graph_id, GraphQuery::path("n0", "n5", k))
                .await
                .unwrap()
            else {
                unreachable!("Expected path result");
            };
            for path in &result.paths {
                assert!(path.len() <= k + 1);
                let unique: HashSet<&str> = path.iter().map(|n| n.id.as_str()).collect();
                assert_eq!(unique.len(), path.len());
            }
        });
    }

    #[test]
    fn prop_centrality_scores_in_unit_interval(links in arb_links()) {
        runtime().block_on(async {
            let harness = TestHarness::new();
            let graph_id = build(&harness, &links).await;
            let AnalysisResult::Centrality(report) = harness
                .service
                .analyze_graph(&graph_id, AnalysisType::Centrality)
                .await
                .unwrap()
            else {
                unreachable!("Expected centrality report");
            };
            for score in &report.top_nodes {
                assert!((0.0..=1.0).contains(&score.score));
            }
        });
    }

    #[test]
    fn prop_density_matches_formula(links in arb_links()) {
        runtime().block_on(async {
            let harness = TestHarness::new();
            let graph_id = build(&harness, &links).await;
            let AnalysisResult::Statistics(stats) = harness
                .service
                .analyze_graph(&graph_id, AnalysisType::Statistics)
                .await
                .unwrap()
            else {
                unreachable!("Expected statistics");
            };
            assert_eq!(stats.edge_count, links.len());
            let n = stats.node_count as f64;
            let e = stats.edge_count as f64;
            if stats.node_count > 1 {
                assert_eq!(stats.density, 2.0 * e / (n * (n - 1.0)));
            } else {
                assert_eq!(stats.density, 0.0);
            }
        });
    }

    #[test]
    fn prop_graph_invariants_hold(links in arb_links()) {
        runtime().block_on(async {
            let harness = TestHarness::new();
            let graph_id = build(&harness, &links).await;
            let graph = harness.service.get_graph(&graph_id).await.unwrap();
            assert!(graph.invariant_violations().is_empty());
        });
    }
}
