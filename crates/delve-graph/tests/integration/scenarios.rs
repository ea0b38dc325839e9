//! End-to-end research-session scenarios.

use delve_graph::{
    AnalysisResult, AnalysisType, ConflictResolution, EntityInput, ExportFormat, GraphQuery,
    MergeRequest, QueryResult, RelationshipRequest,
};
use serde_json::Value;

use crate::common::{TestHarness, concept};

#[tokio::test]
async fn test_neighbors_follow_edge_direction() {
    let harness = TestHarness::new();
    let graph_id = harness.chain(&["a", "b"]).await;

    let QueryResult::Neighbors(from_a) = harness
        .service
        .query_graph(&graph_id, GraphQuery::neighbors("a", 1))
        .await
        .unwrap()
    else {
        unreachable!("Expected neighbors result");
    };
    assert_eq!(from_a.count, 1);
    assert_eq!(from_a.neighbors[0].node.id, "b");

    let QueryResult::Neighbors(from_b) = harness
        .service
        .query_graph(&graph_id, GraphQuery::neighbors("b", 1))
        .await
        .unwrap()
    else {
        unreachable!("Expected neighbors result");
    };
    assert_eq!(from_b.count, 0);
}

#[tokio::test]
async fn test_chain_anomalies() {
    let harness = TestHarness::new();
    let graph_id = harness.chain(&["a", "b", "c", "d", "e"]).await;

    let AnalysisResult::Anomalies(report) = harness
        .service
        .analyze_graph(&graph_id, AnalysisType::Anomalies)
        .await
        .unwrap()
    else {
        unreachable!("Expected anomaly report");
    };
    assert_eq!(report.isolated_nodes, vec!["e"]);
    assert!((report.average_degree - 1.6).abs() < 1e-9);
    assert!(report.hub_nodes.is_empty());
}

#[tokio::test]
async fn test_json_export_round_trips_counts() {
    let harness = TestHarness::new();
    let graph_id = harness.chain(&["a", "b", "c"]).await;

    let export = harness
        .service
        .export_graph(&graph_id, ExportFormat::Json)
        .await
        .unwrap();
    let parsed: Value = serde_json::from_str(&export.data).unwrap();

    assert_eq!(parsed["id"], graph_id.as_str());
    assert_eq!(parsed["nodes"].as_array().unwrap().len(), export.node_count);
    assert_eq!(parsed["edges"].as_array().unwrap().len(), export.edge_count);
    assert_eq!(export.node_count, 3);
    assert_eq!(export.edge_count, 2);
}

#[tokio::test]
async fn test_graphml_and_cypher_exports_cover_graph() {
    let harness = TestHarness::new();
    let graph_id = harness.chain(&["a", "b", "c"]).await;

    let graphml = harness
        .service
        .export_graph(&graph_id, ExportFormat::Graphml)
        .await
        .unwrap();
    assert_eq!(graphml.data.matches("<node ").count(), 3);
    assert_eq!(graphml.data.matches("<edge ").count(), 2);

    let cypher = harness
        .service
        .export_graph(&graph_id, ExportFormat::Cypher)
        .await
        .unwrap();
    assert_eq!(cypher.data.split(";\n").count(), 5);
    assert_eq!(cypher.data.matches("MATCH").count(), 2);
}

#[tokio::test]
async fn test_research_session_workflow() {
    let harness = TestHarness::new();
    let service = &harness.service;

    // Two agents research overlapping companies
    let people = service
        .create_graph(
            "people",
            vec![EntityInput::new("alice", "Alice", "person").with_property("role", "cto")],
        )
        .await
        .unwrap()
        .graph_id;
    service
        .add_relationship(
            RelationshipRequest::new(
                &people,
                EntityInput::new("alice", "ignored", "person"),
                EntityInput::new("acme", "Acme", "company").with_property("hq", "Berlin"),
                "works_for",
            )
            .with_property("since", 2019),
        )
        .await
        .unwrap();

    let companies = service.create_graph("companies", vec![]).await.unwrap().graph_id;
    service
        .add_relationship(
            RelationshipRequest::new(
                &companies,
                EntityInput::new("acme", "ACME Corp", "company").with_property("employees", 120),
                EntityInput::new("globex", "Globex", "company"),
                "competes_with",
            )
            .bidirectional(),
        )
        .await
        .unwrap();

    let merged = service
        .merge_graphs(
            MergeRequest::new([people.clone(), companies.clone()])
                .with_name("market map")
                .with_resolution(ConflictResolution::MergeProperties),
        )
        .await
        .unwrap();
    assert_eq!(merged.node_count, 3);
    assert_eq!(merged.edge_count, 2);
    assert_eq!(merged.conflict_count, 1);
    assert_eq!(merged.conflicts[0].node_id, "acme");

    let graph = service.get_graph(&merged.merged_graph_id).await.unwrap();
    let acme = graph.get_node("acme").unwrap();
    assert_eq!(acme.label, "Acme");
    assert_eq!(acme.properties["hq"], "Berlin");
    assert_eq!(acme.properties["employees"], 120);
    assert!(graph.invariant_violations().is_empty());

    // Bidirectional competition survives the merge
    let QueryResult::Path(paths) = service
        .query_graph(&merged.merged_graph_id, GraphQuery::path("globex", "acme", 2))
        .await
        .unwrap()
    else {
        unreachable!("Expected path result");
    };
    assert_eq!(paths.path_count, 1);

    let QueryResult::Path(paths) = service
        .query_graph(&merged.merged_graph_id, GraphQuery::path("alice", "globex", 3))
        .await
        .unwrap()
    else {
        unreachable!("Expected path result");
    };
    let ids: Vec<&str> = paths.paths[0].iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["alice", "acme", "globex"]);

    // Inputs are untouched
    assert_eq!(service.get_graph(&people).await.unwrap().node_count(), 2);
    assert_eq!(service.list_graphs().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_centrality_ranks_hub_first() {
    let harness = TestHarness::new();
    let graph_id = harness.empty_graph("star").await;
    for leaf in ["l1", "l2", "l3", "l4"] {
        harness.link(&graph_id, "hub", leaf).await;
    }
    harness.link(&graph_id, "l1", "l2").await;

    let AnalysisResult::Centrality(report) = harness
        .service
        .analyze_graph(&graph_id, AnalysisType::Centrality)
        .await
        .unwrap()
    else {
        unreachable!("Expected centrality report");
    };
    assert_eq!(report.top_nodes[0].node_id, "hub");
    assert_eq!(report.top_nodes[0].score, 1.0);
    assert_eq!(report.top_nodes[1].node_id, "l1");
}

#[tokio::test]
async fn test_cluster_matches_communities() {
    let harness = TestHarness::new();
    let graph_id = harness.chain(&["a", "b", "c"]).await;
    harness.link(&graph_id, "x", "y").await;

    let QueryResult::Cluster(cluster) = harness
        .service
        .query_graph(&graph_id, GraphQuery::cluster("y"))
        .await
        .unwrap()
    else {
        unreachable!("Expected cluster result");
    };
    let members: Vec<&str> = cluster.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(members, vec!["x", "y"]);

    let AnalysisResult::Communities(report) = harness
        .service
        .analyze_graph(&graph_id, AnalysisType::Communities)
        .await
        .unwrap()
    else {
        unreachable!("Expected communities report");
    };
    assert_eq!(report.count, 2);
    assert!(report.communities.iter().any(|c| c.members == members));
}

#[tokio::test]
async fn test_statistics_histograms() {
    let harness = TestHarness::new();
    let graph_id = harness
        .service
        .create_graph("typed", vec![EntityInput::new("p", "P", "person"), concept("c")])
        .await
        .unwrap()
        .graph_id;
    harness.link(&graph_id, "c", "p").await;

    let AnalysisResult::Statistics(stats) = harness
        .service
        .analyze_graph(&graph_id, AnalysisType::Statistics)
        .await
        .unwrap()
    else {
        unreachable!("Expected statistics");
    };
    assert_eq!(stats.node_types["person"], 1);
    assert_eq!(stats.node_types["concept"], 1);
    assert_eq!(stats.relationship_types["next"], 1);
    assert_eq!(stats.density, 1.0);
    assert!(!stats.has_cycles);
}
