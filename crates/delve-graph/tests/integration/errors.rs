//! Error paths of the engine operations.

use delve_core::Error;
use delve_graph::{AnalysisType, ExportFormat, GraphQuery, MergeRequest, QueryType};

use crate::common::{TestHarness, concept};

#[tokio::test]
async fn test_every_read_reports_missing_graph() {
    let harness = TestHarness::new();
    let service = &harness.service;

    let errors = [
        service
            .query_graph("graph_missing", GraphQuery::neighbors("a", 1))
            .await
            .unwrap_err(),
        service
            .analyze_graph("graph_missing", AnalysisType::Statistics)
            .await
            .unwrap_err(),
        service
            .export_graph("graph_missing", ExportFormat::Json)
            .await
            .unwrap_err(),
    ];
    for err in errors {
        assert!(err.is_graph_not_found(), "unexpected error: {err}");
        assert!(err.is_client_error());
        assert!(err.to_string().contains("graph_missing"));
    }
}

#[tokio::test]
async fn test_path_without_end_node_is_invalid() {
    let harness = TestHarness::new();
    let graph_id = harness.chain(&["a", "b"]).await;

    let query = GraphQuery {
        query_type: QueryType::Path,
        start_node: "a".to_string(),
        end_node: None,
        max_depth: 3,
    };
    let err = harness
        .service
        .query_graph(&graph_id, query)
        .await
        .unwrap_err();

    let Error::InvalidArgument { message } = &err else {
        unreachable!("Expected InvalidArgument, got {err:?}");
    };
    assert!(message.contains("endNode"));
}

#[tokio::test]
async fn test_merge_argument_validation() {
    let harness = TestHarness::new();
    let graph_id = harness
        .service
        .create_graph("lonely", vec![concept("a")])
        .await
        .unwrap()
        .graph_id;

    let empty = harness
        .service
        .merge_graphs(MergeRequest::new(Vec::<String>::new()))
        .await
        .unwrap_err();
    assert!(matches!(empty, Error::InvalidArgument { .. }));

    let single = harness
        .service
        .merge_graphs(MergeRequest::new([graph_id.clone()]))
        .await
        .unwrap_err();
    assert!(matches!(single, Error::InvalidArgument { .. }));

    // Missing id after a valid one: nothing is persisted
    let missing = harness
        .service
        .merge_graphs(MergeRequest::new([graph_id.as_str(), "graph_gone"]))
        .await
        .unwrap_err();
    assert!(missing.is_graph_not_found());
    assert_eq!(harness.storage.len().await, 1);
}

#[tokio::test]
async fn test_deleted_graph_is_not_found() {
    let harness = TestHarness::new();
    let graph_id = harness.chain(&["a", "b"]).await;

    assert!(harness.service.delete_graph(&graph_id).await.unwrap());
    let err = harness
        .service
        .export_graph(&graph_id, ExportFormat::Cypher)
        .await
        .unwrap_err();
    assert!(err.is_graph_not_found());
}
