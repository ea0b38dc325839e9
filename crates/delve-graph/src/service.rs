//! The knowledge graph service.
//!
//! [`KnowledgeGraphService`] owns every mutation and query over graphs held
//! in a [`GraphStorage`]. It holds no graph data itself: each call loads a
//! snapshot, works on it, and writes it back if it changed.
//!
//! Mutations of one graph are serialized through a per-graph-id lock table,
//! so concurrent `add_relationship` calls never lose updates. Reads take no
//! lock and see whichever snapshot storage returns.
//!
//! # Example
//!
//! ```rust,ignore
//! let service = KnowledgeGraphService::new(Arc::new(InMemoryGraphStorage::new()));
//! let created = service
//!     .create_graph("demo", vec![EntityInput::new("a", "Alice", "person")])
//!     .await?;
//! service
//!     .add_relationship(RelationshipRequest::new(
//!         &created.graph_id,
//!         EntityInput::new("a", "Alice", "person"),
//!         EntityInput::new("b", "Bob", "person"),
//!         "knows",
//!     ))
//!     .await?;
//! ```

use crate::algorithms::{
    self, AnomalyReport, CentralityScore, Community, GraphStatistics, Neighbor, NodeRef,
};
use crate::export;
use crate::merge::{self, MergeConflict};
use crate::{
    AnalysisType, ConflictResolution, Edge, EntityInput, ExportFormat, Graph, GraphStorage,
    Properties, QueryType,
};
use chrono::{DateTime, Utc};
use delve_core::{Error, Result, new_edge_id, new_graph_id};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default hop bound for queries when the caller gives none.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Maximum number of conflicts listed in a [`MergeResult`].
pub const MAX_REPORTED_CONFLICTS: usize = 20;

// ============================================================================
// Configuration
// ============================================================================

/// Engine limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    /// Cap on paths returned by a path query.
    pub max_path_results: usize,
    /// Upper bound on a path query's `max_depth`; larger requests are
    /// clamped and reported through `depthClamped`.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_path_results: 1000,
            max_depth: 10,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

fn default_weight() -> f64 {
    1.0
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Arguments for [`KnowledgeGraphService::add_relationship`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRequest {
    /// Target graph.
    pub graph_id: String,
    /// Source entity; created if absent.
    pub source: EntityInput,
    /// Target entity; created if absent.
    pub target: EntityInput,
    /// Relationship label.
    pub relationship: String,
    /// Edge attributes.
    #[serde(default)]
    pub properties: Properties,
    /// Edge weight (must be finite).
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Also link target back to source.
    #[serde(default)]
    pub bidirectional: bool,
}

impl RelationshipRequest {
    /// Creates a directed, weight 1.0 request with no properties.
    pub fn new(
        graph_id: impl Into<String>,
        source: EntityInput,
        target: EntityInput,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            graph_id: graph_id.into(),
            source,
            target,
            relationship: relationship.into(),
            properties: Properties::new(),
            weight: default_weight(),
            bidirectional: false,
        }
    }

    /// Sets the edge weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Adds an edge property.
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Makes the relationship traversable in both directions.
    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }
}

/// A traversal query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQuery {
    /// Query kind.
    pub query_type: QueryType,
    /// Node the traversal starts from.
    pub start_node: String,
    /// Destination node; required for path queries.
    #[serde(default)]
    pub end_node: Option<String>,
    /// Hop bound.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl GraphQuery {
    /// All simple paths from `start` to `end`.
    pub fn path(start: impl Into<String>, end: impl Into<String>, max_depth: usize) -> Self {
        Self {
            query_type: QueryType::Path,
            start_node: start.into(),
            end_node: Some(end.into()),
            max_depth,
        }
    }

    /// Nodes within `max_depth` outgoing hops of `start`.
    pub fn neighbors(start: impl Into<String>, max_depth: usize) -> Self {
        Self {
            query_type: QueryType::Neighbors,
            start_node: start.into(),
            end_node: None,
            max_depth,
        }
    }

    /// The connected component containing `start`.
    pub fn cluster(start: impl Into<String>) -> Self {
        Self {
            query_type: QueryType::Cluster,
            start_node: start.into(),
            end_node: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Arguments for [`KnowledgeGraphService::merge_graphs`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    /// Input graphs, in merge order. At least two.
    pub graph_ids: Vec<String>,
    /// Name for the merged graph.
    #[serde(default)]
    pub new_name: Option<String>,
    /// Node collision policy.
    #[serde(default)]
    pub conflict_resolution: ConflictResolution,
}

impl MergeRequest {
    /// Merge `graph_ids` with the default policy and name.
    pub fn new<I, S>(graph_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            graph_ids: graph_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the merged graph's name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.new_name = Some(name.into());
        self
    }

    /// Sets the collision policy.
    pub fn with_resolution(mut self, policy: ConflictResolution) -> Self {
        self.conflict_resolution = policy;
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// Result of `create_graph`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGraphResult {
    pub graph_id: String,
    pub name: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Result of `add_relationship`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRelationshipResult {
    pub success: bool,
    pub edge_id: String,
    pub graph_id: String,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Paths found by a path query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathQueryResult {
    pub start_node: String,
    pub end_node: String,
    /// Hop bound the search actually used.
    pub max_depth: usize,
    /// Hop bound the caller asked for.
    pub requested_depth: usize,
    /// `requested_depth` exceeded the engine limit and was lowered.
    pub depth_clamped: bool,
    pub paths: Vec<Vec<NodeRef>>,
    pub path_count: usize,
    /// More paths existed than `max_path_results` allowed.
    pub truncated: bool,
}

/// Nodes found by a neighbors query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborsResult {
    pub start_node: String,
    pub max_depth: usize,
    pub neighbors: Vec<Neighbor>,
    pub count: usize,
}

/// Members of a cluster query's component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResult {
    pub start_node: String,
    pub nodes: Vec<NodeRef>,
    pub size: usize,
}

/// Result of `query_graph`, tagged by `queryType`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "queryType", rename_all = "snake_case")]
pub enum QueryResult {
    Path(PathQueryResult),
    Neighbors(NeighborsResult),
    Cluster(ClusterResult),
}

/// Top nodes by normalized out-degree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralityReport {
    pub top_nodes: Vec<CentralityScore>,
}

/// Connected components.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunitiesReport {
    pub count: usize,
    pub communities: Vec<Community>,
}

/// Result of `analyze_graph`, tagged by `analysisType`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysisType", rename_all = "snake_case")]
pub enum AnalysisResult {
    Centrality(CentralityReport),
    Communities(CommunitiesReport),
    Anomalies(AnomalyReport),
    Statistics(GraphStatistics),
}

/// Result of `export_graph`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub graph_id: String,
    pub format: ExportFormat,
    pub data: String,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Result of `merge_graphs`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    pub merged_graph_id: String,
    pub name: String,
    pub node_count: usize,
    pub edge_count: usize,
    /// Total collisions, including those not listed.
    pub conflict_count: usize,
    /// First [`MAX_REPORTED_CONFLICTS`] collisions.
    pub conflicts: Vec<MergeConflict>,
}

/// One line of `list_graphs`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub graph_id: String,
    pub name: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&Graph> for GraphSummary {
    fn from(graph: &Graph) -> Self {
        Self {
            graph_id: graph.id.clone(),
            name: graph.name.clone(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            updated_at: graph.updated_at,
        }
    }
}

// ============================================================================
// KnowledgeGraphService
// ============================================================================

/// Graph operations over a pluggable [`GraphStorage`].
pub struct KnowledgeGraphService {
    storage: Arc<dyn GraphStorage>,
    config: EngineConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl fmt::Debug for KnowledgeGraphService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowledgeGraphService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KnowledgeGraphService {
    /// Creates a service with default limits.
    pub fn new(storage: Arc<dyn GraphStorage>) -> Self {
        Self::with_config(storage, EngineConfig::default())
    }

    /// Creates a service with explicit limits.
    pub fn with_config(storage: Arc<dyn GraphStorage>, config: EngineConfig) -> Self {
        Self {
            storage,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The limits this service enforces.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Loads a graph or fails with NotFound.
    pub async fn get_graph(&self, graph_id: &str) -> Result<Graph> {
        self.storage
            .get(graph_id)
            .await?
            .ok_or_else(|| Error::not_found("graph", graph_id))
    }

    async fn graph_lock(&self, graph_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(graph_id.to_string()).or_default())
    }

    /// Drops the caller's handle and removes the table entry once no other
    /// task holds or awaits it.
    async fn release_lock(&self, graph_id: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.locks.lock().await;
        if locks
            .get(graph_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(graph_id);
        }
    }

    /// Number of graphs with a live lock-table entry.
    pub async fn locked_graph_count(&self) -> usize {
        self.locks.lock().await.len()
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Creates and persists a new graph seeded with `entities`.
    ///
    /// When `entities` repeats an id, the first descriptor wins.
    pub async fn create_graph(
        &self,
        name: impl Into<String>,
        entities: Vec<EntityInput>,
    ) -> Result<CreateGraphResult> {
        let mut graph = Graph::new(new_graph_id(), name);
        let now = graph.created_at;
        for entity in entities {
            graph.add_node(entity.into_node(now));
        }

        let result = CreateGraphResult {
            graph_id: graph.id.clone(),
            name: graph.name.clone(),
            node_count: graph.node_count(),
            edge_count: 0,
            created_at: graph.created_at,
        };
        self.storage.save(graph).await?;

        log::info!(
            "Created graph {} '{}' with {} nodes",
            result.graph_id,
            result.name,
            result.node_count
        );
        Ok(result)
    }

    /// Records a relationship, creating missing endpoint nodes.
    ///
    /// Existing nodes are never overwritten by the request's descriptors.
    pub async fn add_relationship(
        &self,
        request: RelationshipRequest,
    ) -> Result<AddRelationshipResult> {
        if !request.weight.is_finite() {
            return Err(Error::invalid_argument(format!(
                "weight must be a finite number, got {}",
                request.weight
            )));
        }

        let graph_id = request.graph_id.clone();
        let lock = self.graph_lock(&graph_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.apply_relationship(request).await
        };
        self.release_lock(&graph_id, lock).await;
        result
    }

    /// Load, mutate and save under the caller's graph lock.
    async fn apply_relationship(
        &self,
        request: RelationshipRequest,
    ) -> Result<AddRelationshipResult> {
        let mut graph = self.get_graph(&request.graph_id).await?;
        let now = Utc::now();
        let source_id = request.source.id.clone();
        let target_id = request.target.id.clone();
        graph.add_node(request.source.into_node(now));
        graph.add_node(request.target.into_node(now));

        let edge = Edge {
            id: new_edge_id(),
            source: source_id,
            target: target_id,
            relationship: request.relationship,
            properties: request.properties,
            weight: request.weight,
            created_at: now,
        };
        let edge_id = edge.id.clone();
        log::debug!(
            "Adding {} -[{}]-> {} to graph {}",
            edge.source,
            edge.relationship,
            edge.target,
            graph.id
        );
        graph.add_edge(edge, request.bidirectional)?;

        let result = AddRelationshipResult {
            success: true,
            edge_id,
            graph_id: graph.id.clone(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
        };
        self.storage.save(graph).await?;
        Ok(result)
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Runs a traversal query.
    ///
    /// An unknown start node produces an empty result rather than an error.
    pub async fn query_graph(&self, graph_id: &str, query: GraphQuery) -> Result<QueryResult> {
        let graph = self.get_graph(graph_id).await?;
        log::debug!(
            "Query {} on graph {} from '{}' (depth {})",
            query.query_type,
            graph_id,
            query.start_node,
            query.max_depth
        );

        let result = match query.query_type {
            QueryType::Path => {
                let end_node = query
                    .end_node
                    .ok_or_else(|| Error::invalid_argument("endNode is required"))?;
                let max_depth = self.path_depth(query.max_depth);
                let search = algorithms::find_paths(
                    &graph,
                    &query.start_node,
                    &end_node,
                    max_depth,
                    self.config.max_path_results,
                );
                if search.truncated {
                    log::warn!(
                        "Path query on graph {graph_id} truncated at {} results",
                        self.config.max_path_results
                    );
                }
                let paths: Vec<Vec<NodeRef>> = search
                    .paths
                    .iter()
                    .map(|path| {
                        path.iter()
                            .filter_map(|id| graph.get_node(id))
                            .map(NodeRef::from)
                            .collect()
                    })
                    .collect();
                QueryResult::Path(PathQueryResult {
                    start_node: query.start_node,
                    end_node,
                    max_depth,
                    requested_depth: query.max_depth,
                    depth_clamped: max_depth < query.max_depth,
                    path_count: paths.len(),
                    paths,
                    truncated: search.truncated,
                })
            }
            QueryType::Neighbors => {
                let neighbors = algorithms::neighbors(&graph, &query.start_node, query.max_depth);
                QueryResult::Neighbors(NeighborsResult {
                    start_node: query.start_node,
                    max_depth: query.max_depth,
                    count: neighbors.len(),
                    neighbors,
                })
            }
            QueryType::Cluster => {
                let nodes = algorithms::cluster(&graph, &query.start_node);
                QueryResult::Cluster(ClusterResult {
                    start_node: query.start_node,
                    size: nodes.len(),
                    nodes,
                })
            }
        };
        Ok(result)
    }

    /// Only path queries are bounded by `EngineConfig::max_depth`.
    fn path_depth(&self, requested: usize) -> usize {
        if requested > self.config.max_depth {
            log::warn!(
                "Requested path depth {requested} exceeds limit {}; clamping",
                self.config.max_depth
            );
            self.config.max_depth
        } else {
            requested
        }
    }

    /// Runs a structural analysis.
    pub async fn analyze_graph(
        &self,
        graph_id: &str,
        analysis_type: AnalysisType,
    ) -> Result<AnalysisResult> {
        let graph = self.get_graph(graph_id).await?;
        log::debug!("Analysis {analysis_type} on graph {graph_id}");

        let result = match analysis_type {
            AnalysisType::Centrality => AnalysisResult::Centrality(CentralityReport {
                top_nodes: algorithms::calculate_centrality(&graph, algorithms::TOP_N),
            }),
            AnalysisType::Communities => {
                let communities = algorithms::communities(&graph);
                AnalysisResult::Communities(CommunitiesReport {
                    count: communities.len(),
                    communities,
                })
            }
            AnalysisType::Anomalies => {
                AnalysisResult::Anomalies(algorithms::detect_anomalies(&graph))
            }
            AnalysisType::Statistics => {
                AnalysisResult::Statistics(algorithms::compute_statistics(&graph))
            }
        };
        Ok(result)
    }

    /// Serializes a graph.
    pub async fn export_graph(&self, graph_id: &str, format: ExportFormat) -> Result<ExportResult> {
        let graph = self.get_graph(graph_id).await?;
        log::debug!("Exporting graph {graph_id} as {format}");

        Ok(ExportResult {
            data: export::export(&graph, format)?,
            graph_id: graph.id.clone(),
            format,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
        })
    }

    // ------------------------------------------------------------------------
    // Merge
    // ------------------------------------------------------------------------

    /// Merges two or more graphs into a new persisted graph.
    ///
    /// Every input is loaded before anything is built, so a missing id
    /// fails the call without persisting anything.
    pub async fn merge_graphs(&self, request: MergeRequest) -> Result<MergeResult> {
        if request.graph_ids.len() < 2 {
            return Err(Error::invalid_argument(format!(
                "at least two graphIds are required, got {}",
                request.graph_ids.len()
            )));
        }

        let mut sources = Vec::with_capacity(request.graph_ids.len());
        for graph_id in &request.graph_ids {
            sources.push(self.get_graph(graph_id).await?);
        }

        let name = request
            .new_name
            .unwrap_or_else(|| format!("Merged Graph ({} sources)", sources.len()));
        let outcome = merge::merge(
            &sources,
            new_graph_id(),
            name,
            request.conflict_resolution,
        );
        let graph = outcome.graph;
        let conflict_count = outcome.conflicts.len();

        let result = MergeResult {
            merged_graph_id: graph.id.clone(),
            name: graph.name.clone(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            conflict_count,
            conflicts: outcome
                .conflicts
                .into_iter()
                .take(MAX_REPORTED_CONFLICTS)
                .collect(),
        };
        self.storage.save(graph).await?;

        log::info!(
            "Merged {} graphs into {} ({} nodes, {} edges, {} conflicts, policy {})",
            sources.len(),
            result.merged_graph_id,
            result.node_count,
            result.edge_count,
            conflict_count,
            request.conflict_resolution
        );
        Ok(result)
    }

    // ------------------------------------------------------------------------
    // Housekeeping
    // ------------------------------------------------------------------------

    /// Summaries of all stored graphs, ordered by id.
    pub async fn list_graphs(&self) -> Result<Vec<GraphSummary>> {
        let mut summaries = Vec::new();
        for graph_id in self.storage.list().await? {
            // A graph deleted between list and get is skipped
            if let Some(graph) = self.storage.get(&graph_id).await? {
                summaries.push(GraphSummary::from(&graph));
            }
        }
        Ok(summaries)
    }

    /// Removes a graph. Returns `false` if it did not exist.
    pub async fn delete_graph(&self, graph_id: &str) -> Result<bool> {
        let lock = self.graph_lock(graph_id).await;
        let deleted = {
            let _guard = lock.lock().await;
            self.storage.delete(graph_id).await
        };
        self.release_lock(graph_id, lock).await;
        let deleted = deleted?;

        if deleted {
            log::info!("Deleted graph {graph_id}");
        }
        Ok(deleted)
    }
}

// ============================================================================
// Tests
// ============================================================================
