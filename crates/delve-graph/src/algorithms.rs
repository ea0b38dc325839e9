//! Graph algorithms for knowledge graph queries and analysis.
//!
//! Provides algorithms for:
//! - Path enumeration (all simple paths up to a hop bound, BFS)
//! - Neighborhood exploration (N-hop BFS over outgoing adjacency)
//! - Connected components (iterative DFS, adjacency treated as undirected)
//! - Centrality (normalized out-degree)
//! - Anomaly detection (isolated and hub nodes)
//! - Summary statistics (type histograms, density, cycles)
//!
//! All algorithms are pure functions over a borrowed [`Graph`] and walk
//! nodes in ascending id order.

use crate::{Graph, Node};
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Number of entries reported by ranked analyses (centrality, hubs).
pub const TOP_N: usize = 10;

/// Number of members listed per community.
pub const COMMUNITY_MEMBER_PREVIEW: usize = 10;

// ============================================================================
// Result types
// ============================================================================

/// Compact node rendering used in query results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    /// Node id.
    pub id: String,
    /// Node label.
    pub label: String,
    /// Node type tag.
    #[serde(rename = "type")]
    pub node_type: String,
}

impl From<&Node> for NodeRef {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            node_type: node.node_type.clone(),
        }
    }
}

/// Outcome of a path enumeration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathSearch {
    /// Paths as node-id sequences, shortest first.
    pub paths: Vec<Vec<String>>,
    /// `true` if more paths existed than the result cap allowed.
    pub truncated: bool,
}

/// A node reached by a neighborhood query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    /// The reached node.
    #[serde(flatten)]
    pub node: NodeRef,
    /// Hop count at which the node was first reached.
    pub depth: usize,
}

/// Centrality score for a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralityScore {
    /// Node id.
    pub node_id: String,
    /// Node label.
    pub label: String,
    /// Normalized out-degree (0.0 to 1.0).
    pub score: f64,
    /// Raw out-adjacency size.
    pub out_degree: usize,
}

/// Summary of one connected component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    /// Zero-based component index, in discovery order.
    pub id: usize,
    /// Number of member nodes.
    pub size: usize,
    /// Up to [`COMMUNITY_MEMBER_PREVIEW`] member ids, ascending.
    pub members: Vec<String>,
}

/// A node whose degree exceeds twice the average.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubNode {
    /// Node id.
    pub id: String,
    /// Node label.
    pub label: String,
    /// Out-adjacency size.
    pub degree: usize,
}

/// Isolated and hub nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    /// `2E / max(N, 1)`.
    pub average_degree: f64,
    /// Nodes with an empty adjacency set.
    pub isolated_nodes: Vec<String>,
    /// Top hubs by degree, descending.
    pub hub_nodes: Vec<HubNode>,
}

/// Summary statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of edges.
    pub edge_count: usize,
    /// Node type → count.
    pub node_types: BTreeMap<String, usize>,
    /// Relationship → count.
    pub relationship_types: BTreeMap<String, usize>,
    /// `2E / (N (N - 1))`, or 0 when N <= 1.
    ///
    /// This is the undirected density formula applied to a directed
    /// multigraph, so it can exceed 1 with parallel edges.
    pub density: f64,
    /// Whether the adjacency index contains a directed cycle.
    pub has_cycles: bool,
    /// Number of strongly connected components in the adjacency index.
    pub strongly_connected_components: usize,
}

// ============================================================================
// Traversal
// ============================================================================

/// Enumerate every simple path from `start` to `end` with at most
/// `max_depth` hops.
///
/// Breadth-first: each queue entry carries its full node sequence, and a
/// node already on the current path is never revisited. At most `limit`
/// paths are returned; if another path exists beyond the cap the result
/// is flagged `truncated`. An unknown `start` yields no paths.
pub fn find_paths(
    graph: &Graph,
    start: &str,
    end: &str,
    max_depth: usize,
    limit: usize,
) -> PathSearch {
    let mut search = PathSearch::default();
    if !graph.contains_node(start) {
        return search;
    }

    let mut queue: VecDeque<Vec<String>> = VecDeque::new();
    queue.push_back(vec![start.to_string()]);

    while let Some(path) = queue.pop_front() {
        let Some(current) = path.last() else {
            continue;
        };

        if current == end {
            if search.paths.len() >= limit {
                search.truncated = true;
                break;
            }
            search.paths.push(path);
            continue;
        }

        // path.len() - 1 hops taken so far
        if path.len() > max_depth {
            continue;
        }

        if let Some(next) = graph.neighbors(current) {
            for neighbor in next {
                if !path.contains(neighbor) {
                    let mut extended = path.clone();
                    extended.push(neighbor.clone());
                    queue.push_back(extended);
                }
            }
        }
    }

    search
}

/// Collect the distinct nodes reachable from `start` within `max_depth`
/// outgoing hops, excluding `start`, in BFS order.
pub fn neighbors(graph: &Graph, start: &str, max_depth: usize) -> Vec<Neighbor> {
    let mut result = Vec::new();
    if !graph.contains_node(start) {
        return result;
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    visited.insert(start);
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let Some(next) = graph.neighbors(current) else {
            continue;
        };
        for neighbor in next {
            if visited.insert(neighbor.as_str()) {
                if let Some(node) = graph.get_node(neighbor) {
                    result.push(Neighbor {
                        node: NodeRef::from(node),
                        depth: depth + 1,
                    });
                }
                queue.push_back((neighbor.as_str(), depth + 1));
            }
        }
    }

    result
}

/// Build the undirected view of the adjacency index.
fn undirected_adjacency(graph: &Graph) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut view: BTreeMap<&str, BTreeSet<&str>> = graph
        .nodes
        .keys()
        .map(|id| (id.as_str(), BTreeSet::new()))
        .collect();

    for (from, targets) in &graph.adjacency {
        for to in targets {
            view.entry(from.as_str()).or_default().insert(to.as_str());
            view.entry(to.as_str()).or_default().insert(from.as_str());
        }
    }
    view
}

/// Compute connected components, treating adjacency as undirected.
///
/// Uses an explicit stack (no recursion). A new component starts at every
/// unvisited node in ascending id order; members of each component are
/// returned sorted.
pub fn connected_components(graph: &Graph) -> Vec<Vec<String>> {
    let view = undirected_adjacency(graph);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut components = Vec::new();

    for id in graph.nodes.keys() {
        if visited.contains(id.as_str()) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![id.as_str()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            component.push(current.to_string());
            if let Some(adjacent) = view.get(current) {
                stack.extend(adjacent.iter().filter(|n| !visited.contains(*n)));
            }
        }

        component.sort();
        components.push(component);
    }

    components
}

/// The connected component containing `start`, as node references.
///
/// Empty when `start` is not in the graph.
pub fn cluster(graph: &Graph, start: &str) -> Vec<NodeRef> {
    connected_components(graph)
        .into_iter()
        .find(|component| component.iter().any(|id| id == start))
        .map(|component| {
            component
                .iter()
                .filter_map(|id| graph.get_node(id))
                .map(NodeRef::from)
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Analysis
// ============================================================================

/// Rank nodes by normalized out-degree and return the top `limit`.
///
/// Score is `out_degree / (N - 1)`, and 0 for every node when N <= 1.
/// A self-loop does not count toward `out_degree`, so scores stay within
/// `[0, 1]`. Ties keep ascending id order.
pub fn calculate_centrality(graph: &Graph, limit: usize) -> Vec<CentralityScore> {
    let n = graph.node_count();
    let mut scores: Vec<CentralityScore> = graph
        .nodes
        .values()
        .map(|node| {
            let out_degree = graph
                .neighbors(&node.id)
                .map_or(0, |set| set.len() - usize::from(set.contains(&node.id)));
            let score = if n > 1 {
                out_degree as f64 / (n - 1) as f64
            } else {
                0.0
            };
            CentralityScore {
                node_id: node.id.clone(),
                label: node.label.clone(),
                score,
                out_degree,
            }
        })
        .collect();

    // Stable sort keeps the ascending-id order for equal scores
    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scores.truncate(limit);
    scores
}

/// Summarize connected components with a member preview.
pub fn communities(graph: &Graph) -> Vec<Community> {
    connected_components(graph)
        .into_iter()
        .enumerate()
        .map(|(id, members)| Community {
            id,
            size: members.len(),
            members: members.into_iter().take(COMMUNITY_MEMBER_PREVIEW).collect(),
        })
        .collect()
}

/// Find isolated nodes and hubs.
///
/// Average degree is `2E / max(N, 1)`; a hub's out-degree exceeds twice
/// that average. Hubs are sorted by degree descending (ties by id) and
/// capped at [`TOP_N`].
pub fn detect_anomalies(graph: &Graph) -> AnomalyReport {
    let average_degree = (2 * graph.edge_count()) as f64 / graph.node_count().max(1) as f64;

    let isolated_nodes = graph
        .adjacency
        .iter()
        .filter(|(_, targets)| targets.is_empty())
        .map(|(id, _)| id.clone())
        .collect();

    let mut hub_nodes: Vec<HubNode> = graph
        .nodes
        .values()
        .filter_map(|node| {
            let degree = graph.out_degree(&node.id);
            (degree as f64 > 2.0 * average_degree).then(|| HubNode {
                id: node.id.clone(),
                label: node.label.clone(),
                degree,
            })
        })
        .collect();
    hub_nodes.sort_by(|a, b| b.degree.cmp(&a.degree));
    hub_nodes.truncate(TOP_N);

    AnomalyReport {
        average_degree,
        isolated_nodes,
        hub_nodes,
    }
}

/// Compute type histograms, density and cycle structure.
pub fn compute_statistics(graph: &Graph) -> GraphStatistics {
    let n = graph.node_count();
    let e = graph.edge_count();

    let mut node_types: BTreeMap<String, usize> = BTreeMap::new();
    for node in graph.nodes.values() {
        *node_types.entry(node.node_type.clone()).or_default() += 1;
    }

    let mut relationship_types: BTreeMap<String, usize> = BTreeMap::new();
    for edge in graph.edges.values() {
        *relationship_types
            .entry(edge.relationship.clone())
            .or_default() += 1;
    }

    let density = if n > 1 {
        (2 * e) as f64 / (n * (n - 1)) as f64
    } else {
        0.0
    };

    let view = adjacency_digraph(graph);

    GraphStatistics {
        node_count: n,
        edge_count: e,
        node_types,
        relationship_types,
        density,
        has_cycles: petgraph::algo::is_cyclic_directed(&view),
        strongly_connected_components: petgraph::algo::kosaraju_scc(&view).len(),
    }
}

/// Borrowing petgraph view of the adjacency index.
fn adjacency_digraph(graph: &Graph) -> DiGraphMap<&str, ()> {
    let mut view = DiGraphMap::new();
    for id in graph.nodes.keys() {
        view.add_node(id.as_str());
    }
    for (from, targets) in &graph.adjacency {
        for to in targets {
            view.add_edge(from.as_str(), to.as_str(), ());
        }
    }
    view
}

// ============================================================================
// Tests
// ============================================================================
