//! Core graph types for Delve.
//!
//! This module provides the fundamental types for building and querying
//! knowledge graphs: [`Node`], [`Edge`], the [`Graph`] aggregate, the
//! caller-facing [`EntityInput`] descriptor, and the small enums that
//! select query, analysis, export and merge behavior.
//!
//! Node and adjacency maps are `BTreeMap`/`BTreeSet`, so every iteration
//! (tie-breaking, component discovery, exports) walks nodes in ascending
//! id order and is stable across runs.

use chrono::{DateTime, Utc};
use delve_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Open-ended property bag attached to nodes and edges.
pub type Properties = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Node
// ============================================================================

/// An entity in the knowledge graph.
///
/// Identity is the caller-supplied `id`; the engine never generates node ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Caller-supplied identifier, unique within a graph.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Free-text type tag (e.g. "person", "company").
    #[serde(rename = "type")]
    pub node_type: String,
    /// Arbitrary key/value attributes.
    #[serde(default)]
    pub properties: Properties,
    /// When the node was first inserted.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// EntityInput
// ============================================================================

/// Entity descriptor supplied by callers.
///
/// Used for the initial entity set of `create_graph` and for the source and
/// target of `add_relationship`, where a descriptor only becomes a [`Node`]
/// if its id is not already present.
///
/// # Example
///
/// ```rust
/// use delve_graph::EntityInput;
///
/// let alice = EntityInput::new("a", "Alice", "person").with_property("age", 41);
/// assert_eq!(alice.properties["age"], 41);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInput {
    /// Node identifier.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Free-text type tag.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Optional attributes.
    #[serde(default)]
    pub properties: Properties,
}

impl EntityInput {
    /// Creates a descriptor with no properties.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            entity_type: entity_type.into(),
            properties: Properties::new(),
        }
    }

    /// Adds a property key-value pair.
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Converts the descriptor into a node stamped with `created_at`.
    pub fn into_node(self, created_at: DateTime<Utc>) -> Node {
        Node {
            id: self.id,
            label: self.label,
            node_type: self.entity_type,
            properties: self.properties,
            created_at,
        }
    }
}

// ============================================================================
// Edge
// ============================================================================

/// A directed, weighted, typed relationship between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Engine-generated identifier.
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Relationship label (free text, e.g. "works_for").
    pub relationship: String,
    /// Arbitrary key/value attributes.
    #[serde(default)]
    pub properties: Properties,
    /// Edge weight.
    pub weight: f64,
    /// When the edge was recorded.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Graph
// ============================================================================

/// The graph aggregate root.
///
/// Invariants maintained by the mutation API:
/// - every node id referenced by an edge or an adjacency set has a node entry;
/// - every node has an adjacency entry (possibly empty);
/// - `updated_at` moves forward on every mutation.
///
/// The adjacency index, not the edge set, encodes traversability: a
/// bidirectional relationship is one [`Edge`] plus two adjacency entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Engine-generated identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Node id → node.
    pub nodes: BTreeMap<String, Node>,
    /// Edge id → edge.
    pub edges: BTreeMap<String, Edge>,
    /// Node id → ids reachable in one outgoing traversal step.
    pub adjacency: BTreeMap<String, BTreeSet<String>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            adjacency: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Gets a node by id.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Checks if a node exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Outgoing adjacency set of a node.
    pub fn neighbors(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.adjacency.get(id)
    }

    /// Size of a node's outgoing adjacency set (0 for unknown ids).
    pub fn out_degree(&self, id: &str) -> usize {
        self.adjacency.get(id).map_or(0, BTreeSet::len)
    }

    /// Returns `true` if `to` is in `from`'s adjacency set.
    pub fn is_adjacent(&self, from: &str, to: &str) -> bool {
        self.adjacency.get(from).is_some_and(|set| set.contains(to))
    }

    /// Refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    // ========================================================================
    // Mutation API
    // ========================================================================

    /// Inserts a node if its id is not already present.
    ///
    /// An existing node is never overwritten. Returns `true` if the node
    /// was inserted.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.adjacency.entry(node.id.clone()).or_default();
        self.nodes.insert(node.id.clone(), node);
        self.touch();
        true
    }

    /// Inserts or replaces a node wholesale.
    ///
    /// The node's adjacency entry is kept (or seeded if missing).
    pub fn replace_node(&mut self, node: Node) {
        self.adjacency.entry(node.id.clone()).or_default();
        self.nodes.insert(node.id.clone(), node);
        self.touch();
    }

    /// Records an edge and its adjacency entries.
    ///
    /// Both endpoints must already exist. When `bidirectional` is set the
    /// reverse adjacency entry is added too; only one edge is stored.
    pub fn add_edge(&mut self, edge: Edge, bidirectional: bool) -> Result<()> {
        if !self.nodes.contains_key(&edge.source) {
            return Err(Error::not_found("node", &edge.source));
        }
        if !self.nodes.contains_key(&edge.target) {
            return Err(Error::not_found("node", &edge.target));
        }

        self.link(&edge.source, &edge.target);
        if bidirectional {
            self.link(&edge.target, &edge.source);
        }
        self.edges.insert(edge.id.clone(), edge);
        self.touch();
        Ok(())
    }

    /// Adds `to` to `from`'s adjacency set.
    fn link(&mut self, from: &str, to: &str) {
        self.adjacency
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Lists structural invariant violations (empty when consistent).
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for edge in self.edges.values() {
            for endpoint in [&edge.source, &edge.target] {
                if !self.nodes.contains_key(endpoint) {
                    issues.push(format!(
                        "edge {} references missing node {endpoint}",
                        edge.id
                    ));
                }
            }
            if !self.is_adjacent(&edge.source, &edge.target) {
                issues.push(format!(
                    "edge {} has no adjacency entry {} -> {}",
                    edge.id, edge.source, edge.target
                ));
            }
        }

        for (from, targets) in &self.adjacency {
            if !self.nodes.contains_key(from) {
                issues.push(format!("adjacency entry for missing node {from}"));
            }
            for to in targets {
                if !self.nodes.contains_key(to) {
                    issues.push(format!("adjacency {from} -> {to} targets missing node"));
                }
            }
        }

        for id in self.nodes.keys() {
            if !self.adjacency.contains_key(id) {
                issues.push(format!("node {id} has no adjacency entry"));
            }
        }

        issues
    }
}

// ============================================================================
// Operation selectors
// ============================================================================

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the wire name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(Error::invalid_argument(format!(
                        "unknown {} '{other}' (expected one of: {})",
                        stringify!($name),
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

string_enum! {
    /// Traversal query kinds.
    QueryType {
        /// All simple paths between two nodes.
        Path => "path",
        /// Nodes reachable within a depth bound.
        Neighbors => "neighbors",
        /// Connected component containing a node.
        Cluster => "cluster",
    }
}

string_enum! {
    /// Structural analysis kinds.
    AnalysisType {
        /// Normalized out-degree ranking.
        Centrality => "centrality",
        /// Connected components.
        Communities => "communities",
        /// Isolated and hub nodes.
        Anomalies => "anomalies",
        /// Type histograms and density.
        Statistics => "statistics",
    }
}

string_enum! {
    /// Export formats.
    ExportFormat {
        /// Pretty-printed JSON dump.
        Json => "json",
        /// GraphML 1.0.
        Graphml => "graphml",
        /// Cypher statements.
        Cypher => "cypher",
    }
}

string_enum! {
    /// Node-collision policy for merges.
    ConflictResolution {
        /// Leave the node already in the merged graph untouched.
        KeepFirst => "keep_first",
        /// Replace the existing node with the incoming one.
        KeepLast => "keep_last",
        /// Shallow-merge incoming properties over the existing node's.
        MergeProperties => "merge_properties",
    }
}

impl Default for ConflictResolution {
    fn default() -> Self {
        Self::KeepFirst
    }
}

// ============================================================================
// Tests
// ============================================================================
