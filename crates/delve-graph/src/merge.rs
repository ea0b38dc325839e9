//! Combining several graphs into a fresh one.

use crate::{ConflictResolution, Edge, Graph};
use delve_core::new_edge_id;
use serde::{Deserialize, Serialize};

/// A node id that appeared in more than one input graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConflict {
    /// The colliding node id.
    pub node_id: String,
    /// The input graph whose node collided with the accumulator.
    pub source_graph_id: String,
    /// Policy applied.
    pub resolution: ConflictResolution,
}

/// Output of [`merge`]: the combined graph and every collision seen.
#[derive(Clone, Debug)]
pub struct MergeOutcome {
    /// The new graph (not yet persisted).
    pub graph: Graph,
    /// All node collisions, in input order.
    pub conflicts: Vec<MergeConflict>,
}

/// Merge `sources` into a new graph with the given id and name.
///
/// Nodes are inserted in input order and collisions resolved by `policy`.
/// Every edge is copied under a fresh id. The resulting adjacency index
/// is the union of the inputs' adjacency sets, so bidirectional links
/// survive the merge. Inputs are borrowed and never modified.
pub fn merge(
    sources: &[Graph],
    id: impl Into<String>,
    name: impl Into<String>,
    policy: ConflictResolution,
) -> MergeOutcome {
    let mut merged = Graph::new(id, name);
    let mut conflicts = Vec::new();

    for source in sources {
        for node in source.nodes.values() {
            let Some(existing) = merged.nodes.get(&node.id) else {
                merged.add_node(node.clone());
                continue;
            };

            conflicts.push(MergeConflict {
                node_id: node.id.clone(),
                source_graph_id: source.id.clone(),
                resolution: policy,
            });

            match policy {
                ConflictResolution::KeepFirst => {}
                ConflictResolution::KeepLast => merged.replace_node(node.clone()),
                ConflictResolution::MergeProperties => {
                    let mut combined = existing.clone();
                    for (key, value) in &node.properties {
                        combined.properties.insert(key.clone(), value.clone());
                    }
                    merged.replace_node(combined);
                }
            }
        }

        for edge in source.edges.values() {
            let copy = Edge {
                id: new_edge_id(),
                ..edge.clone()
            };
            merged.edges.insert(copy.id.clone(), copy);
        }

        for (from, targets) in &source.adjacency {
            merged
                .adjacency
                .entry(from.clone())
                .or_default()
                .extend(targets.iter().cloned());
        }
    }

    merged.touch();
    MergeOutcome {
        graph: merged,
        conflicts,
    }
}
