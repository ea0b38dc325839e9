//! Identifier generation.
//!
//! Graphs and edges receive engine-generated identifiers; node ids are
//! always supplied by the caller and never pass through here.

use uuid::Uuid;

/// Prefix for graph identifiers.
pub const GRAPH_ID_PREFIX: &str = "graph_";

/// Prefix for edge identifiers.
pub const EDGE_ID_PREFIX: &str = "edge_";

/// Generate a fresh, globally unique graph identifier.
///
/// # Examples
///
/// ```
/// use delve_core::util::ids::new_graph_id;
///
/// let id = new_graph_id();
/// assert!(id.starts_with("graph_"));
/// assert_ne!(id, new_graph_id());
/// ```
pub fn new_graph_id() -> String {
    prefixed(GRAPH_ID_PREFIX)
}

/// Generate a fresh, globally unique edge identifier.
///
/// # Examples
///
/// ```
/// use delve_core::util::ids::new_edge_id;
///
/// assert!(new_edge_id().starts_with("edge_"));
/// ```
pub fn new_edge_id() -> String {
    prefixed(EDGE_ID_PREFIX)
}

fn prefixed(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}
