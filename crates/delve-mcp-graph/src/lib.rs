//! Knowledge graph tools for Delve agents.
//!
//! This crate provides MCP tools that delegate to `delve-graph`'s
//! `KnowledgeGraphService`.
//!
//! # Tools
//!
//! - `graph_create`: new graph, optionally seeded with entities
//! - `graph_add_relationship`: record an edge, creating missing nodes
//! - `graph_query`: paths, neighbors or cluster around a node
//! - `graph_analyze`: centrality, communities, anomalies or statistics
//! - `graph_export`: JSON, GraphML or Cypher
//! - `graph_merge`: combine graphs under a conflict policy
//! - `graph_list`: stored graphs
//! - `graph_delete`: drop a graph
//!
//! # Example
//!
//! ```rust,ignore
//! use delve_graph::{InMemoryGraphStorage, KnowledgeGraphService};
//! use delve_mcp::CompositeRegistry;
//! use delve_mcp_graph::GraphTools;
//!
//! let service = Arc::new(KnowledgeGraphService::new(Arc::new(InMemoryGraphStorage::new())));
//! let registry = CompositeRegistry::new().add(GraphTools::new(service));
//! ```

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod tools;

// Re-exports
pub use tools::{
    AnalyzeArgs, CreateArgs, DeleteArgs, ExportArgs, GraphTools, QueryArgs, TOOL_NAMES,
};
