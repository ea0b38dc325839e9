//! Knowledge graph engine for Delve.
//!
//! Research agents build directed, weighted multigraphs incrementally,
//! then query, analyze, export and merge them. All graph state lives in a
//! pluggable [`GraphStorage`]; [`KnowledgeGraphService`] carries the logic.
//!
//! # Modules
//!
//! - [`types`]: `Node`, `Edge`, `Graph` and the operation selectors
//! - [`storage`]: the storage trait and the in-memory backend
//! - [`algorithms`]: traversal and structural analysis
//! - [`export`]: JSON, GraphML and Cypher serialization
//! - [`merge`]: combining graphs under a conflict policy
//! - [`service`]: the six engine operations plus listing and deletion

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod algorithms;
pub mod export;
pub mod merge;
pub mod service;
pub mod storage;
pub mod types;

pub use algorithms::{
    AnomalyReport, CentralityScore, Community, GraphStatistics, HubNode, Neighbor, NodeRef,
};
pub use merge::MergeConflict;
pub use service::{
    AddRelationshipResult, AnalysisResult, CentralityReport, ClusterResult, CommunitiesReport,
    CreateGraphResult, DEFAULT_MAX_DEPTH, EngineConfig, ExportResult, GraphQuery, GraphSummary,
    KnowledgeGraphService, MergeRequest, MergeResult, NeighborsResult, PathQueryResult,
    QueryResult, RelationshipRequest,
};
pub use storage::{GraphStorage, InMemoryGraphStorage};
pub use types::{
    AnalysisType, ConflictResolution, Edge, EntityInput, ExportFormat, Graph, Node, Properties,
    QueryType,
};
