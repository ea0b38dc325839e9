//! MCP tools for the knowledge graph engine.
//!
//! Provides `GraphTools`, which implements `ToolRegistry` by delegating to
//! a shared `KnowledgeGraphService`.

use delve_core::{Error, Result};
use delve_graph::{
    AnalysisType, EntityInput, ExportFormat, GraphQuery, KnowledgeGraphService, MergeRequest,
    QueryType, RelationshipRequest, DEFAULT_MAX_DEPTH,
};
use delve_mcp::error::McpErrorExt;
use delve_mcp::model::{CallToolResult, Content, ErrorData, Tool};
use delve_mcp::registry::{ToolRegistry, ToolResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

/// Names of every tool `GraphTools` provides.
pub const TOOL_NAMES: &[&str] = &[
    "graph_create",
    "graph_add_relationship",
    "graph_query",
    "graph_analyze",
    "graph_export",
    "graph_merge",
    "graph_list",
    "graph_delete",
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_schema(value: Value) -> Arc<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    }
}

fn make_tool(name: &str, description: &str, schema: Value) -> Tool {
    Tool::new(
        name.to_string(),
        description.to_string(),
        json_schema(schema),
    )
}

fn serialize_response(value: &Value) -> std::result::Result<CallToolResult, ErrorData> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Deserializes tool arguments; a missing argument object counts as `{}`.
fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| Error::invalid_argument(e.to_string()))
}

fn entity_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "description": description,
        "properties": {
            "id": { "type": "string", "description": "Caller-chosen node ID" },
            "label": { "type": "string", "description": "Display label" },
            "type": { "type": "string", "description": "Entity type (e.g., person, company)" },
            "properties": { "type": "object", "description": "Arbitrary attributes" }
        },
        "required": ["id", "label", "type"]
    })
}

// ---------------------------------------------------------------------------
// Argument types
// ---------------------------------------------------------------------------

/// Arguments for graph_create.
#[derive(Debug, Deserialize)]
pub struct CreateArgs {
    /// Graph name.
    pub name: String,
    /// Initial entities.
    #[serde(default)]
    pub entities: Vec<EntityInput>,
}

/// Arguments for graph_query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryArgs {
    pub graph_id: String,
    pub query_type: QueryType,
    pub start_node: String,
    pub end_node: Option<String>,
    /// Hop bound (default 3).
    pub max_depth: Option<usize>,
}

impl QueryArgs {
    fn into_query(self) -> (String, GraphQuery) {
        let query = GraphQuery {
            query_type: self.query_type,
            start_node: self.start_node,
            end_node: self.end_node,
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        };
        (self.graph_id, query)
    }
}

/// Arguments for graph_analyze.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeArgs {
    pub graph_id: String,
    pub analysis_type: AnalysisType,
}

/// Arguments for graph_export.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArgs {
    pub graph_id: String,
    pub format: ExportFormat,
}

/// Arguments for graph_delete.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteArgs {
    pub graph_id: String,
}

// ---------------------------------------------------------------------------
// GraphTools
// ---------------------------------------------------------------------------

/// MCP tools for knowledge graph construction and analysis.
///
/// Cloning is cheap; clones share the same service.
#[derive(Clone, Debug)]
pub struct GraphTools {
    service: Arc<KnowledgeGraphService>,
}

impl GraphTools {
    /// Create graph tools over a shared service.
    pub fn new(service: Arc<KnowledgeGraphService>) -> Self {
        Self { service }
    }

    /// The underlying service.
    pub fn service(&self) -> &Arc<KnowledgeGraphService> {
        &self.service
    }

    /// Runs a tool and returns its JSON result.
    ///
    /// Unknown tool names fail with a `tool` NotFound error; malformed
    /// arguments fail with InvalidArgument.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<Value> {
        log::debug!("Dispatching tool {name}");
        let service = &self.service;

        let value = match name {
            "graph_create" => {
                let args: CreateArgs = parse_args(args)?;
                serde_json::to_value(service.create_graph(args.name, args.entities).await?)?
            }
            "graph_add_relationship" => {
                let request: RelationshipRequest = parse_args(args)?;
                serde_json::to_value(service.add_relationship(request).await?)?
            }
            "graph_query" => {
                let (graph_id, query) = parse_args::<QueryArgs>(args)?.into_query();
                serde_json::to_value(service.query_graph(&graph_id, query).await?)?
            }
            "graph_analyze" => {
                let args: AnalyzeArgs = parse_args(args)?;
                serde_json::to_value(
                    service
                        .analyze_graph(&args.graph_id, args.analysis_type)
                        .await?,
                )?
            }
            "graph_export" => {
                let args: ExportArgs = parse_args(args)?;
                serde_json::to_value(service.export_graph(&args.graph_id, args.format).await?)?
            }
            "graph_merge" => {
                let request: MergeRequest = parse_args(args)?;
                serde_json::to_value(service.merge_graphs(request).await?)?
            }
            "graph_list" => {
                let graphs = service.list_graphs().await?;
                json!({
                    "count": graphs.len(),
                    "graphs": graphs
                })
            }
            "graph_delete" => {
                let args: DeleteArgs = parse_args(args)?;
                let deleted = service.delete_graph(&args.graph_id).await?;
                json!({
                    "graphId": args.graph_id,
                    "deleted": deleted
                })
            }
            other => return Err(Error::not_found("tool", other)),
        };
        Ok(value)
    }
}

impl ToolRegistry for GraphTools {
    fn tools(&self) -> Vec<Tool> {
        vec![
            make_tool(
                "graph_create",
                "Create a new knowledge graph, optionally seeded with entities",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Graph name"
                        },
                        "entities": {
                            "type": "array",
                            "description": "Initial entities; duplicate IDs keep the first",
                            "items": entity_schema("Entity")
                        }
                    },
                    "required": ["name"]
                }),
            ),
            make_tool(
                "graph_add_relationship",
                "Add a relationship between two entities, creating missing entities",
                json!({
                    "type": "object",
                    "properties": {
                        "graphId": {
                            "type": "string",
                            "description": "Graph ID"
                        },
                        "source": entity_schema("Source entity"),
                        "target": entity_schema("Target entity"),
                        "relationship": {
                            "type": "string",
                            "description": "Relationship label (e.g., works_for)"
                        },
                        "properties": {
                            "type": "object",
                            "description": "Relationship attributes"
                        },
                        "weight": {
                            "type": "number",
                            "description": "Edge weight (default 1.0)"
                        },
                        "bidirectional": {
                            "type": "boolean",
                            "description": "Also traversable from target to source (default false)"
                        }
                    },
                    "required": ["graphId", "source", "target", "relationship"]
                }),
            ),
            make_tool(
                "graph_query",
                "Find paths, neighbors or the cluster around a node",
                json!({
                    "type": "object",
                    "properties": {
                        "graphId": {
                            "type": "string",
                            "description": "Graph ID"
                        },
                        "queryType": {
                            "type": "string",
                            "enum": QueryType::ALL.iter().map(QueryType::as_str).collect::<Vec<_>>(),
                            "description": "Kind of traversal"
                        },
                        "startNode": {
                            "type": "string",
                            "description": "Node ID to start from"
                        },
                        "endNode": {
                            "type": "string",
                            "description": "Destination node ID (required for path)"
                        },
                        "maxDepth": {
                            "type": "integer",
                            "description": "Maximum hops (default 3)"
                        }
                    },
                    "required": ["graphId", "queryType", "startNode"]
                }),
            ),
            make_tool(
                "graph_analyze",
                "Analyze graph structure",
                json!({
                    "type": "object",
                    "properties": {
                        "graphId": {
                            "type": "string",
                            "description": "Graph ID"
                        },
                        "analysisType": {
                            "type": "string",
                            "enum": AnalysisType::ALL.iter().map(AnalysisType::as_str).collect::<Vec<_>>(),
                            "description": "Kind of analysis"
                        }
                    },
                    "required": ["graphId", "analysisType"]
                }),
            ),
            make_tool(
                "graph_export",
                "Export a graph as JSON, GraphML or Cypher",
                json!({
                    "type": "object",
                    "properties": {
                        "graphId": {
                            "type": "string",
                            "description": "Graph ID"
                        },
                        "format": {
                            "type": "string",
                            "enum": ExportFormat::ALL.iter().map(ExportFormat::as_str).collect::<Vec<_>>(),
                            "description": "Output format"
                        }
                    },
                    "required": ["graphId", "format"]
                }),
            ),
            make_tool(
                "graph_merge",
                "Merge two or more graphs into a new graph",
                json!({
                    "type": "object",
                    "properties": {
                        "graphIds": {
                            "type": "array",
                            "items": { "type": "string" },
                            "minItems": 2,
                            "description": "Graphs to merge, in order"
                        },
                        "newName": {
                            "type": "string",
                            "description": "Name for the merged graph"
                        },
                        "conflictResolution": {
                            "type": "string",
                            "enum": ["keep_first", "keep_last", "merge_properties"],
                            "description": "How to resolve duplicate node IDs (default keep_first)"
                        }
                    },
                    "required": ["graphIds"]
                }),
            ),
            make_tool(
                "graph_list",
                "List stored graphs",
                json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
            make_tool(
                "graph_delete",
                "Delete a graph",
                json!({
                    "type": "object",
                    "properties": {
                        "graphId": {
                            "type": "string",
                            "description": "Graph ID"
                        }
                    },
                    "required": ["graphId"]
                }),
            ),
        ]
    }

    fn call(&self, name: &str, args: Value) -> Option<ToolResult> {
        if !TOOL_NAMES.contains(&name) {
            return None;
        }

        let tools = self.clone();
        let name = name.to_string();
        Some(Box::pin(async move {
            let value = tools
                .dispatch(&name, args)
                .await
                .map_err(|e| e.to_mcp_error())?;
            serialize_response(&value)
        }))
    }

    fn has_tool(&self, name: &str) -> bool {
        TOOL_NAMES.contains(&name)
    }
}

// ============================================================================
// Tests
// ============================================================================
