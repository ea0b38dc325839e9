//! Tool plumbing for Delve's MCP-facing crates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      delve-mcp                          │
//! ├─────────────────────────────────────────────────────────┤
//! │  ToolRegistry trait: tool listing and dispatch          │
//! │  CompositeRegistry: combine multiple tool sources       │
//! ├─────────────────────────────────────────────────────────┤
//! │  McpErrorExt: delve_core::Error → rmcp ErrorData        │
//! └─────────────────────────────────────────────────────────┘
//! ```

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod error;
pub mod registry;

/// MCP model types, re-exported so tool crates need not depend on `rmcp`.
pub use rmcp::model;

pub use error::McpErrorExt;
pub use registry::{CompositeRegistry, ToolRegistry, ToolResult};
