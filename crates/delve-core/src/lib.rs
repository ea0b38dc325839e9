//! Delve Core: shared errors and identifier utilities.
//!
//! This crate provides the foundational types used across all Delve crates.
//! It has no internal Delve dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`util`]: Identifier generation

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod error;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};

// Convenience re-exports from util
pub use util::ids::{new_edge_id, new_graph_id};
