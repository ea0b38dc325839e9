//! Utility modules.
//!
//! # Modules
//!
//! - [`ids`]: Engine-generated identifiers for graphs and edges

pub mod ids;
