//! Command-line driver for the Delve knowledge graph engine.
//!
//! - [`cli`]: argument definitions
//! - [`config`]: TOML configuration and its resolution
//! - [`logging`]: subscriber setup
//! - [`script`]: JSON Lines tool-call scripts
//! - [`commands`] and [`config_handlers`]: subcommand implementations

#![warn(clippy::all)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;
pub mod error;
pub mod logging;
pub mod script;

pub use config::DelveConfig;
pub use error::{Error, Result};
