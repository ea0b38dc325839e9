//! Command-line definitions.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Delve: knowledge graphs for research agents
#[derive(Parser, Debug)]
#[command(name = "delve", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DELVE_CONFIG")]
    pub config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available graph tools
    Tools,

    /// Execute a JSON Lines script of tool calls
    Run {
        /// Script file; each line is {"tool": "...", "args": {...}}
        script: PathBuf,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `delve config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,

    /// Print the effective configuration as TOML
    Show,

    /// Write a default configuration file
    Init {
        /// Target file (defaults to the resolved config path)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
