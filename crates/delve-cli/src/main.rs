//! Delve CLI
//!
//! Drives the knowledge graph tools from the command line.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use delve_cli::cli::{Cli, Command};
use delve_cli::{DelveConfig, commands, config_handlers, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        // Config subcommands must work even when the file is broken
        Command::Config { action } => {
            logging::init(cli.verbose, "warn");
            config_handlers::handle_config_command(config_path, action)?;
        }
        Command::Tools => {
            let config = load_config(config_path, cli.verbose)?;
            commands::cmd_tools(&config)?;
        }
        Command::Run { script } => {
            let config = load_config(config_path, cli.verbose)?;
            commands::cmd_run(&config, &script).await?;
        }
    }
    Ok(())
}

fn load_config(config_path: Option<&str>, verbose: u8) -> Result<DelveConfig> {
    let config = DelveConfig::load(config_path)?;
    logging::init(verbose, &config.logging.level);
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}
