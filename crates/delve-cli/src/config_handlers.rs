//! Handler functions for `delve config` subcommands.

use crate::cli::ConfigAction;
use crate::config::{DelveConfig, PROJECT_NAME};
use delve_core::{Error, Result};
use std::path::PathBuf;

/// Dispatch a config subcommand.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Show => cmd_config_show(config_path),
        ConfigAction::Init { file, force } => {
            let target = file.as_deref().or(config_path);
            cmd_config_init(target, force).map(|path| {
                println!("Config file created at {}", path.display());
            })
        }
    }
}

/// Show the resolved config file path.
pub fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = DelveConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist; run `{PROJECT_NAME} config init` to create it)");
    }
    Ok(())
}

/// Print the effective configuration.
pub fn cmd_config_show(config_path: Option<&str>) -> Result<()> {
    let config = DelveConfig::load(config_path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

/// Write a default configuration file and return its path.
pub fn cmd_config_init(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = DelveConfig::resolve_config_path(file)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = DelveConfig::default().to_toml_string()?;
    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;
    log::debug!("Wrote default config to {}", path.display());
    Ok(path)
}
