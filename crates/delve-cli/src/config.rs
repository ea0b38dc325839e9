//! Configuration for the `delve` binary.
//!
//! Settings live in a TOML file:
//!
//! ```toml
//! [graph]
//! max_path_results = 1000
//! max_depth = 10
//! default_max_depth = 3
//!
//! [logging]
//! level = "info"
//! ```
//!
//! The file is located through `--config`, then the `DELVE_CONFIG`
//! environment variable, then `<config dir>/delve/config.toml`. A missing
//! file at the default location means defaults; a missing explicit file
//! is an error.

use delve_core::{Error, Result};
use delve_graph::{DEFAULT_MAX_DEPTH, EngineConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project name used for the config directory.
pub const PROJECT_NAME: &str = "delve";

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "DELVE_CONFIG";

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelveConfig {
    /// Engine limits and query defaults.
    pub graph: GraphConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// `[graph]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Cap on paths returned by one path query.
    pub max_path_results: usize,
    /// Largest hop bound a path query may use.
    pub max_depth: usize,
    /// Hop bound used when a query gives none.
    pub default_max_depth: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            max_path_results: engine.max_path_results,
            max_depth: engine.max_depth,
            default_max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// `[logging]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DelveConfig {
    /// Default config file location, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// The explicit path if given, otherwise the default location.
    ///
    /// The `DELVE_CONFIG` variable arrives through clap as an explicit path.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        explicit
            .map(PathBuf::from)
            .or_else(Self::default_config_path)
    }

    /// Loads and validates configuration.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    log::debug!("No config file found; using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Reads one file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.graph.max_path_results == 0 {
            return Err(Error::config("graph.max_path_results must be at least 1"));
        }
        if self.graph.default_max_depth > self.graph.max_depth {
            return Err(Error::config(format!(
                "graph.default_max_depth ({}) exceeds graph.max_depth ({})",
                self.graph.default_max_depth, self.graph.max_depth
            )));
        }
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::config(format!(
                "logging.level '{}' is not one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Engine limits derived from the `[graph]` section.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_path_results: self.graph.max_path_results,
            max_depth: self.graph.max_depth,
        }
    }
}
