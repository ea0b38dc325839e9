//! Error types for the Delve engine.

use std::path::{Path, PathBuf};

/// Errors that can occur in Delve graph operations.
///
/// Marked `#[non_exhaustive]` so new variants can be added without
/// breaking downstream matches.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A referenced resource (usually a graph) does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of resource ("graph", "tool", ...).
        kind: String,
        /// Identifier that failed to resolve.
        id: String,
    },

    /// Caller-supplied arguments are invalid.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the arguments.
        message: String,
    },

    /// Failure inside a storage backend.
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message.
        message: String,
        /// Source error if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error tied to a path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic.
        message: String,
    },
}

/// Convenience `Result` type alias for Delve operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a not-found error for a resource kind and id.
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a storage error with a message.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a storage error with a message and source error.
    pub fn storage_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns whether the caller is at fault.
    ///
    /// Client errors (missing graphs, bad arguments) map to a 4xx-style
    /// response at the transport layer; everything else is a server-side
    /// failure.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::NotFound { .. } | Error::InvalidArgument { .. } => true,
            Error::Storage { .. }
            | Error::Serialization(_)
            | Error::Io { .. }
            | Error::Config { .. } => false,
        }
    }

    /// Returns `true` for a not-found error on a graph.
    pub fn is_graph_not_found(&self) -> bool {
        matches!(self, Error::NotFound { kind, .. } if kind == "graph")
    }
}
