//! Error types for delve-cli

use thiserror::Error;

/// Result type alias for delve-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in delve-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from delve-core
    #[error(transparent)]
    Core(#[from] delve_core::Error),

    /// A script line could not be parsed.
    #[error("{path}:{line}: {message}")]
    ScriptParse {
        /// Script file.
        path: String,
        /// One-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// A script call failed.
    #[error("call {index} ({tool}) failed: {source}")]
    ScriptCall {
        /// Zero-based call index.
        index: usize,
        /// Tool name.
        tool: String,
        /// Underlying failure.
        #[source]
        source: delve_core::Error,
    },
}
