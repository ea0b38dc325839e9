//! Mapping engine errors onto MCP error data.

use rmcp::model::ErrorData;

/// Converts an error into the MCP wire representation.
pub trait McpErrorExt {
    /// Caller mistakes become `invalid_params`; everything else is
    /// reported as `internal_error`.
    fn to_mcp_error(&self) -> ErrorData;
}

impl McpErrorExt for delve_core::Error {
    fn to_mcp_error(&self) -> ErrorData {
        if self.is_client_error() {
            ErrorData::invalid_params(self.to_string(), None)
        } else {
            ErrorData::internal_error(self.to_string(), None)
        }
    }
}
