//! Error handling utilities for MCP server

use orderly_core::OrderlyError;
use rmcp::ErrorData;

/// Convert a service error into an MCP error.
///
/// Client errors (400, 404, 409) become `invalid_params`; everything else is
/// an internal error. The message keeps the status code so clients can tell
/// a missing order from a lost race.
pub fn to_mcp_error(message: &str, error: &OrderlyError) -> ErrorData {
    let body = error.body();
    let text = format!("{message}: [{}] {}", body.code, body.message);
    if error.is_client_error() {
        ErrorData::invalid_params(text, None)
    } else {
        ErrorData::internal_error(text, None)
    }
}

/// Convert a binary-side failure, such as a state file write, into an MCP error.
pub fn to_internal_error(message: &str, error: &anyhow::Error) -> ErrorData {
    ErrorData::internal_error(format!("{message}: {error:#}"), None)
}
