//! Response creation utilities for generated tool calls

use rmcp::model::{CallToolResult, Content};

/// Create a success response for a tool call
pub fn create_success_response(message: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(message.into())])
}

/// Create a tool-level error response
///
/// The call itself succeeds at the protocol level; the error is reported to
/// the caller inside the result.
pub fn create_error_response(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}
