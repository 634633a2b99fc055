//! MCP tool implementations.
//!
//! Each tool drives the [`Interceptor`](crate::lifecycle::Interceptor) and
//! renders its result as pretty JSON text content.

pub mod cache;
pub mod drink_search;
pub mod lifecycle;
pub mod shell_fetch;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::HostError;

pub use drink_search::{DrinkSearchParams, search_impl};
pub use lifecycle::{PostMessageParams, post_message_impl, status_impl};
pub use shell_fetch::{ShellFetchParams, fetch_impl};

/// Wrap a serializable output as a successful tool result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| HostError::Encode(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) fn result_json(result: &CallToolResult) -> serde_json::Value {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
