//! post_message and lifecycle_status tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::lifecycle::{Interceptor, LifecycleState};

/// Parameters for the post_message tool, mirroring `{"type": "SKIP_WAITING"}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostMessageParams {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostMessageOutput {
    /// Whether the message type was recognized.
    pub accepted: bool,
    pub state: LifecycleState,
}

pub async fn post_message_impl(interceptor: &Interceptor, params: PostMessageParams) -> Result<CallToolResult, McpError> {
    let accepted = interceptor.on_message(&params.kind).await;
    json_result(&PostMessageOutput { accepted, state: interceptor.state().await })
}

pub async fn status_impl(interceptor: &Interceptor) -> Result<CallToolResult, McpError> {
    let status = interceptor.status().await?;
    json_result(&status)
}
