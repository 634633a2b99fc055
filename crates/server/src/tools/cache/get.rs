//! cache_get tool implementation.
//!
//! Looks up the active generation's stored response for a URL without
//! touching the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use appshell_core::Error;

use crate::lifecycle::Interceptor;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the application origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize)]
pub struct CacheGetOutput {
    pub version: String,
    /// URL of the matched entry, which may differ from the request for vendor stylesheets.
    pub url: String,
    pub status: u16,
    pub stored_at: String,
    pub body_bytes: usize,
}

pub async fn get_impl(interceptor: &Interceptor, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let request = interceptor.resolve(&params.url)?;
    let entry = interceptor
        .engine()
        .store()
        .get(&request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.key().to_string()))?;

    let output = CacheGetOutput {
        version: entry.version,
        url: entry.url,
        status: entry.status,
        stored_at: entry.stored_at,
        body_bytes: entry.body.len(),
    };

    json_result(&output)
}
