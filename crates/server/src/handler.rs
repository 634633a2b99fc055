//! MCP server handler implementation.
//!
//! Routes tool calls onto the shared [`Interceptor`].

use std::sync::Arc;

use crate::lifecycle::Interceptor;
use crate::tools::cache::{CacheGetParams, get_impl};
use crate::tools::{
    DrinkSearchParams, PostMessageParams, ShellFetchParams, fetch_impl, post_message_impl, search_impl, status_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for appshell.
#[derive(Clone)]
pub struct AppShellServer {
    tool_router: ToolRouter<Self>,
    interceptor: Arc<Interceptor>,
}

#[tool_router]
impl AppShellServer {
    pub fn new(interceptor: Arc<Interceptor>) -> Self {
        Self { tool_router: Self::tool_router(), interceptor }
    }

    #[tool(
        description = "Fetch a URL through the offline interceptor. Paths resolve against the app origin. Returns the class, source and response."
    )]
    async fn shell_fetch(&self, params: Parameters<ShellFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.interceptor, params.0).await
    }

    /// Search drinks by name through the interceptor.
    ///
    /// Falls back to a single placeholder drink when the API is unreachable.
    #[tool(description = "Search cocktails by name. Returns an offline placeholder when the API cannot be reached.")]
    async fn drink_search(&self, params: Parameters<DrinkSearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.interceptor, params.0).await
    }

    #[tool(description = "Post a control message to the interceptor, e.g. {\"type\": \"SKIP_WAITING\"}.")]
    async fn post_message(&self, params: Parameters<PostMessageParams>) -> Result<CallToolResult, McpError> {
        post_message_impl(&self.interceptor, params.0).await
    }

    #[tool(description = "Report lifecycle state, stored cache generations and the last install result.")]
    async fn lifecycle_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.interceptor).await
    }

    #[tool(description = "Look up the active cache generation's entry for a URL without using the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.interceptor, params.0).await
    }
}

impl ServerHandler for AppShellServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "appshell".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_support::interceptor;

    #[tokio::test]
    async fn test_lists_every_tool() {
        let server = AppShellServer::new(Arc::new(interceptor(&[]).await));
        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(names, vec!["cache_get", "drink_search", "lifecycle_status", "post_message", "shell_fetch"]);
    }
}
