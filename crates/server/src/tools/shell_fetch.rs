//! shell_fetch tool implementation.
//!
//! Routes one request through the interceptor exactly as a page load would.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use appshell_client::Source;
use appshell_core::ResourceClass;

use super::json_result;
use crate::error::HostError;
use crate::lifecycle::Interceptor;

/// Parameters for the shell_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShellFetchParams {
    /// Absolute URL, or a path resolved against the application origin.
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

/// Output from the shell_fetch tool.
#[derive(Debug, Clone, Serialize)]
pub struct ShellFetchOutput {
    pub url: String,
    pub class: ResourceClass,
    /// Where the response came from: `cache`, `network` or `fallback`.
    pub source: Source,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<HeaderPair>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    pub body_bytes: usize,
}

pub async fn fetch_impl(interceptor: &Interceptor, params: ShellFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(HostError::InvalidInput("url cannot be empty".into()).into());
    }

    let request = interceptor.resolve(&params.url)?;
    let handled = interceptor.on_request(&request).await;
    let response = handled.response;

    let output = ShellFetchOutput {
        url: request.key().to_string(),
        class: handled.class,
        source: handled.source,
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        headers: response
            .headers
            .iter()
            .map(|(name, value)| HeaderPair { name: name.clone(), value: value.clone() })
            .collect(),
        body: response.text(),
        body_bytes: response.body.len(),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_support::interceptor;
    use crate::tools::result_json;
    use appshell_core::Response;

    #[tokio::test]
    async fn test_fetch_shell_from_cache() {
        let interceptor = interceptor(&[("http://localhost:8080/", Response::new(200).with_body("<html>"))]).await;
        interceptor.start().await;

        let result = fetch_impl(&interceptor, ShellFetchParams { url: "/".into() }).await.unwrap();
        let output = result_json(&result);

        assert_eq!(output["class"], "shell_asset");
        assert_eq!(output["source"], "cache");
        assert_eq!(output["body"], "<html>");
        assert_eq!(output["url"], "http://localhost:8080/");
    }

    #[tokio::test]
    async fn test_fetch_vendor_stylesheet_offline() {
        let interceptor = interceptor(&[]).await;

        let result = fetch_impl(&interceptor, ShellFetchParams { url: "https://cdn.tailwindcss.com/3.4.1".into() })
            .await
            .unwrap();
        let output = result_json(&result);

        assert_eq!(output["source"], "fallback");
        assert_eq!(output["status"], 200);
        assert_eq!(output["content_type"], "text/css");
    }

    #[tokio::test]
    async fn test_fetch_unavailable_external() {
        let interceptor = interceptor(&[]).await;

        let result = fetch_impl(&interceptor, ShellFetchParams { url: "https://fonts.example.net/a.woff2".into() })
            .await
            .unwrap();
        let output = result_json(&result);

        assert_eq!(output["class"], "external_resource");
        assert_eq!(output["status"], 503);
        assert_eq!(output["body"], "Resource not available offline");
    }

    #[tokio::test]
    async fn test_fetch_rejects_blank_url() {
        let interceptor = interceptor(&[]).await;
        let err = fetch_impl(&interceptor, ShellFetchParams { url: "  ".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_scheme() {
        let interceptor = interceptor(&[]).await;
        let result = fetch_impl(&interceptor, ShellFetchParams { url: "ftp://example.com/file".into() }).await;
        assert!(result.is_err());
    }
}
