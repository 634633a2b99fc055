//! drink_search tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use appshell_core::Drink;

use super::json_result;
use crate::lifecycle::Interceptor;

/// Parameters for the drink_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrinkSearchParams {
    /// Drink name to search for.
    pub query: String,
}

/// Output from the drink_search tool.
#[derive(Debug, Clone, Serialize)]
pub struct DrinkSearchOutput {
    pub query: String,
    pub count: usize,
    /// True when the interceptor answered with its offline placeholder.
    pub offline: bool,
    pub drinks: Vec<Drink>,
}

pub async fn search_impl(interceptor: &Interceptor, params: DrinkSearchParams) -> Result<CallToolResult, McpError> {
    let outcome = interceptor.search(&params.query).await?;

    let output = DrinkSearchOutput {
        query: params.query.trim().to_string(),
        count: outcome.drinks.len(),
        offline: outcome.offline,
        drinks: outcome.drinks,
    };

    json_result(&output)
}
