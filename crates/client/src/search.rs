//! Drink search over the upstream API contract.
//!
//! Builds the search request for a query and interprets whatever the engine
//! answered, including the synthetic offline payload.

use appshell_core::{AppConfig, ConfigError, Drink, Error, Request, Response, SearchResponse};
use url::Url;

use crate::strategy::is_offline_payload;

/// Builds search requests against the configured API.
#[derive(Debug, Clone)]
pub struct SearchEndpoint {
    base: Url,
}

impl SearchEndpoint {
    pub fn new(api_origin: &Url, search_path: &str) -> Result<Self, Error> {
        let base = api_origin.join(search_path).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { base })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the API origin or path is unusable.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Self::new(&config.api_origin_url()?, &config.search_path)
            .map_err(|e| ConfigError::Invalid { field: "search_path".into(), reason: e.to_string() })
    }

    /// Request for `?s=<query>`. The query is trimmed and percent-encoded.
    pub fn request(&self, query: &str) -> Result<Request, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("query cannot be empty".into()));
        }

        let mut url = self.base.clone();
        url.query_pairs_mut().clear().append_pair("s", query);
        Ok(Request::new(url))
    }
}

/// Interpreted search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Matches in API order; empty when nothing matched.
    pub drinks: Vec<Drink>,
    /// The engine answered with the synthetic offline payload.
    pub offline: bool,
}

/// Interpret the response to a search request.
///
/// # Errors
///
/// Returns `Error::HttpError` for non-2xx statuses or bodies that do not
/// follow the `drinks` contract.
pub fn read_search_response(response: &Response) -> Result<SearchOutcome, Error> {
    if !response.is_success() {
        return Err(Error::HttpError(format!("search API returned status {}", response.status)));
    }

    let parsed: SearchResponse = serde_json::from_slice(&response.body)
        .map_err(|e| Error::HttpError(format!("malformed search response: {e}")))?;

    Ok(SearchOutcome { drinks: parsed.into_drinks(), offline: is_offline_payload(response) })
}
