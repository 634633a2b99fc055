//! Client code for appshell.
//!
//! This crate provides the HTTP transport, the per-class caching strategies
//! and the drink search helper shared by the server.

pub mod fetch;
pub mod search;
pub mod strategy;

pub use fetch::{FetchClient, FetchConfig};
pub use search::{SearchEndpoint, SearchOutcome, read_search_response};
pub use strategy::{
    Fallbacks, Handled, OFFLINE_CSS_HEADER, OFFLINE_RESPONSE_HEADER, Source, StrategyEngine, is_offline_payload,
};
