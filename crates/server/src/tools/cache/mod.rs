//! Cache-related MCP tools.
//!
//! Read-only views over the active cache generation.

pub mod get;

pub use get::{CacheGetParams, get_impl};
