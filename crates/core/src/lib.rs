//! Core types and shared functionality for appshell.
//!
//! This crate provides:
//! - Request/response model and the `Network` seam
//! - Resource classification
//! - Versioned cache storage with SQLite backend and the shell store manager
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod classify;
pub mod config;
pub mod drinks;
pub mod error;
pub mod http;

pub use cache::{CacheDb, CacheVersion, CachedEntry, InstallReport, ShellManifest, ShellStore};
pub use classify::{Classifier, ResourceClass};
pub use config::{AppConfig, ConfigError};
pub use drinks::{Drink, SearchResponse};
pub use error::Error;
pub use http::{Network, Request, Response};
