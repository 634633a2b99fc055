//! SQLite-backed, versioned response store.
//!
//! This module provides the persistent store behind the shell layer using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named generations, purged wholesale on activation
//! - Response snapshots keyed by request URL (SHA-256 keyed rows)
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod store;
pub mod versions;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedEntry;
pub use store::{CacheVersion, FailedEntry, InstallReport, ShellManifest, ShellStore};
