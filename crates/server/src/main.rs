//! appshell server entry point.
//!
//! Loads configuration, installs and activates the app shell, then serves the
//! interceptor's tools on stdio. Logging goes to stderr to keep stdout free for
//! JSON-RPC.

use std::sync::Arc;

use anyhow::Result;
use appshell_client::{FetchClient, FetchConfig};
use appshell_core::{AppConfig, CacheDb, Network};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod lifecycle;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        version = %config.cache_version,
        db = %config.db_path.display(),
        origin = %config.app_origin,
        "Starting appshell server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let interceptor = Arc::new(lifecycle::Interceptor::from_config(&config, db, network)?);

    let report = interceptor.start().await;
    if !report.is_complete() {
        tracing::warn!(failed = report.failed.len(), "shell installed with missing entries");
    }

    let handler = handler::AppShellServer::new(interceptor);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
