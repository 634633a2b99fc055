//! Shell store manager.
//!
//! Owns one generation of the store: installs the shell manifest into it,
//! purges every other generation on activation, and serves get/put for the
//! strategy engine.

use std::fmt;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use url::Url;

use super::connection::CacheDb;
use super::entries::CachedEntry;
use crate::Error;
use crate::http::{Network, Request, Response};

/// Name of one store generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheVersion(String);

impl CacheVersion {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of shell resources cached at install time.
#[derive(Debug, Clone, Default)]
pub struct ShellManifest {
    entries: Vec<Request>,
}

impl ShellManifest {
    /// Resolve manifest entries (absolute URLs or paths) against the app origin.
    pub fn resolve<S: AsRef<str>>(entries: &[S], base: &Url) -> Result<Self, Error> {
        let entries = entries
            .iter()
            .map(|entry| Request::parse(entry.as_ref(), Some(base)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A manifest entry that could not be cached during install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FailedEntry {
    pub url: String,
    pub reason: String,
}

/// Outcome of an install pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InstallReport {
    /// URLs now present in the store, in manifest order.
    pub cached: Vec<String>,
    /// URLs that were skipped, in manifest order.
    pub failed: Vec<FailedEntry>,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Store manager for the current generation.
#[derive(Clone, Debug)]
pub struct ShellStore {
    db: CacheDb,
    version: CacheVersion,
    vendor_marker: String,
}

impl ShellStore {
    /// `vendor_marker` enables the substring fallback in [`ShellStore::get`].
    pub fn new(db: CacheDb, version: CacheVersion, vendor_marker: impl Into<String>) -> Self {
        Self { db, version, vendor_marker: vendor_marker.into() }
    }

    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Create the current generation if needed.
    pub async fn open(&self) -> Result<(), Error> {
        self.db.open_version(self.version.as_str()).await
    }

    /// Best-effort caching of every manifest entry.
    ///
    /// Entries are fetched concurrently and stored independently. A network
    /// failure, a non-success status, or a failed write skips that entry only.
    /// Never fails: a store that cannot be opened marks every entry failed.
    pub async fn install(&self, manifest: &ShellManifest, network: &dyn Network) -> InstallReport {
        tracing::info!(version = %self.version, entries = manifest.len(), "caching shell manifest");

        if let Err(e) = self.open().await {
            tracing::error!(version = %self.version, error = %e, "failed to open store; nothing cached");
            return InstallReport {
                cached: Vec::new(),
                failed: manifest
                    .iter()
                    .map(|r| FailedEntry { url: r.key().to_string(), reason: e.to_string() })
                    .collect(),
            };
        }

        let outcomes = join_all(manifest.iter().map(|request| self.install_entry(request, network))).await;

        let mut report = InstallReport::default();
        for (request, outcome) in manifest.iter().zip(outcomes) {
            match outcome {
                Ok(()) => {
                    tracing::debug!(url = %request, "cached shell entry");
                    report.cached.push(request.key().to_string());
                }
                Err(reason) => {
                    tracing::warn!(url = %request, %reason, "failed to cache shell entry");
                    report.failed.push(FailedEntry { url: request.key().to_string(), reason });
                }
            }
        }

        tracing::info!(cached = report.cached.len(), failed = report.failed.len(), "shell manifest cached");
        report
    }

    async fn install_entry(&self, request: &Request, network: &dyn Network) -> Result<(), String> {
        let response = network.fetch(request).await.map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(format!("status {}", response.status));
        }
        self.put(request, &response).await.map_err(|e| e.to_string())
    }

    /// Delete every generation other than the current one.
    ///
    /// Returns the deleted names. Safe to call repeatedly.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.db.version_names().await? {
            if name == self.version.as_str() {
                continue;
            }
            if self.db.delete_version(&name).await? {
                tracing::info!(version = %name, "deleted stale store generation");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Look up a request in the current generation.
    ///
    /// Exact URL match first. For stylesheet-vendor URLs, whose query or
    /// path drifts between deploys, falls back to the first stored key that
    /// contains the vendor marker. That fallback can return an unrelated entry
    /// which merely contains the marker.
    pub async fn get(&self, request: &Request) -> Result<Option<CachedEntry>, Error> {
        let version = self.version.as_str();
        if let Some(entry) = self.db.get_entry(version, request.key()).await? {
            return Ok(Some(entry));
        }

        if self.vendor_marker.is_empty() || !request.key().contains(&self.vendor_marker) {
            return Ok(None);
        }

        let urls = self.db.entry_urls(version).await?;
        match urls.iter().find(|url| url.contains(&self.vendor_marker)) {
            Some(url) => {
                tracing::debug!(requested = %request, stored = %url, "vendor stylesheet matched by marker");
                self.db.get_entry(version, url).await
            }
            None => Ok(None),
        }
    }

    /// Store a successful response for a request, replacing any prior snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for non-2xx responses.
    pub async fn put(&self, request: &Request, response: &Response) -> Result<(), Error> {
        if !response.is_success() {
            return Err(Error::InvalidInput(format!("refusing to store status {} for {request}", response.status)));
        }
        self.db.put_entry(self.version.as_str(), request.key(), response).await
    }

    /// URLs stored in the current generation.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        self.db.entry_urls(self.version.as_str()).await
    }

    /// All stored generation names.
    pub async fn versions(&self) -> Result<Vec<String>, Error> {
        self.db.version_names().await
    }
}
