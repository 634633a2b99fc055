//! Resource classification.
//!
//! Maps a request URL onto the caching policy that handles it. Rules are
//! evaluated in order and the first match wins:
//!
//! 1. exact root application path -> shell
//! 2. shell asset directory prefix -> shell
//! 3. stylesheet framework (CDN host, vendor substring, `cdn.*` css) -> shell
//! 4. upstream API origin -> dynamic API
//! 5. everything else -> external
//!
//! Path rules look at the path only, whatever the host.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::{Origin, Url};

use crate::config::{AppConfig, ConfigError};

/// The caching policy class of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    /// Static shell resource: served from the store, populated on miss.
    ShellAsset,
    /// Upstream search API: network only.
    DynamicApi,
    /// Anything else: network first, store as fallback.
    ExternalResource,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceClass::ShellAsset => "shell_asset",
            ResourceClass::DynamicApi => "dynamic_api",
            ResourceClass::ExternalResource => "external_resource",
        };
        f.write_str(name)
    }
}

/// Classification rules, fixed at construction.
#[derive(Debug, Clone)]
pub struct Classifier {
    shell_paths: Vec<String>,
    asset_prefix: String,
    vendor_host: String,
    vendor_marker: String,
    cdn_css_heuristic: bool,
    api_origin: Origin,
}

impl Classifier {
    /// Build the rule set from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `api_origin` does not parse or the
    /// vendor host or marker is blank.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        config.validate_vendor()?;
        Ok(Self {
            shell_paths: config.shell_paths.clone(),
            asset_prefix: config.asset_prefix.clone(),
            vendor_host: config.vendor_host.to_lowercase(),
            vendor_marker: config.vendor_marker.clone(),
            cdn_css_heuristic: config.cdn_css_heuristic,
            api_origin: config.api_origin_url()?.origin(),
        })
    }

    /// Classify a URL. Total and deterministic.
    pub fn classify(&self, url: &Url) -> ResourceClass {
        let path = url.path();

        if self.shell_paths.iter().any(|p| p == path) {
            tracing::trace!(%url, "root shell path");
            return ResourceClass::ShellAsset;
        }

        if path.starts_with(&self.asset_prefix) {
            tracing::trace!(%url, "shell asset directory");
            return ResourceClass::ShellAsset;
        }

        if self.is_stylesheet_vendor(url) {
            tracing::trace!(%url, "stylesheet framework");
            return ResourceClass::ShellAsset;
        }

        if url.origin() == self.api_origin {
            return ResourceClass::DynamicApi;
        }

        ResourceClass::ExternalResource
    }

    /// Whether the URL points at the stylesheet framework.
    ///
    /// Substring matching is deliberately loose so CDN URL variations still
    /// match; unrelated URLs that happen to contain the marker match too.
    pub fn is_stylesheet_vendor(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if host == self.vendor_host || url.as_str().contains(&self.vendor_marker) {
            return true;
        }

        self.cdn_css_heuristic
            && host.contains("cdn.")
            && (url.as_str().contains("tailwind") || url.as_str().contains("css"))
    }

    /// Whether a failed fetch of this URL should get the degraded stylesheet.
    pub fn wants_stylesheet_fallback(&self, url: &Url) -> bool {
        url.as_str().contains(&self.vendor_marker)
    }
}
