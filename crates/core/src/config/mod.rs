//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (APPSHELL_*)
//! 2. TOML config file (if APPSHELL_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! Everything here is fixed once loaded: the current cache version and the
//! shell manifest never change while the process runs.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (APPSHELL_*)
/// 2. TOML config file (if APPSHELL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via APPSHELL_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Name of the current store generation.
    ///
    /// Bump on every deploy; activation deletes every other generation.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Origin the application shell is served from. Manifest paths resolve against it.
    #[serde(default = "default_app_origin")]
    pub app_origin: String,

    /// Origin of the upstream search API (network-only traffic).
    #[serde(default = "default_api_origin")]
    pub api_origin: String,

    /// Path of the search endpoint on `api_origin`.
    #[serde(default = "default_search_path")]
    pub search_path: String,

    /// Exact root paths that belong to the shell.
    #[serde(default = "default_shell_paths")]
    pub shell_paths: Vec<String>,

    /// Directory prefix of local shell assets.
    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,

    /// Host of the stylesheet framework CDN.
    #[serde(default = "default_vendor_host")]
    pub vendor_host: String,

    /// Substring identifying the stylesheet framework in any URL.
    #[serde(default = "default_vendor_marker")]
    pub vendor_marker: String,

    /// Treat `cdn.*` hosts serving tailwind/css URLs as shell assets.
    #[serde(default = "default_true")]
    pub cdn_css_heuristic: bool,

    /// Resources cached at install time, in order.
    ///
    /// Set via the TOML file or APPSHELL_SHELL_MANIFEST as an array (`["/", "/index.html"]`).
    #[serde(default = "default_shell_manifest")]
    pub shell_manifest: Vec<String>,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Transport timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Label of the placeholder drink served when the search API is unreachable.
    #[serde(default = "default_offline_label")]
    pub offline_label: String,

    /// Thumbnail path of the placeholder drink.
    #[serde(default = "default_offline_thumb")]
    pub offline_thumb: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./appshell-cache.sqlite")
}

fn default_cache_version() -> String {
    "cocktail-finder-v3-appshell".into()
}

fn default_app_origin() -> String {
    "http://localhost:8080".into()
}

fn default_api_origin() -> String {
    "https://www.thecocktaildb.com".into()
}

fn default_search_path() -> String {
    "/api/json/v1/1/search.php".into()
}

fn default_shell_paths() -> Vec<String> {
    vec!["/".into(), "/index.html".into(), "/main.js".into(), "/sw.js".into()]
}

fn default_asset_prefix() -> String {
    "/assets/".into()
}

fn default_vendor_host() -> String {
    "cdn.tailwindcss.com".into()
}

fn default_vendor_marker() -> String {
    "tailwindcss.com".into()
}

fn default_shell_manifest() -> Vec<String> {
    vec![
        "/".into(),
        "/index.html".into(),
        "/main.js".into(),
        "/sw.js".into(),
        "/assets/manifest.json".into(),
        "/assets/placeholder.jpg".into(),
        "https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4".into(),
    ]
}

fn default_user_agent() -> String {
    "appshell/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_offline_label() -> String {
    "Special Cocktail (Offline)".into()
}

fn default_offline_thumb() -> String {
    "/assets/placeholder.jpg".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_version: default_cache_version(),
            app_origin: default_app_origin(),
            api_origin: default_api_origin(),
            search_path: default_search_path(),
            shell_paths: default_shell_paths(),
            asset_prefix: default_asset_prefix(),
            vendor_host: default_vendor_host(),
            vendor_marker: default_vendor_marker(),
            cdn_css_heuristic: true,
            shell_manifest: default_shell_manifest(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            offline_label: default_offline_label(),
            offline_thumb: default_offline_thumb(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed application origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `app_origin` is not an absolute URL.
    pub fn app_origin_url(&self) -> Result<url::Url, ConfigError> {
        parse_origin("app_origin", &self.app_origin)
    }

    /// Parsed API origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `api_origin` is not an absolute URL.
    pub fn api_origin_url(&self) -> Result<url::Url, ConfigError> {
        parse_origin("api_origin", &self.api_origin)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `APPSHELL_`
    /// 2. TOML file from `APPSHELL_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("APPSHELL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("APPSHELL_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

fn parse_origin(field: &str, value: &str) -> Result<url::Url, ConfigError> {
    let url = url::Url::parse(value)
        .map_err(|e| ConfigError::Invalid { field: field.into(), reason: e.to_string() })?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must be an absolute http(s) origin".into() });
    }
    Ok(url)
}
