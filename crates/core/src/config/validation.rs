//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use crate::http::canonicalize;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_version` or `user_agent` is empty
    /// - `app_origin` or `api_origin` is not an absolute origin
    /// - `asset_prefix` or `search_path` does not start with `/`
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - a manifest entry does not resolve against `app_origin`
    /// - `vendor_host` or `vendor_marker` is blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_version.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_version".into(), reason: "must not be empty".into() });
        }

        let app_origin = self.app_origin_url()?;
        self.api_origin_url()?;

        if !self.asset_prefix.starts_with('/') {
            return Err(ConfigError::Invalid { field: "asset_prefix".into(), reason: "must start with '/'".into() });
        }
        if !self.search_path.starts_with('/') {
            return Err(ConfigError::Invalid { field: "search_path".into(), reason: "must start with '/'".into() });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        for entry in &self.shell_manifest {
            canonicalize(entry, Some(&app_origin)).map_err(|e| ConfigError::Invalid {
                field: "shell_manifest".into(),
                reason: format!("{entry}: {e}"),
            })?;
        }

        self.validate_vendor()
    }

    /// An empty vendor host or marker would match every URL.
    pub(crate) fn validate_vendor(&self) -> Result<(), ConfigError> {
        if self.vendor_host.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "vendor_host".into(), reason: "must not be empty".into() });
        }
        if self.vendor_marker.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "vendor_marker".into(), reason: "must not be empty".into() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_cache_version() {
        let config = AppConfig { cache_version: "  ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_version"));
    }

    #[test]
    fn test_validate_bad_api_origin() {
        let config = AppConfig { api_origin: "thecocktaildb".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "api_origin"));
    }

    #[test]
    fn test_validate_asset_prefix_without_slash() {
        let config = AppConfig { asset_prefix: "assets/".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "asset_prefix"));
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() }; // 5min 1sec
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_unresolvable_manifest_entry() {
        let config = AppConfig { shell_manifest: vec!["ftp://files.example.com/a".into()], ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "shell_manifest"));
    }

    #[test]
    fn test_validate_blank_vendor_marker() {
        for marker in ["", "   "] {
            let config = AppConfig { vendor_marker: marker.into(), ..Default::default() };
            let result = config.validate();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "vendor_marker"));
        }
    }

    #[test]
    fn test_validate_empty_vendor_host() {
        let config = AppConfig { vendor_host: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "vendor_host"));
    }

    #[test]
    fn test_validate_empty_manifest_is_allowed() {
        let config = AppConfig { shell_manifest: Vec::new(), ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
