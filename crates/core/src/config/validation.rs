//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_generation` is empty
    /// - `api_prefix` is empty or does not start with `/`
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - a pre-cache entry cannot be resolved to an absolute URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_generation.is_empty() {
            return Err(ConfigError::Invalid {
                field: "cache_generation".into(),
                reason: "must not be empty".into(),
            });
        }

        if self.api_prefix.is_empty() {
            return Err(ConfigError::Invalid { field: "api_prefix".into(), reason: "must not be empty".into() });
        }
        if !self.api_prefix.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "api_prefix".into(),
                reason: "must start with '/'".into(),
            });
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

        self.precache_targets()?;

        if !self.api_prefix.ends_with('/') {
            tracing::warn!(
                api_prefix = %self.api_prefix,
                "api_prefix has no trailing slash; it will also match longer path segments"
            );
        }

        Ok(())
    }
}
