//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FETCHWORK_*)
//! 2. TOML config file (if FETCHWORK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Router configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FETCHWORK_*)
/// 2. TOML config file (if FETCHWORK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name of the current cache generation.
    ///
    /// Bump this to retire every previously stored snapshot on the next
    /// activation. Set via FETCHWORK_CACHE_GENERATION.
    #[serde(default = "default_cache_generation")]
    pub cache_generation: String,

    /// Path prefix that marks a request as an API call.
    ///
    /// Set via FETCHWORK_API_PREFIX environment variable.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Base URL that relative pre-cache paths resolve against.
    ///
    /// Set via FETCHWORK_ORIGIN environment variable. Only required when
    /// `precache_urls` contains origin-relative entries.
    #[serde(default)]
    pub origin: Option<String>,

    /// URLs fetched and stored during install. Entries may be absolute
    /// or relative to `origin`.
    ///
    /// Set via FETCHWORK_PRECACHE_URLS environment variable (comma-separated).
    #[serde(default)]
    pub precache_urls: Vec<String>,

    /// Path to the SQLite cache database, for hosts using the persistent
    /// store.
    ///
    /// Set via FETCHWORK_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via FETCHWORK_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via FETCHWORK_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via FETCHWORK_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_cache_generation() -> String {
    "fetchwork-v1".into()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./fetchwork-cache.sqlite")
}

fn default_user_agent() -> String {
    "fetchwork/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_generation: default_cache_generation(),
            api_prefix: default_api_prefix(),
            origin: None,
            precache_urls: Vec::new(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `FETCHWORK_`
    /// 2. TOML file from `FETCHWORK_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("FETCHWORK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("FETCHWORK_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Resolve `precache_urls` into absolute URLs.
    ///
    /// Absolute entries pass through; relative entries are joined against
    /// `origin`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if a relative entry appears without
    /// `origin`, or `ConfigError::Invalid` if an entry or the origin does
    /// not parse.
    pub fn precache_targets(&self) -> Result<Vec<Url>, ConfigError> {
        let base = self
            .origin
            .as_deref()
            .map(|origin| {
                Url::parse(origin)
                    .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
            })
            .transpose()?;

        let mut targets = Vec::with_capacity(self.precache_urls.len());
        for raw in &self.precache_urls {
            let url = match Url::parse(raw) {
                Ok(url) => url,
                Err(url::ParseError::RelativeUrlWithoutBase) => match &base {
                    Some(base) => base.join(raw).map_err(|e| ConfigError::Invalid {
                        field: "precache_urls".into(),
                        reason: format!("{raw}: {e}"),
                    })?,
                    None => {
                        return Err(ConfigError::Missing {
                            field: "origin".into(),
                            hint: "Set FETCHWORK_ORIGIN to resolve relative pre-cache paths".into(),
                        });
                    }
                },
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        field: "precache_urls".into(),
                        reason: format!("{raw}: {e}"),
                    });
                }
            };
            targets.push(url);
        }

        Ok(targets)
    }
}
