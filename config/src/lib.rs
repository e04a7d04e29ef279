//! # Configuration Management for repocache
//!
//! This crate provides the centralized configuration structures for the cacheable
//! repository layer: whether caching is on, which methods may be cached, how long
//! entries live, which cache store backs them and when writes clean them.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{AllowedMethods, CacheConfig};
//!
//! let cache_config = CacheConfig::default()
//!     .with_minutes(10)
//!     .with_allowed(AllowedMethods::only(["find", "all"]));
//! assert!(cache_config.enabled);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [cache]
//! enabled = true
//! minutes = 30
//! repository = "cache"
//!
//! [cache.clean]
//! enabled = true
//!
//! [cache.clean.on]
//! create = true
//! update = true
//! delete = true
//!
//! [cache.params]
//! skip_cache = "skipCache"
//!
//! [cache.allowed]
//! only = ["find", "all"]
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from repocache.toml (or the path in REPOCACHE_CONFIG)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./repocache.toml";
const CONFIG_PATH_ENV: &str = "REPOCACHE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Repository cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Global switch for the cacheable repository layer
    pub enabled: bool,
    /// Default lifetime of cached results, in minutes
    pub minutes: u64,
    /// Cache store selector ("cache", "memory" or "redis")
    pub repository: String,
    /// Redis connection string, required when `repository = "redis"`
    pub redis_url: Option<String>,
    /// Namespace prepended to keys by stores that share a keyspace
    pub key_prefix: String,
    /// Maximum number of entries kept by the in-memory store
    pub memory_capacity: u64,
    /// Where the file-backed key registry persists its index; in-memory when absent
    pub key_registry_path: Option<String>,
    pub clean: CleanConfig,
    pub params: ParamsConfig,
    pub allowed: AllowedMethods,
}

/// Which write actions flush a repository's cached results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    pub enabled: bool,
    pub on: CleanOn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOn {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

/// Names of request parameters the cache layer reacts to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    pub skip_cache: String,
}

/// Allow-list / deny-list of cacheable method names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowedMethods {
    pub only: Option<BTreeSet<String>>,
    pub except: Option<BTreeSet<String>>,
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = {
            // A missing .env file is fine, a malformed one is not
            match dotenvy::dotenv() {
                Ok(_) => {}
                Err(e) if e.not_found() => {}
                Err(e) => return Err(e.into()),
            }

            if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
                Self::from_file(&config_path)
            } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
                Self::from_file(DEFAULT_CONFIG_PATH)
            } else {
                Err(ConfigError::Invalid(format!(
                    "Config path must be specified in .env file as {} or in {} file",
                    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH
                )))
            }
        }?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            minutes: 30,
            repository: "cache".to_string(),
            redis_url: None,
            key_prefix: "repocache".to_string(),
            memory_capacity: 10_000,
            key_registry_path: None,
            clean: CleanConfig::default(),
            params: ParamsConfig::default(),
            allowed: AllowedMethods::default(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration backed by the given store selector
    pub fn new(repository: &str, minutes: u64) -> Self {
        Self {
            repository: repository.to_string(),
            minutes,
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_minutes(mut self, minutes: u64) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn with_redis_url(mut self, redis_url: &str) -> Self {
        self.redis_url = Some(redis_url.to_string());
        self
    }

    pub fn with_allowed(mut self, allowed: AllowedMethods) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn with_key_registry_path(mut self, path: &str) -> Self {
        self.key_registry_path = Some(path.to_string());
        self
    }

    /// Validate cache values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minutes == 0 {
            return Err(ConfigError::Invalid(
                "Cache minutes must be greater than 0".to_string(),
            ));
        }
        if self.repository.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Cache repository selector cannot be empty".to_string(),
            ));
        }
        if self.params.skip_cache.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Cache skip parameter name cannot be empty".to_string(),
            ));
        }
        if self.repository == "redis" && self.redis_url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::Invalid(
                "Redis URL is required when cache repository is \"redis\"".to_string(),
            ));
        }
        if self.memory_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Cache memory_capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            on: CleanOn::default(),
        }
    }
}

impl Default for CleanOn {
    fn default() -> Self {
        Self {
            create: true,
            update: true,
            delete: true,
        }
    }
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            skip_cache: "skipCache".to_string(),
        }
    }
}

impl AllowedMethods {
    /// Cache only the listed methods
    pub fn only<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: Some(methods.into_iter().map(Into::into).collect()),
            except: None,
        }
    }

    /// Cache every method except the listed ones
    pub fn except<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: None,
            except: Some(methods.into_iter().map(Into::into).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.minutes, 30);
        assert_eq!(config.repository, "cache");
        assert_eq!(config.params.skip_cache, "skipCache");
        assert!(config.allowed.only.is_none());
        assert!(config.allowed.except.is_none());
        assert!(config.clean.enabled && config.clean.on.create && config.clean.on.delete);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.cache.minutes, 30);
        assert_eq!(config.cache.repository, "cache");
    }

    #[test]
    fn test_parse_full_document() {
        let config = AppConfig::from_toml_str(
            r#"
            [cache]
            enabled = false
            minutes = 5
            repository = "memory"

            [cache.clean.on]
            update = false

            [cache.params]
            skip_cache = "fresh"

            [cache.allowed]
            except = ["paginate"]
            "#,
        )
        .unwrap();

        assert!(!config.cache.enabled);
        assert_eq!(config.cache.minutes, 5);
        assert_eq!(config.cache.repository, "memory");
        assert!(config.cache.clean.on.create);
        assert!(!config.cache.clean.on.update);
        assert_eq!(config.cache.params.skip_cache, "fresh");
        assert_eq!(config.cache.allowed, AllowedMethods::except(["paginate"]));
    }

    #[test]
    fn test_zero_minutes_rejected() {
        let err = AppConfig::from_toml_str("[cache]\nminutes = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_redis_requires_url() {
        let config = CacheConfig::new("redis", 30);
        assert!(config.validate().is_err());

        let config = config.with_redis_url("redis://localhost:6379");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_skip_param_rejected() {
        let mut config = CacheConfig::default();
        config.params.skip_cache = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repocache.toml");
        std::fs::write(&path, "[cache]\nminutes = 12\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.cache.minutes, 12);
    }
}
