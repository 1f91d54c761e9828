//! Configuration management
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `AUDIT_TRAIL__*` environment variables (`__` separates sections, e.g.
//! `AUDIT_TRAIL__DATABASE__URL`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "AUDIT_TRAIL_CONFIG";

/// File read when `AUDIT_TRAIL_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/audit-trail.toml";

const ENV_PREFIX: &str = "AUDIT_TRAIL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub audit: AuditConfig,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Which repositories back the audit service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub backend: StorageBackend,
    /// Page size used when a request does not give one
    pub default_page_size: u32,
    /// Upper bound on requested page sizes
    pub max_page_size: u32,
    /// Audit items older than this are deleted by the retention task
    pub retention_minutes: Option<i64>,
    pub cleanup_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            audit: AuditConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://postgres@localhost/audit_trail".to_string(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 5,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: if cfg!(feature = "postgres") {
                StorageBackend::Postgres
            } else {
                StorageBackend::Memory
            },
            default_page_size: 100,
            max_page_size: 1000,
            retention_minutes: None,
            cleanup_interval_secs: 3600,
        }
    }
}

impl AuditConfig {
    /// Page size to use for a request, clamped to `max_page_size`
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }

    /// Retention age; `None` when disabled or out of range
    pub fn retention(&self) -> Option<chrono::Duration> {
        self.retention_minutes
            .filter(|minutes| *minutes > 0)
            .and_then(chrono::Duration::try_minutes)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if let Some(minutes) = self.retention_minutes {
            if minutes > 0 && self.retention().is_none() {
                return Err(config::ConfigError::Message(format!(
                    "audit.retention_minutes {} is out of range",
                    minutes
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load from the file named by `AUDIT_TRAIL_CONFIG` (or the default path)
    /// and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from `path` (missing file is fine) and the environment
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Config>()
            .and_then(Config::validated)
    }

    /// Parse a TOML document layered over the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Config>()
            .and_then(Config::validated)
    }

    fn validated(self) -> Result<Self, config::ConfigError> {
        self.audit.validate()?;
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
