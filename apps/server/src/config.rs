//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     STOCKROOM_PORT=4000  (or PORT)                                      │
//! │     STOCKROOM_DB_PATH=/var/lib/stockroom/stockroom.db                   │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/stockroom/stockroom.toml (Linux)                          │
//! │     ~/Library/Application Support/com.stockroom.stockroom/... (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     0.0.0.0:3000, ./stockroom.db, 10 connections                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # stockroom.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 3000
//! cors_origin = "http://localhost:5173"
//! body_limit_bytes = 20971520
//!
//! [database]
//! path = "./stockroom.db"
//! max_connections = 10
//! acquire_timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use stockroom_db::DbConfig;

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// HTTP Settings
// =============================================================================

/// HTTP listener and middleware settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Single allowed CORS origin. `None` allows any origin.
    #[serde(default)]
    pub cors_origin: Option<String>,

    /// Maximum accepted request body size.
    /// Default: 20 MiB
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_body_limit() -> usize {
    20 * 1024 * 1024
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
            cors_origin: None,
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path. Created on first start.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Pool size. Requests beyond it queue for a connection.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a request waits for a pooled connection before 503.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./stockroom.db")
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,
}

impl ServerConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Arguments
    /// * `config_path` - Explicit TOML file. Falls back to the platform
    ///   config dir when `None`; a missing file means defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading server config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be non-zero"));
        }

        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::invalid(
                "server.body_limit_bytes",
                "must be non-zero",
            ));
        }

        if let Some(ref origin) = self.server.cors_origin {
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::invalid(
                    "server.cors_origin",
                    format!("must start with http:// or https://, got: {}", origin),
                ));
            }
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections",
                "must be at least 1",
            ));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("database.path", "must not be empty"));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // STOCKROOM_PORT wins over the generic PORT
        for var in ["PORT", "STOCKROOM_PORT"] {
            if let Ok(port) = std::env::var(var) {
                match port.parse::<u16>() {
                    Ok(p) => {
                        debug!(port = p, var = var, "Overriding port from environment");
                        self.server.port = p;
                    }
                    Err(_) => warn!(var = var, value = %port, "Ignoring invalid port"),
                }
            }
        }

        if let Ok(addr) = std::env::var("STOCKROOM_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Ok(path) = std::env::var("STOCKROOM_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("STOCKROOM_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(m) => self.database.max_connections = m,
                Err(_) => warn!(value = %max, "Ignoring invalid STOCKROOM_MAX_CONNECTIONS"),
            }
        }

        if let Ok(origin) = std::env::var("STOCKROOM_CORS_ORIGIN") {
            self.server.cors_origin = Some(origin).filter(|o| !o.is_empty());
        }

        if let Ok(limit) = std::env::var("STOCKROOM_BODY_LIMIT_BYTES") {
            match limit.parse::<usize>() {
                Ok(l) => self.server.body_limit_bytes = l,
                Err(_) => warn!(value = %limit, "Ignoring invalid STOCKROOM_BODY_LIMIT_BYTES"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockroom", "stockroom")
            .map(|dirs| dirs.config_dir().join("stockroom.toml"))
    }

    /// Builds the pool configuration for [`stockroom_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .connect_timeout(Duration::from_secs(self.database.acquire_timeout_secs))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
