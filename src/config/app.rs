//! Main application configuration
//!
//! This module defines the primary configuration structures for the spotlight
//! service, including environment variable and TOML file loading plus
//! validation.

use crate::error::SpotlightError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub database: DatabaseSettings,
    pub leaderboard: LeaderboardSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite database file
    pub path: PathBuf,
    /// How long a single read may wait on a locked database
    pub connection_timeout_seconds: u64,
    /// Storage quota the database size is reported against
    pub storage_quota_mb: f64,
}

/// Leaderboard presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardSettings {
    /// Entries shown per page
    pub per_page: usize,
    /// Maximum number of users pulled into one ordering
    pub fetch_limit: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "player-spotlight".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("spotlight.db"),
            connection_timeout_seconds: 10,
            storage_quota_mb: 500.0,
        }
    }
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            per_page: 5,
            fetch_limit: 100,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still win
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Database settings
        if let Ok(path) = env::var("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(timeout) = env::var("DATABASE_TIMEOUT_SECONDS") {
            self.database.connection_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid DATABASE_TIMEOUT_SECONDS value: {}", timeout))?;
        }
        if let Ok(quota) = env::var("STORAGE_QUOTA_MB") {
            self.database.storage_quota_mb = quota
                .parse()
                .map_err(|_| anyhow!("Invalid STORAGE_QUOTA_MB value: {}", quota))?;
        }

        // Leaderboard settings
        if let Ok(per_page) = env::var("LEADERBOARD_PER_PAGE") {
            self.leaderboard.per_page = per_page
                .parse()
                .map_err(|_| anyhow!("Invalid LEADERBOARD_PER_PAGE value: {}", per_page))?;
        }
        if let Ok(limit) = env::var("LEADERBOARD_FETCH_LIMIT") {
            self.leaderboard.fetch_limit = limit
                .parse()
                .map_err(|_| anyhow!("Invalid LEADERBOARD_FETCH_LIMIT value: {}", limit))?;
        }

        Ok(())
    }

    /// Get the database busy timeout as Duration
    pub fn database_timeout(&self) -> Duration {
        Duration::from_secs(self.database.connection_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => {
            return Err(invalid(format!(
                "Invalid log level: {}",
                config.service.log_level
            )))
        }
    }

    if config.database.path.as_os_str().is_empty() {
        return Err(invalid("Database path cannot be empty"));
    }
    if config.database.connection_timeout_seconds == 0 {
        return Err(invalid("Database timeout must be greater than 0"));
    }
    if config.database.storage_quota_mb <= 0.0 {
        return Err(invalid("Storage quota must be positive"));
    }

    if config.leaderboard.per_page == 0 {
        return Err(invalid("Leaderboard page size must be greater than 0"));
    }
    if config.leaderboard.fetch_limit == 0 {
        return Err(invalid("Leaderboard fetch limit must be greater than 0"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    SpotlightError::configuration(message).into()
}
