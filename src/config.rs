//! Configuration management for the voting system
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present) with validation.

use crate::{Result, config_error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Database location and connection behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path (`:memory:` for a private in-memory store)
    pub path: PathBuf,

    /// How long a writer waits for a competing transaction, in milliseconds
    pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
    fn from_env() -> Result<Self> {
        let path = std::env::var("ELECTIONDAY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data").join("electionday.db"));

        let busy_timeout_ms = std::env::var("ELECTIONDAY_BUSY_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| config_error!("Invalid ELECTIONDAY_BUSY_TIMEOUT_MS"))?;

        Ok(Self {
            path,
            busy_timeout_ms,
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,

    /// Seed file used by `electionday setup`
    pub data_path: PathBuf,

    /// Shared secret gating the results view, never serialized
    #[serde(skip_serializing, default)]
    pub results_password: String,

    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let results_password = std::env::var("PASSWORD")
            .map_err(|_| config_error!("PASSWORD environment variable required"))?;
        Self::validate_password(&results_password)?;

        let data_path = std::env::var("ELECTIONDAY_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data").join("data.json"));

        let logging = LoggingConfig {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        };

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            data_path,
            results_password,
            logging,
        })
    }

    /// Create configuration for testing
    pub fn for_testing() -> Result<Self> {
        Ok(Self {
            database: DatabaseConfig {
                path: PathBuf::from(":memory:"),
                busy_timeout_ms: 1000,
            },
            data_path: PathBuf::from("data").join("data.json"),
            results_password: "test-password".to_string(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
        })
    }

    fn validate_password(password: &str) -> Result<()> {
        if password.trim().is_empty() {
            return Err(config_error!("PASSWORD must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database", &self.database)
            .field("data_path", &self.data_path)
            .field("results_password", &"<redacted>")
            .field("logging", &self.logging)
            .finish()
    }
}
