//! Process configuration for the store
//!
//! Read once at service start; the resulting `StoreConfig` is handed to
//! `SqliteStore::open`. `.env` files are honored the same way the
//! surrounding service would load them.

use std::path::PathBuf;

use thiserror::Error;

/// Environment variable naming the SQLite database file
pub const ENV_DB_PATH: &str = "LOCARE_DB";

/// Default database file when the variable is unset
pub const DEFAULT_DB_PATH: &str = "locare.db";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is set but not valid unicode")]
    InvalidVar(&'static str),
}

/// Store configuration with an explicit lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path of the SQLite database file
    pub db_path: PathBuf,
}

impl StoreConfig {
    /// Build a configuration pointing at the given database file
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Load configuration from the environment
    ///
    /// Loads a `.env` file if present (missing file is not an error), then
    /// reads `LOCARE_DB`, falling back to `locare.db`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        match std::env::var(ENV_DB_PATH) {
            Ok(path) => Ok(Self::new(path)),
            Err(std::env::VarError::NotPresent) => Ok(Self::new(DEFAULT_DB_PATH)),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidVar(ENV_DB_PATH)),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH)
    }
}
