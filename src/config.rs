//! Service Configuration
//!
//! Runtime configuration read from the environment:
//! - `TRACKRATE_DB`: path to the SQLite database file (`:memory:` accepted)
//! - `PORT`: listen port for the `serve` command
//!
//! CLI flags override whatever the environment provides.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the database path
pub const ENV_DATABASE: &str = "TRACKRATE_DB";

/// Environment variable holding the listen port
pub const ENV_PORT: &str = "PORT";

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Port value present but not a valid u16
    #[error("Invalid {ENV_PORT} value: '{0}'")]
    InvalidPort(String),

    /// Database path resolved to an empty string
    #[error("Database path must not be empty")]
    EmptyDatabasePath,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Path to the SQLite database file (default: "./trackrate.sqlite")
    #[serde(default = "default_database")]
    pub database: String,

    /// Port to bind to (default: 8090)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database() -> String {
    "./trackrate.sqlite".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            port: default_port(),
        }
    }
}

impl ServiceConfig {
    /// Build a configuration from the environment, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = env::var(ENV_DATABASE).unwrap_or_else(|_| default_database());

        let port = match env::var(ENV_PORT) {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => default_port(),
        };

        Ok(Self { database, port })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.database, "./trackrate.sqlite");
        assert_eq!(config.port, 8090);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let config = ServiceConfig {
            database: "  ".to_string(),
            port: 8090,
        };
        assert!(config.validate().is_err());
    }
}
