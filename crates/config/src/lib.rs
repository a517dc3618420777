//! Tabletail configuration
//!
//! TOML-based configuration loading with sensible defaults. A minimal config
//! only needs the tables to watch - everything else has a working default.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use tabletail_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[[tables]]\nname = \"orders\"").unwrap();
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [endpoint]
//! url = "http://localhost:8000"
//!
//! [consumer]
//! poll_interval_ms = 5000
//!
//! [[tables]]
//! name = "orders"
//!
//! [[tables]]
//! name = "sessions"
//! physical_name = "myapp-staging-sessions"
//! ```

mod consumer;
mod endpoint;
mod error;
mod logging;

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use consumer::{ConsumerConfig, TableConfig};
pub use endpoint::EndpointConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults, though a consumer with
/// no `[[tables]]` entries has nothing to do.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Storage/stream endpoint settings
    pub endpoint: EndpointConfig,

    /// Polling and retry tunables
    pub consumer: ConsumerConfig,

    /// Tables whose change streams should be consumed
    pub tables: Vec<TableConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks for duplicate table names and nonsensical tunables. An empty
    /// table list is allowed here - the consumer logs that case at runtime.
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            if table.name.is_empty() {
                return Err(ConfigError::invalid_value(
                    "table",
                    "(unnamed)",
                    "name",
                    "must not be empty",
                ));
            }
            if !seen.insert(table.name.as_str()) {
                return Err(ConfigError::DuplicateTable {
                    table: table.name.clone(),
                });
            }
        }

        if self.consumer.poll_interval_ms == 0 {
            return Err(ConfigError::invalid_value(
                "consumer",
                "consumer",
                "poll_interval_ms",
                "must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Names of all configured tables
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
