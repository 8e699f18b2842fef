//! # Mission Run Configuration
//!
//! Layered configuration for the crate and the replay binary.
//!
//! ## Sources
//!
//! Later sources win:
//!
//! 1. compiled defaults ([`MissionRunConfig::default`])
//! 2. `<dir>/mission-run.toml`
//! 3. `<dir>/mission-run.<environment>.toml`
//! 4. `MISSION_RUN__`-prefixed environment variables, `__` between path segments
//!    (`MISSION_RUN__DATABASE__URL`, `MISSION_RUN__QUERY__MAX_PAGE_SIZE`)
//!
//! Both files are optional. The environment name comes from `MISSION_RUN_ENV`,
//! then `APP_ENV`, and defaults to `development`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mission_run_core::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load()?;
//! let max_page_size = config.query.max_page_size;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MissionRunConfig {
    /// Name of the environment the configuration was loaded for
    pub environment: String,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// Apply pending migrations when connecting
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/mission_runs_development".to_string(),
            max_connections: 10,
            acquire_timeout_seconds: 5,
            run_migrations: false,
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

/// Pagination limits for mission run listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Capacity of the status change broadcast channel
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive. Filled from the environment name when unset.
    pub level: Option<String>,
    /// Emit console output as JSON
    pub json: bool,
    /// Directory for daily rotated JSON log files
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// `info` in production, `debug` everywhere else
    pub fn default_level_for(environment: &str) -> &'static str {
        if environment.eq_ignore_ascii_case("production") {
            "info"
        } else {
            "debug"
        }
    }
}

impl MissionRunConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "database.url",
                "database configuration",
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                0,
                "pool size must be greater than 0",
            ));
        }

        if self.query.default_page_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "query.default_page_size",
                0,
                "page size must be greater than 0",
            ));
        }

        if self.query.max_page_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "query.max_page_size",
                0,
                "page size must be greater than 0",
            ));
        }

        if self.query.default_page_size > self.query.max_page_size {
            return Err(ConfigurationError::invalid_value(
                "query.default_page_size",
                self.query.default_page_size,
                format!(
                    "must not exceed query.max_page_size ({})",
                    self.query.max_page_size
                ),
            ));
        }

        if self.events.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.channel_capacity",
                0,
                "channel capacity must be greater than 0",
            ));
        }

        Ok(())
    }
}
