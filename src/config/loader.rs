//! Configuration Loader
//!
//! Environment-aware loading: file discovery, environment detection and merging
//! through the `config` crate.

use super::error::ConfigResult;
use super::{LoggingConfig, MissionRunConfig};
use config::{Config, Environment, File};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_STEM: &str = "mission-run";
const ENV_PREFIX: &str = "MISSION_RUN";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `./config` for the detected environment
    pub fn load() -> ConfigResult<MissionRunConfig> {
        Self::load_from_directory(Self::default_config_directory())
    }

    /// Load configuration from a specific directory for the detected environment
    pub fn load_from_directory(config_dir: impl AsRef<Path>) -> ConfigResult<MissionRunConfig> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment, None)
    }

    /// Load configuration with an explicit environment name.
    ///
    /// `env_vars` replaces the process environment as the source of
    /// `MISSION_RUN__*` overrides when given, which keeps tests independent of
    /// the global environment.
    pub fn load_from_directory_with_env(
        config_dir: impl AsRef<Path>,
        environment: &str,
        env_vars: Option<HashMap<String, String>>,
    ) -> ConfigResult<MissionRunConfig> {
        let config_dir = config_dir.as_ref();
        debug!(
            environment = environment,
            config_dir = %config_dir.display(),
            "Loading mission run configuration"
        );

        let settings = Config::builder()
            .add_source(Config::try_from(&MissionRunConfig::default())?)
            .add_source(File::from(config_dir.join(format!("{FILE_STEM}.toml"))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{FILE_STEM}.{environment}.toml")))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env_vars),
            )
            .set_override("environment", environment)?
            .build()?;

        let mut config: MissionRunConfig = settings.try_deserialize()?;
        if config.logging.level.is_none() {
            config.logging.level = Some(LoggingConfig::default_level_for(environment).to_string());
        }

        config.validate()?;
        Ok(config)
    }

    /// `MISSION_RUN_ENV`, then `APP_ENV`, then `development`
    pub fn detect_environment() -> String {
        env::var("MISSION_RUN_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        env::current_dir()
            .map(|dir| dir.join("config"))
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}
