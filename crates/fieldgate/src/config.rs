//! Configuration management for fieldgate.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::FilterOptions;
use crate::schema::CompileOptions;
use crate::serializer::SerializerOptions;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "fieldgate";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "FIELDGATE_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FIELDGATE_`, sections separated
///    by `__`, e.g. `FIELDGATE_FILTER__DEFAULT_FIELDS_ACCESS=public`)
/// 2. TOML config file at `~/.config/fieldgate/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Options shared by filtering and views.
    pub filter: FilterOptions,
    /// Whole-document serialization options.
    pub serializer: SerializerOptions,
    /// Schema compilation defaults.
    pub compiler: CompileOptions,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.compiler.version_key {
            if key.trim().is_empty() {
                return Err(Error::config_validation(
                    "compiler.version_key must not be empty",
                ));
            }
            if key.contains('.') {
                return Err(Error::config_validation(format!(
                    "compiler.version_key must be a top-level field name, got '{key}'"
                )));
            }
        }
        Ok(())
    }
}
