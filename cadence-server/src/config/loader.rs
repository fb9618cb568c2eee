//! Configuration loader

use std::path::Path;

use cadence_utils::{config_file, CadenceError, Result};

use super::defaults::LOCALHOST;
use super::GlobalConfig;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from default location
    pub fn load() -> Result<GlobalConfig> {
        let path = config_file();
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            Ok(GlobalConfig::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<GlobalConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| CadenceError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration from string
    ///
    /// A `localhost` host entry is always present afterwards.
    pub fn parse(content: &str, path: &Path) -> Result<GlobalConfig> {
        let mut config: GlobalConfig =
            toml::from_str(content).map_err(|e| CadenceError::ConfigInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.hosts.entry(LOCALHOST.to_string()).or_default();
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(config: &GlobalConfig) -> Result<()> {
        for (name, host) in &config.hosts {
            if host.run_directory.trim().is_empty() {
                return Err(CadenceError::config(format!(
                    "hosts.{}: run directory must not be empty",
                    name
                )));
            }
            if host.work_directory.as_deref().is_some_and(|w| w.trim().is_empty()) {
                return Err(CadenceError::config(format!(
                    "hosts.{}: work directory must not be empty",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Load from `path` (or the default location) and validate
    pub fn load_and_validate(path: Option<&Path>) -> Result<GlobalConfig> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        Self::validate(&config)?;
        Ok(config)
    }
}
