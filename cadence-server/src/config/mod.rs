//! Global configuration for cadence
//!
//! Loads the site/user `global.toml`, falling back to embedded defaults,
//! and answers the host lookups suite logging needs.

mod defaults;
mod loader;
mod schema;

pub use defaults::{DEFAULT_CONFIG_TOML, LOCALHOST};
pub use loader::ConfigLoader;
pub use schema::*;

use std::path::PathBuf;

use cadence_utils::paths::expand_path;
use cadence_utils::{CadenceError, HostConfig, Result};

impl GlobalConfig {
    fn host(&self, name: &str) -> Result<&HostSettings> {
        self.hosts
            .get(name)
            .ok_or_else(|| CadenceError::lookup(format!("hosts -> {}", name), "no such host"))
    }

    /// Resolve a per-suite directory for `host`
    pub fn derived_item_for_host(&self, suite: &str, item: &str, host: &str) -> Result<PathBuf> {
        if suite.trim().is_empty() {
            return Err(CadenceError::lookup(item, "suite name is empty"));
        }
        let settings = self.host(host)?;
        let run = expand_path(&settings.run_directory).join(suite);

        match item {
            "suite run directory" => Ok(run),
            "suite log directory" => Ok(run.join("log").join("suite")),
            "suite job log directory" => Ok(run.join("log").join("job")),
            "suite share directory" => Ok(run.join("share")),
            "suite work directory" => {
                Ok(expand_path(settings.work_directory()).join(suite).join("work"))
            }
            _ => Err(CadenceError::lookup(item, "unknown host item")),
        }
    }
}

impl HostConfig for GlobalConfig {
    fn derived_host_item(&self, suite: &str, item: &str) -> Result<PathBuf> {
        self.derived_item_for_host(suite, item, LOCALHOST)
    }

    fn get(&self, keys: &[&str]) -> Result<toml::Value> {
        let key = keys.join(" -> ");
        let root = toml::Value::try_from(self)
            .map_err(|e| CadenceError::internal(format!("Failed to serialize config: {}", e)))?;

        let mut node = &root;
        for k in keys {
            node = node
                .get(*k)
                .ok_or_else(|| CadenceError::lookup(key.clone(), "not set"))?;
        }
        Ok(node.clone())
    }
}
