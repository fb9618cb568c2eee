//! Configuration schema structs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::defaults;

/// Root of the global configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    #[serde(rename = "suite logging")]
    pub suite_logging: SuiteLoggingConfig,
    pub hosts: BTreeMap<String, HostSettings>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        let mut hosts = BTreeMap::new();
        hosts.insert(defaults::LOCALHOST.to_string(), HostSettings::default());
        Self {
            suite_logging: SuiteLoggingConfig::default(),
            hosts,
        }
    }
}

/// Suite log rotation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteLoggingConfig {
    /// Roll a non-empty log over when the suite starts (default: true)
    #[serde(rename = "roll over at start-up")]
    pub roll_over_at_startup: bool,
    /// Number of rolled-over logs to keep (default: 5)
    #[serde(rename = "rolling archive length")]
    pub rolling_archive_length: u32,
    /// Roll the log over before it grows past this; 0 disables (default: 1000000)
    #[serde(rename = "maximum size in bytes")]
    pub maximum_size_in_bytes: u64,
}

impl Default for SuiteLoggingConfig {
    fn default() -> Self {
        Self {
            roll_over_at_startup: defaults::ROLL_OVER_AT_START_UP,
            rolling_archive_length: defaults::ROLLING_ARCHIVE_LENGTH,
            maximum_size_in_bytes: defaults::MAXIMUM_SIZE_IN_BYTES,
        }
    }
}

/// Per-host directory settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Root under which each suite gets its run directory
    #[serde(rename = "run directory")]
    pub run_directory: String,
    /// Root for suite work directories; falls back to the run directory
    #[serde(rename = "work directory", skip_serializing_if = "Option::is_none")]
    pub work_directory: Option<String>,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            run_directory: defaults::RUN_DIRECTORY.to_string(),
            work_directory: None,
        }
    }
}

impl HostSettings {
    pub fn work_directory(&self) -> &str {
        self.work_directory.as_deref().unwrap_or(&self.run_directory)
    }
}
