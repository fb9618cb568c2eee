//! Path utilities for cadence
//!
//! Handles XDG Base Directory lookups for the global configuration file
//! and home-relative expansion of directories named in that file.

use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};

/// Application identifier for XDG directories
const APP_NAME: &str = "cadence";

/// Environment variable overriding the global config file location
pub const CONF_PATH_ENV: &str = "CADENCE_CONF_PATH";

/// Get project directories
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// Get the user's home directory
///
/// Falls back to `$HOME`, then `/tmp`, when the platform lookup fails.
pub fn home_dir() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .or_else(|| std::env::var("HOME").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Get the configuration directory
///
/// Location: `$XDG_CONFIG_HOME/cadence` or `~/.config/cadence`
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| home_dir().join(".config").join(APP_NAME))
}

/// Get the global configuration file path
///
/// Location: `$CADENCE_CONF_PATH` if set, else `$XDG_CONFIG_HOME/cadence/global.toml`
pub fn config_file() -> PathBuf {
    match std::env::var_os(CONF_PATH_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => config_dir().join("global.toml"),
    }
}

/// Expand a leading `~`, `$HOME` or `${HOME}` against the user's home directory
pub fn expand_path(raw: &str) -> PathBuf {
    expand_path_with_home(raw, &home_dir())
}

/// Expand a leading `~`, `$HOME` or `${HOME}` against `home`
///
/// Anything else is returned unchanged.
pub fn expand_path_with_home(raw: &str, home: &Path) -> PathBuf {
    for prefix in ["${HOME}", "$HOME", "~"] {
        if let Some(rest) = raw.strip_prefix(prefix) {
            if rest.is_empty() {
                return home.to_path_buf();
            }
            if let Some(rest) = rest.strip_prefix('/') {
                return home.join(rest);
            }
        }
    }
    PathBuf::from(raw)
}
