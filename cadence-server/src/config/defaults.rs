//! Default configuration values
//!
//! These are embedded in the binary and used when no config file exists.

/// Default global configuration as TOML
pub const DEFAULT_CONFIG_TOML: &str = r##"
# cadence global configuration

["suite logging"]
"roll over at start-up" = true
"rolling archive length" = 5
"maximum size in bytes" = 1000000

[hosts.localhost]
"run directory" = "$HOME/cadence-run"
# "work directory" = "$HOME/cadence-run"
"##;

pub const ROLL_OVER_AT_START_UP: bool = true;
pub const ROLLING_ARCHIVE_LENGTH: u32 = 5;
pub const MAXIMUM_SIZE_IN_BYTES: u64 = 1_000_000;
pub const RUN_DIRECTORY: &str = "$HOME/cadence-run";

/// Host used when no other host is named
pub const LOCALHOST: &str = "localhost";
