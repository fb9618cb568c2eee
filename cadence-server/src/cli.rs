//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// Suite logging for cadence workflows
#[derive(Parser, Debug)]
#[command(name = "cadence-suite")]
#[command(about = "Configure and write cadence suite logs")]
#[command(version)]
pub struct Cli {
    /// Global configuration file
    ///
    /// Defaults to $XDG_CONFIG_HOME/cadence/global.toml; built-in defaults
    /// apply when that file does not exist.
    #[arg(long, env = "CADENCE_CONF_PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a suite's log directory, log file and err file
    Paths {
        /// Suite name
        suite: String,
    },

    /// Print the effective global configuration
    Config {
        /// Print the built-in defaults instead
        #[arg(long)]
        defaults: bool,
    },

    /// Activate suite logging and write a message to the suite log
    Log {
        /// Suite name
        suite: String,

        /// Level of the message (trace, debug, info, warn|warning, error)
        #[arg(short, long, default_value = "info", value_parser = parse_level)]
        level: Level,

        /// Record debug messages too
        #[arg(long)]
        debug: bool,

        /// Message text
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
}

/// Parse a level name, accepting `warning` for `warn`
pub fn parse_level(s: &str) -> Result<Level, String> {
    if s.eq_ignore_ascii_case("warning") {
        return Ok(Level::WARN);
    }
    s.parse::<Level>()
        .map_err(|_| format!("invalid level '{}': expected trace, debug, info, warn or error", s))
}
