//! cadence-suite: configure and write suite logs

mod cli;
mod config;

use clap::Parser;
use tracing::Level;

use cadence_utils::{init_logging, CadenceError, LoggerRegistry, Result, SuiteLog};

use cli::{Cli, Command};
use config::ConfigLoader;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = ConfigLoader::load_and_validate(cli.config.as_deref())?;

    match cli.command {
        Command::Paths { suite } => {
            let log = SuiteLog::new(&suite, &global)?;
            println!("dir: {}", log.dir().display());
            println!("log: {}", log.path().display());
            println!("err: {}", log.err_path().display());
        }
        Command::Config { defaults: true } => {
            print!("{}", config::DEFAULT_CONFIG_TOML.trim_start());
        }
        Command::Config { defaults: false } => {
            let text = toml::to_string_pretty(&global)
                .map_err(|e| CadenceError::internal(format!("Failed to render config: {}", e)))?;
            print!("{}", text);
        }
        Command::Log {
            suite,
            level,
            debug,
            message,
        } => {
            let log = SuiteLog::new(&suite, &global)?;
            let registry = LoggerRegistry::new();
            log.activate(&registry, if debug { Level::DEBUG } else { Level::INFO })?;

            let logger = log.logger(&registry);
            init_logging(logger.clone())?;
            tracing::debug!(suite = %suite, "writing to {}", log.path().display());

            logger.log(level, message.join(" "))?;
            logger.flush()?;
        }
    }

    Ok(())
}
