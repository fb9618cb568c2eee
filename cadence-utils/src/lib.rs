//! cadence-utils: Suite logging and common utilities shared across cadence crates
//!
//! This crate provides:
//! - Unified error types ([`CadenceError`], [`Result`])
//! - Suite log configuration ([`SuiteLog`], [`HostConfig`])
//! - Named loggers and the tracing bridge ([`LoggerRegistry`], [`init_logging`])
//! - Output sinks, including size-based rotation ([`RotatingFileSink`])
//! - Wall-clock time strings ([`wallclock`] module)
//! - XDG-compliant path utilities ([`paths`] module)

pub mod error;
pub mod logging;
pub mod paths;
pub mod rotating;
pub mod sink;
pub mod suite_log;
pub mod wallclock;

// Re-export main types at crate root for convenience
pub use error::{CadenceError, Result};
pub use logging::{init_logging, init_logging_with_filter, Logger, LoggerLayer, LoggerRegistry};
pub use rotating::RotatingFileSink;
pub use sink::{LogRecord, RecordFormatter, SharedBuffer, Sink, SinkId, StreamSink, StreamTarget};
pub use suite_log::{HostConfig, SuiteLog, MAIN_LOGGER};
pub use wallclock::{FixedOffsetWallClock, LocalWallClock, WallClock};

pub use paths::{config_dir, config_file, expand_path};
