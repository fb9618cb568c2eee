//! Suite logging
//!
//! Resolves a suite's log directory and rotation settings from the host
//! configuration, then wires the `main` logger with a rotating file sink
//! and a standard-error mirror for warnings and errors.
//!
//! Construction only reads configuration. Files and directories are created
//! by [`SuiteLog::activate`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::Level;

use crate::logging::{Logger, LoggerRegistry};
use crate::rotating::RotatingFileSink;
use crate::sink::{RecordFormatter, SinkId, StreamSink, StreamTarget};
use crate::wallclock::{LocalWallClock, WallClock};
use crate::{CadenceError, Result};

/// Name of the logger suite logging configures
pub const MAIN_LOGGER: &str = "main";

/// Host item naming the suite log directory
pub const SUITE_LOG_DIRECTORY: &str = "suite log directory";

/// Config section holding the rotation settings
pub const SUITE_LOGGING: &str = "suite logging";
pub const ROLL_OVER_AT_START_UP: &str = "roll over at start-up";
pub const ROLLING_ARCHIVE_LENGTH: &str = "rolling archive length";
pub const MAXIMUM_SIZE_IN_BYTES: &str = "maximum size in bytes";

/// Host configuration lookups
pub trait HostConfig {
    /// Resolve a per-suite item such as `"suite log directory"`
    fn derived_host_item(&self, suite: &str, item: &str) -> Result<PathBuf>;

    /// Look up a setting by its section/key path
    fn get(&self, keys: &[&str]) -> Result<toml::Value>;
}

fn key_path(keys: &[&str]) -> String {
    keys.join(" -> ")
}

fn lookup_bool(config: &dyn HostConfig, keys: &[&str]) -> Result<bool> {
    match config.get(keys)? {
        toml::Value::Boolean(b) => Ok(b),
        other => Err(CadenceError::lookup(
            key_path(keys),
            format!("expected a boolean, found {}", other.type_str()),
        )),
    }
}

fn lookup_count(config: &dyn HostConfig, keys: &[&str]) -> Result<u64> {
    match config.get(keys)? {
        toml::Value::Integer(n) => u64::try_from(n)
            .map_err(|_| CadenceError::lookup(key_path(keys), format!("must be non-negative, got {}", n))),
        other => Err(CadenceError::lookup(
            key_path(keys),
            format!("expected an integer, found {}", other.type_str()),
        )),
    }
}

/// Log locations and rotation policy for one suite
#[derive(Debug, Clone)]
pub struct SuiteLog {
    dir: PathBuf,
    path: PathBuf,
    err_path: PathBuf,
    roll_at_startup: bool,
    keep_count: u32,
    max_bytes: u64,
    clock: Arc<dyn WallClock>,
}

impl SuiteLog {
    /// Resolve log settings for `suite`; performs no I/O besides the lookups
    pub fn new(suite: &str, config: &dyn HostConfig) -> Result<Self> {
        let dir = config.derived_host_item(suite, SUITE_LOG_DIRECTORY)?;
        let roll_at_startup = lookup_bool(config, &[SUITE_LOGGING, ROLL_OVER_AT_START_UP])?;

        let keep_keys = [SUITE_LOGGING, ROLLING_ARCHIVE_LENGTH];
        let keep_count = u32::try_from(lookup_count(config, &keep_keys)?)
            .map_err(|_| CadenceError::lookup(key_path(&keep_keys), "too large"))?;
        let max_bytes = lookup_count(config, &[SUITE_LOGGING, MAXIMUM_SIZE_IN_BYTES])?;

        Ok(Self {
            path: dir.join("log"),
            err_path: dir.join("err"),
            dir,
            roll_at_startup,
            keep_count,
            max_bytes,
            clock: Arc::new(LocalWallClock),
        })
    }

    /// Replace the wall clock used to render timestamps
    pub fn with_wall_clock(mut self, clock: Arc<dyn WallClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The active log file, `<dir>/log`
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<dir>/err`; named for callers capturing raw stderr, no sink writes it
    pub fn err_path(&self) -> &Path {
        &self.err_path
    }

    pub fn roll_at_startup(&self) -> bool {
        self.roll_at_startup
    }

    pub fn keep_count(&self) -> u32 {
        self.keep_count
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// The `main` logger
    pub fn logger(&self, registry: &LoggerRegistry) -> Arc<Logger> {
        registry.logger(MAIN_LOGGER)
    }

    /// Activate at INFO
    pub fn activate_default(&self, registry: &LoggerRegistry) -> Result<()> {
        self.activate(registry, Level::INFO)
    }

    /// Attach the file and stderr sinks to the `main` logger
    ///
    /// Creates the log directory and an empty log file if absent. When
    /// rolling over at start-up, a non-empty existing log is moved to the
    /// first backup slot before anything new is written.
    ///
    /// Sinks already attached are left alone, so repeated calls neither
    /// duplicate output nor roll the log again.
    pub fn activate(&self, registry: &LoggerRegistry, level: Level) -> Result<()> {
        self.activate_with_stream(registry, level, StreamTarget::Stderr)
    }

    /// As [`activate`](Self::activate), mirroring warnings to `stream` instead of stderr
    pub fn activate_with_stream(
        &self,
        registry: &LoggerRegistry,
        level: Level,
        stream: StreamTarget,
    ) -> Result<()> {
        let logger = self.logger(registry);
        let formatter = Arc::new(RecordFormatter::new(Arc::clone(&self.clock)));

        let file_sink = if logger.has_sink(&SinkId::File(self.path.clone())) {
            None
        } else {
            Some(self.open_file_sink(Arc::clone(&formatter))?)
        };

        let stream_sink = if logger.has_sink(&stream.id()) {
            None
        } else {
            Some(StreamSink::new(stream, LevelFilter::WARN, formatter))
        };

        logger.set_level(level);
        if let Some(sink) = stream_sink {
            logger.add_sink(Arc::new(sink));
        }
        if let Some(sink) = file_sink {
            logger.add_sink(Arc::new(sink));
        }

        tracing::debug!(
            path = %self.path.display(),
            sinks = logger.sink_count(),
            "suite logging activated"
        );
        Ok(())
    }

    fn open_file_sink(&self, formatter: Arc<RecordFormatter>) -> Result<RotatingFileSink> {
        fs::create_dir_all(&self.dir).map_err(|e| CadenceError::FileWrite {
            path: self.dir.clone(),
            source: e,
        })?;

        let sink = RotatingFileSink::open(&self.path, self.max_bytes, self.keep_count, formatter)?;
        if self.roll_at_startup && sink.size() > 0 {
            sink.rollover()?;
        }
        Ok(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{LogRecord, SharedBuffer};
    use crate::wallclock::FixedOffsetWallClock;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// In-memory stand-in for the global configuration
    struct FakeConfig {
        log_dir: PathBuf,
        values: HashMap<String, toml::Value>,
    }

    impl FakeConfig {
        fn new(log_dir: impl Into<PathBuf>, roll: bool, keep: i64, max_bytes: i64) -> Self {
            let mut values = HashMap::new();
            values.insert(ROLL_OVER_AT_START_UP.to_string(), toml::Value::Boolean(roll));
            values.insert(ROLLING_ARCHIVE_LENGTH.to_string(), toml::Value::Integer(keep));
            values.insert(MAXIMUM_SIZE_IN_BYTES.to_string(), toml::Value::Integer(max_bytes));
            Self {
                log_dir: log_dir.into(),
                values,
            }
        }

        fn without(mut self, key: &str) -> Self {
            self.values.remove(key);
            self
        }

        fn with(mut self, key: &str, value: toml::Value) -> Self {
            self.values.insert(key.to_string(), value);
            self
        }
    }

    impl HostConfig for FakeConfig {
        fn derived_host_item(&self, suite: &str, item: &str) -> Result<PathBuf> {
            if item != SUITE_LOG_DIRECTORY {
                return Err(CadenceError::lookup(item, "unknown host item"));
            }
            if suite.is_empty() {
                return Err(CadenceError::lookup(item, "empty suite name"));
            }
            Ok(self.log_dir.clone())
        }

        fn get(&self, keys: &[&str]) -> Result<toml::Value> {
            match keys {
                [SUITE_LOGGING, key] => self
                    .values
                    .get(*key)
                    .cloned()
                    .ok_or_else(|| CadenceError::lookup(key_path(keys), "not set")),
                _ => Err(CadenceError::lookup(key_path(keys), "not set")),
            }
        }
    }

    fn utc() -> Arc<dyn WallClock> {
        Arc::new(FixedOffsetWallClock::utc())
    }

    fn suite_log(config: &FakeConfig) -> SuiteLog {
        SuiteLog::new("my.suite", config).unwrap().with_wall_clock(utc())
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_paths_derived_from_log_dir() {
        let config = FakeConfig::new("/srv/run/my.suite/log/suite", true, 5, 1_000_000);
        let log = SuiteLog::new("my.suite", &config).unwrap();

        assert_eq!(log.dir(), Path::new("/srv/run/my.suite/log/suite"));
        assert_eq!(log.path(), Path::new("/srv/run/my.suite/log/suite/log"));
        assert_eq!(log.err_path(), Path::new("/srv/run/my.suite/log/suite/err"));
        assert!(log.roll_at_startup());
        assert_eq!(log.keep_count(), 5);
        assert_eq!(log.max_bytes(), 1_000_000);
    }

    #[test]
    fn test_construction_has_no_side_effects() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("log").join("suite");
        let config = FakeConfig::new(&dir, true, 5, 100);

        let _log = SuiteLog::new("my.suite", &config).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_unresolvable_directory() {
        let config = FakeConfig::new("/tmp/x", false, 2, 100);
        let result = SuiteLog::new("", &config);
        assert!(matches!(result, Err(CadenceError::ConfigLookup { .. })));
    }

    #[test]
    fn test_missing_rotation_setting() {
        let config = FakeConfig::new("/tmp/x", false, 2, 100).without(MAXIMUM_SIZE_IN_BYTES);
        let err = SuiteLog::new("my.suite", &config).unwrap_err();
        assert!(matches!(err, CadenceError::ConfigLookup { .. }));
        assert!(err.to_string().contains(MAXIMUM_SIZE_IN_BYTES));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let config = FakeConfig::new("/tmp/x", false, 2, 100)
            .with(ROLL_OVER_AT_START_UP, toml::Value::String("yes".into()));
        let err = SuiteLog::new("my.suite", &config).unwrap_err();
        assert!(err.to_string().contains("expected a boolean"));
    }

    #[test]
    fn test_negative_count_rejected() {
        let config = FakeConfig::new("/tmp/x", false, -1, 100);
        let err = SuiteLog::new("my.suite", &config).unwrap_err();
        assert!(matches!(err, CadenceError::ConfigLookup { .. }));
        assert!(err.to_string().contains("non-negative"));
    }

    // ==================== Logger Retrieval Tests ====================

    #[test]
    fn test_logger_is_main_and_untouched() {
        let config = FakeConfig::new("/tmp/x", false, 2, 100);
        let log = suite_log(&config);
        let registry = LoggerRegistry::new();

        let logger = log.logger(&registry);
        assert_eq!(logger.name(), MAIN_LOGGER);
        assert_eq!(logger.sink_count(), 0);
        assert!(Arc::ptr_eq(&logger, &registry.logger(MAIN_LOGGER)));
    }

    // ==================== Activation Tests ====================

    #[test]
    fn test_activate_creates_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("my.suite").join("log").join("suite");
        let config = FakeConfig::new(&dir, true, 5, 1000);
        let registry = LoggerRegistry::new();

        suite_log(&config)
            .activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", SharedBuffer::new()))
            .unwrap();

        assert!(dir.join("log").exists());
        assert_eq!(fs::metadata(dir.join("log")).unwrap().len(), 0);
        assert!(!dir.join("err").exists());
        assert!(!dir.join("log.1").exists());
    }

    #[test]
    fn test_startup_roll_skips_empty_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("log"), "").unwrap();
        let config = FakeConfig::new(temp.path(), true, 5, 1000);
        let registry = LoggerRegistry::new();

        suite_log(&config)
            .activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", SharedBuffer::new()))
            .unwrap();

        assert!(!temp.path().join("log.1").exists());
    }

    #[test]
    fn test_startup_roll_moves_previous_run() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("log"), "previous run\n").unwrap();
        fs::write(temp.path().join("log.1"), "run before that\n").unwrap();
        let config = FakeConfig::new(temp.path(), true, 5, 1000);
        let registry = LoggerRegistry::new();

        suite_log(&config)
            .activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", SharedBuffer::new()))
            .unwrap();

        let read = |name: &str| fs::read_to_string(temp.path().join(name)).unwrap();
        assert_eq!(read("log"), "");
        assert_eq!(read("log.1"), "previous run\n");
        assert_eq!(read("log.2"), "run before that\n");
        assert!(!temp.path().join("log.3").exists());
    }

    #[test]
    fn test_startup_roll_without_archive_keeps_previous_run() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("log"), "previous run\n").unwrap();
        let config = FakeConfig::new(temp.path(), true, 0, 1000);
        let registry = LoggerRegistry::new();
        let log = suite_log(&config);

        log.activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", SharedBuffer::new()))
            .unwrap();
        log.logger(&registry).log(Level::INFO, "restarted").unwrap();

        assert!(!temp.path().join("log.1").exists());
        let contents = fs::read_to_string(temp.path().join("log")).unwrap();
        assert!(contents.starts_with("previous run\n"));
        assert!(contents.ends_with("INFO - restarted\n"));
    }

    #[test]
    fn test_no_startup_roll_appends() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("log"), "previous run\n").unwrap();
        let config = FakeConfig::new(temp.path(), false, 5, 1000);
        let registry = LoggerRegistry::new();
        let log = suite_log(&config);

        log.activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", SharedBuffer::new()))
            .unwrap();
        log.logger(&registry).log(Level::INFO, "resumed").unwrap();

        assert!(!temp.path().join("log.1").exists());
        let contents = fs::read_to_string(temp.path().join("log")).unwrap();
        assert!(contents.starts_with("previous run\n"));
        assert!(contents.ends_with(" INFO - resumed\n"));
    }

    #[test]
    fn test_warnings_mirrored_to_stream() {
        let temp = TempDir::new().unwrap();
        let config = FakeConfig::new(temp.path(), false, 5, 0);
        let registry = LoggerRegistry::new();
        let stream = SharedBuffer::new();
        let log = suite_log(&config);

        log.activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", stream.clone()))
            .unwrap();
        let logger = log.logger(&registry);
        logger.emit(&LogRecord::at(1_433_160_000.0, Level::INFO, "task submitted")).unwrap();
        logger.emit(&LogRecord::at(1_433_160_001.0, Level::WARN, "task retrying")).unwrap();
        logger.emit(&LogRecord::at(1_433_160_002.0, Level::ERROR, "task failed")).unwrap();
        logger.emit(&LogRecord::at(1_433_160_003.0, Level::DEBUG, "below level")).unwrap();

        let file = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            file,
            "2015-06-01T12:00:00Z INFO - task submitted\n\
             2015-06-01T12:00:01Z WARNING - task retrying\n\
             2015-06-01T12:00:02Z ERROR - task failed\n"
        );
        assert_eq!(
            stream.contents(),
            "2015-06-01T12:00:01Z WARNING - task retrying\n\
             2015-06-01T12:00:02Z ERROR - task failed\n"
        );
    }

    #[test]
    fn test_timestamps_come_from_wall_clock() {
        let temp = TempDir::new().unwrap();
        let config = FakeConfig::new(temp.path(), false, 5, 0);
        let registry = LoggerRegistry::new();
        let clock = FixedOffsetWallClock::east(12 * 3600).unwrap();
        let log = SuiteLog::new("my.suite", &config)
            .unwrap()
            .with_wall_clock(Arc::new(clock));

        log.activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", SharedBuffer::new()))
            .unwrap();
        log.logger(&registry)
            .emit(&LogRecord::at(1_433_160_000.0, Level::INFO, "hello"))
            .unwrap();

        let file = fs::read_to_string(log.path()).unwrap();
        assert_eq!(file, format!("{} INFO - hello\n", clock.time_string(1_433_160_000.0)));
        assert!(file.starts_with("2015-06-02T00:00:00+12:00"));
    }

    #[test]
    fn test_activation_sets_level() {
        let temp = TempDir::new().unwrap();
        let config = FakeConfig::new(temp.path(), false, 5, 0);
        let registry = LoggerRegistry::new();
        let log = suite_log(&config);

        log.activate_with_stream(&registry, Level::DEBUG, StreamTarget::writer("capture", SharedBuffer::new()))
            .unwrap();
        assert_eq!(log.logger(&registry).level(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_activate_default_uses_info() {
        let temp = TempDir::new().unwrap();
        let config = FakeConfig::new(temp.path(), false, 5, 0);
        let registry = LoggerRegistry::new();
        let log = suite_log(&config);

        log.activate_default(&registry).unwrap();
        let logger = log.logger(&registry);
        assert_eq!(logger.level(), LevelFilter::INFO);
        assert!(logger.has_sink(&SinkId::Stream("stderr".into())));
        assert!(logger.has_sink(&SinkId::File(log.path().to_path_buf())));
    }

    #[test]
    fn test_repeated_activation_is_idempotent() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("log"), "previous run\n").unwrap();
        let config = FakeConfig::new(temp.path(), true, 5, 0);
        let registry = LoggerRegistry::new();
        let stream = SharedBuffer::new();
        let log = suite_log(&config);

        log.activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", stream.clone()))
            .unwrap();
        log.logger(&registry).log(Level::WARN, "first").unwrap();
        log.activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", stream.clone()))
            .unwrap();
        log.logger(&registry).log(Level::WARN, "second").unwrap();

        let logger = log.logger(&registry);
        assert_eq!(logger.sink_count(), 2);
        assert_eq!(stream.contents().lines().count(), 2);
        // Only the first activation rolled the log over
        assert!(!temp.path().join("log.2").exists());
        let file = fs::read_to_string(log.path()).unwrap();
        assert_eq!(file.lines().count(), 2);
    }

    #[test]
    fn test_activation_failure_attaches_nothing() {
        let temp = TempDir::new().unwrap();
        // A regular file where the log directory should be
        let blocker = temp.path().join("blocked");
        fs::write(&blocker, "").unwrap();
        let config = FakeConfig::new(&blocker, false, 5, 100);
        let registry = LoggerRegistry::new();
        let log = suite_log(&config);

        let result = log.activate_with_stream(
            &registry,
            Level::INFO,
            StreamTarget::writer("capture", SharedBuffer::new()),
        );

        assert!(matches!(result, Err(CadenceError::FileWrite { .. })));
        assert_eq!(log.logger(&registry).sink_count(), 0);
    }

    #[test]
    fn test_end_to_end_size_rotation() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("x");
        let config = FakeConfig::new(&dir, false, 2, 100);
        let registry = LoggerRegistry::new();
        let log = suite_log(&config);

        log.activate_with_stream(&registry, Level::INFO, StreamTarget::writer("capture", SharedBuffer::new()))
            .unwrap();

        // Each line is 28 bytes of prefix + 16 + newline = 45 bytes: two fit
        // in 100, the third forces one rollover
        let logger = log.logger(&registry);
        for message in ["first message..", "second message.", "third message.."] {
            let padded = format!("{:<16}", message);
            logger.emit(&LogRecord::at(1_433_160_000.0, Level::INFO, padded)).unwrap();
        }

        let backup = fs::read_to_string(dir.join("log.1")).unwrap();
        assert!(backup.contains("first message"));
        assert!(backup.contains("second message"));
        assert!(!dir.join("log.2").exists());
        let active = fs::read_to_string(dir.join("log")).unwrap();
        assert!(active.contains("third message"));
        assert_eq!(active.lines().count(), 1);
    }
}
