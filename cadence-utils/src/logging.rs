//! Logging infrastructure for cadence
//!
//! Named loggers live in an explicit [`LoggerRegistry`] rather than a hidden
//! process global. A [`Logger`] fans records out to its attached sinks, and
//! [`LoggerLayer`] bridges the tracing ecosystem into one, so `tracing`
//! macros anywhere in the process land in the suite log.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{field::Visit, Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::sink::{LogRecord, Sink, SinkId};
use crate::{CadenceError, Result};

/// Environment variable holding tracing filter directives
pub const LOG_FILTER_ENV: &str = "CADENCE_LOG";

/// A named logger with a minimum level and a set of sinks
pub struct Logger {
    name: String,
    level: RwLock<LevelFilter>,
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
}

impl Logger {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: RwLock::new(LevelFilter::WARN),
            sinks: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LevelFilter {
        *self.level.read()
    }

    pub fn set_level(&self, level: impl Into<LevelFilter>) {
        *self.level.write() = level.into();
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level <= self.level()
    }

    /// Attach a sink; returns false if one with the same id is already attached
    pub fn add_sink(&self, sink: Arc<dyn Sink>) -> bool {
        let mut sinks = self.sinks.write();
        let id = sink.id();
        if sinks.iter().any(|s| s.id() == id) {
            return false;
        }
        sinks.push(sink);
        true
    }

    pub fn has_sink(&self, id: &SinkId) -> bool {
        self.sinks.read().iter().any(|s| &s.id() == id)
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn sink_ids(&self) -> Vec<SinkId> {
        self.sinks.read().iter().map(|s| s.id()).collect()
    }

    /// Log a message stamped with the current time
    pub fn log(&self, level: Level, message: impl Into<String>) -> Result<()> {
        if !self.is_enabled(level) {
            return Ok(());
        }
        self.emit(&LogRecord::new(level, message))
    }

    /// Dispatch a record to every sink that accepts its level
    ///
    /// Every sink is attempted; the first failure is returned.
    pub fn emit(&self, record: &LogRecord) -> Result<()> {
        if !self.is_enabled(record.level) {
            return Ok(());
        }

        let mut first_err = None;
        for sink in self.sinks.read().iter() {
            if !sink.accepts(record.level) {
                continue;
            }
            if let Err(e) = sink.emit(record) {
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(CadenceError::Io(e)),
            None => Ok(()),
        }
    }

    pub fn flush(&self) -> Result<()> {
        for sink in self.sinks.read().iter() {
            sink.flush()?;
        }
        Ok(())
    }

    /// Flush and drop every attached sink, releasing their handles
    pub fn detach_all(&self) -> Result<()> {
        let sinks = std::mem::take(&mut *self.sinks.write());
        for sink in &sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("sinks", &self.sink_ids())
            .finish()
    }
}

/// Name-keyed set of loggers
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a logger by name, creating it on first use
    pub fn logger(&self, name: &str) -> Arc<Logger> {
        if let Some(logger) = self.get(name) {
            return logger;
        }
        self.loggers
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Logger::new(name)))
            .clone()
    }

    /// Look up a logger by name without creating it
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Collects the message and any extra fields of a tracing event
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl MessageVisitor {
    fn into_message(self) -> String {
        let mut out = self.message.unwrap_or_default();
        for (name, value) in self.fields {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&name);
            out.push('=');
            out.push_str(&value);
        }
        out
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        let value = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }
}

/// Tracing layer forwarding events to a [`Logger`]
pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if !self.logger.is_enabled(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Err(e) = self.logger.log(level, visitor.into_message()) {
            eprintln!("--- Logging error in '{}': {} ---", self.logger.name(), e);
        }
    }
}

/// Install `logger` as the destination of the global tracing subscriber
///
/// Uses CADENCE_LOG for filter directives; without it every event reaches
/// the logger, which applies its own level.
pub fn init_logging(logger: Arc<Logger>) -> Result<()> {
    let directives = std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| "trace".into());
    init_logging_with_filter(logger, &directives)
}

/// Install `logger` as the global tracing destination with explicit directives
pub fn init_logging_with_filter(logger: Arc<Logger>, directives: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directives)
        .map_err(|e| CadenceError::config(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(LoggerLayer::new(logger))
        .try_init()
        .map_err(|e| CadenceError::internal(format!("Failed to init logging: {}", e)))
}
