//! Log records, formatting and output sinks
//!
//! A [`Sink`] accepts records that pass its own level threshold and writes
//! them through a shared [`RecordFormatter`], so every sink attached to a
//! logger renders identical lines.

use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::level_filters::LevelFilter;
use tracing::Level;

use crate::wallclock::WallClock;

/// A single log record
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Creation instant as Unix epoch seconds
    pub created: f64,
    pub level: Level,
    pub message: String,
}

impl LogRecord {
    /// Create a record stamped with the current time
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        Self::at(created, level, message)
    }

    /// Create a record with an explicit creation instant
    pub fn at(created: f64, level: Level, message: impl Into<String>) -> Self {
        Self {
            created,
            level,
            message: message.into(),
        }
    }
}

/// Renders records as `<timestamp> <LV> - <message>`
///
/// The timestamp always comes from the wall clock, never from a
/// locale-dependent default.
#[derive(Debug, Clone)]
pub struct RecordFormatter {
    clock: Arc<dyn WallClock>,
}

impl RecordFormatter {
    pub fn new(clock: Arc<dyn WallClock>) -> Self {
        Self { clock }
    }

    pub fn format_time(&self, created: f64) -> String {
        self.clock.time_string(created)
    }

    pub fn format(&self, record: &LogRecord) -> String {
        format!(
            "{} {:<2} - {}",
            self.format_time(record.created),
            level_name(record.level),
            record.message
        )
    }
}

/// Name written for `level`; warnings are spelled out in full
fn level_name(level: Level) -> &'static str {
    if level == Level::WARN {
        "WARNING"
    } else {
        level.as_str()
    }
}

/// Identity of an attached sink
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SinkId {
    /// A file sink, keyed by its target path
    File(PathBuf),
    /// A stream sink, keyed by its label (`"stderr"` for standard error)
    Stream(String),
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Stream(label) => write!(f, "stream:{}", label),
        }
    }
}

/// Destination for formatted log records
pub trait Sink: Send + Sync {
    fn id(&self) -> SinkId;

    /// Most verbose level this sink accepts
    fn threshold(&self) -> LevelFilter;

    fn accepts(&self, level: Level) -> bool {
        level <= self.threshold()
    }

    /// Format and write one record
    fn emit(&self, record: &LogRecord) -> io::Result<()>;

    fn flush(&self) -> io::Result<()>;
}

/// Where a stream sink writes
pub enum StreamTarget {
    /// The process's standard error
    Stderr,
    /// An arbitrary writer identified by `label`
    Writer {
        label: String,
        writer: Box<dyn Write + Send>,
    },
}

impl StreamTarget {
    pub fn writer(label: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self::Writer {
            label: label.into(),
            writer: Box::new(writer),
        }
    }

    pub fn id(&self) -> SinkId {
        match self {
            Self::Stderr => SinkId::Stream("stderr".into()),
            Self::Writer { label, .. } => SinkId::Stream(label.clone()),
        }
    }
}

impl fmt::Debug for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stderr => f.write_str("Stderr"),
            Self::Writer { label, .. } => f.debug_struct("Writer").field("label", label).finish(),
        }
    }
}

/// Sink writing lines to a stream; standard error is never closed by it
pub struct StreamSink {
    id: SinkId,
    writer: Option<Mutex<Box<dyn Write + Send>>>,
    threshold: LevelFilter,
    formatter: Arc<RecordFormatter>,
}

impl StreamSink {
    pub fn new(target: StreamTarget, threshold: LevelFilter, formatter: Arc<RecordFormatter>) -> Self {
        let id = target.id();
        let writer = match target {
            StreamTarget::Stderr => None,
            StreamTarget::Writer { writer, .. } => Some(Mutex::new(writer)),
        };
        Self {
            id,
            writer,
            threshold,
            formatter,
        }
    }
}

impl Sink for StreamSink {
    fn id(&self) -> SinkId {
        self.id.clone()
    }

    fn threshold(&self) -> LevelFilter {
        self.threshold
    }

    fn emit(&self, record: &LogRecord) -> io::Result<()> {
        let line = self.formatter.format(record);
        match &self.writer {
            Some(writer) => writeln!(writer.lock(), "{}", line),
            None => writeln!(io::stderr().lock(), "{}", line),
        }
    }

    fn flush(&self) -> io::Result<()> {
        match &self.writer {
            Some(writer) => writer.lock().flush(),
            None => io::stderr().lock().flush(),
        }
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink")
            .field("id", &self.id)
            .field("threshold", &self.threshold)
            .finish()
    }
}

/// Clonable in-memory writer, handy for capturing stream output
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
