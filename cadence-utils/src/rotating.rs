//! Size-based rotating file sink
//!
//! The active file keeps its name; backups are numbered `<name>.1` (newest)
//! through `<name>.<keep_count>` (oldest). A rollover shifts every backup one
//! slot up, dropping whatever was in the last slot.

use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;

use crate::sink::{LogRecord, RecordFormatter, Sink, SinkId};
use crate::{CadenceError, Result};

struct Inner {
    writer: Option<BufWriter<File>>,
    size: u64,
}

/// File sink that rolls over before the file would reach `max_bytes`
pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes: u64,
    keep_count: u32,
    formatter: Arc<RecordFormatter>,
    inner: Mutex<Inner>,
}

impl RotatingFileSink {
    /// Open `path` for appending, creating an empty file if it does not exist
    ///
    /// A `max_bytes` or `keep_count` of zero disables size-based rollover.
    pub fn open(
        path: impl Into<PathBuf>,
        max_bytes: u64,
        keep_count: u32,
        formatter: Arc<RecordFormatter>,
    ) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        let size = file
            .metadata()
            .map_err(|e| CadenceError::FileWrite {
                path: path.clone(),
                source: e,
            })?
            .len();

        Ok(Self {
            path,
            max_bytes,
            keep_count,
            formatter,
            inner: Mutex::new(Inner {
                writer: Some(BufWriter::new(file)),
                size,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn keep_count(&self) -> u32 {
        self.keep_count
    }

    /// Current size of the active file, including buffered bytes
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Path of backup slot `index` (1 is the newest)
    pub fn backup_path(&self, index: u32) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}", index));
        self.path.with_file_name(name)
    }

    /// Force a rollover now, regardless of size
    ///
    /// With a `keep_count` of zero there is nowhere to keep the old content,
    /// so the active file is reopened in place and nothing is lost.
    pub fn rollover(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        self.rollover_locked(&mut inner)
    }

    fn rollover_locked(&self, inner: &mut Inner) -> Result<()> {
        if let Some(mut writer) = inner.writer.take() {
            let _ = writer.flush();
        }

        if self.keep_count == 0 {
            inner.writer = Some(BufWriter::new(open_append(&self.path)?));
            return Ok(());
        }

        for i in (1..self.keep_count).rev() {
            let src = self.backup_path(i);
            if src.exists() {
                let dst = self.backup_path(i + 1);
                replace(&src, &dst)?;
            }
        }
        if self.path.exists() {
            replace(&self.path, &self.backup_path(1))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| CadenceError::FileWrite {
                path: self.path.clone(),
                source: e,
            })?;

        inner.writer = Some(BufWriter::new(file));
        inner.size = 0;
        Ok(())
    }

    fn should_roll(&self, size: u64, incoming: u64) -> bool {
        self.max_bytes > 0
            && self.keep_count > 0
            && size > 0
            && size + incoming >= self.max_bytes
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CadenceError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
}

fn replace(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        fs::remove_file(dst).map_err(|e| CadenceError::FileWrite {
            path: dst.to_path_buf(),
            source: e,
        })?;
    }
    fs::rename(src, dst).map_err(|e| CadenceError::FileWrite {
        path: dst.to_path_buf(),
        source: e,
    })
}

fn into_io(err: CadenceError) -> io::Error {
    match err {
        CadenceError::Io(e) => e,
        CadenceError::FileWrite { source, .. } | CadenceError::FileRead { source, .. } => source,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

impl Sink for RotatingFileSink {
    fn id(&self) -> SinkId {
        SinkId::File(self.path.clone())
    }

    fn threshold(&self) -> LevelFilter {
        LevelFilter::TRACE
    }

    fn emit(&self, record: &LogRecord) -> io::Result<()> {
        let line = format!("{}\n", self.formatter.format(record));
        let bytes = line.as_bytes();

        let mut inner = self.inner.lock();
        if self.should_roll(inner.size, bytes.len() as u64) {
            self.rollover_locked(&mut inner).map_err(into_io)?;
        }

        if inner.writer.is_none() {
            inner.writer = Some(BufWriter::new(open_append(&self.path).map_err(into_io)?));
        }
        if let Some(ref mut writer) = inner.writer {
            writer.write_all(bytes)?;
            writer.flush()?;
        }
        inner.size += bytes.len() as u64;
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        match self.inner.lock().writer {
            Some(ref mut writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileSink")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("keep_count", &self.keep_count)
            .field("size", &self.inner.lock().size)
            .finish()
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        let _ = Sink::flush(self);
    }
}
