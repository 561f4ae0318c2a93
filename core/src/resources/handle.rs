// algokernel/src/resources/handle.rs

//! File-backed resource handles holding newline-delimited records.

use crate::error::{KernelError, KernelResult};

use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{event, Level};

/// A read-only input, shared by every stage that asks for the same path.
#[derive(Debug)]
pub struct InputResource {
  path: PathBuf,
  reader: Mutex<BufReader<File>>,
}

impl InputResource {
  pub(crate) fn open(path: &Path) -> KernelResult<Self> {
    let file = File::open(path).map_err(|e| KernelError::io(path, e))?;
    event!(Level::DEBUG, path = %path.display(), "Opened input.");
    Ok(Self {
      path: path.to_path_buf(),
      reader: Mutex::new(BufReader::new(file)),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Next record without its line terminator, or `None` at end of input.
  pub fn read_record(&self) -> KernelResult<Option<String>> {
    let mut line = String::new();
    let read = self
      .reader
      .lock()
      .read_line(&mut line)
      .map_err(|e| KernelError::io(&self.path, e))?;
    if read == 0 {
      return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(&['\n', '\r'][..]).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
  }

  /// Moves back to the first record.
  pub fn rewind(&self) -> KernelResult<()> {
    self
      .reader
      .lock()
      .seek(SeekFrom::Start(0))
      .map(|_| ())
      .map_err(|e| KernelError::io(&self.path, e))
  }
}

/// A writable output registered under a name.
///
/// Closing releases the underlying file; holders of the handle keep a valid
/// object but further writes fail with `ResourceClosed`.
#[derive(Debug)]
pub struct OutputResource {
  name: String,
  path: PathBuf,
  writer: Mutex<Option<BufWriter<File>>>,
  records_written: AtomicU64,
}

impl OutputResource {
  /// Creates (or truncates) the file at `path`.
  pub(crate) fn create(name: &str, path: &Path) -> KernelResult<Self> {
    let file = File::create(path).map_err(|e| KernelError::io(path, e))?;
    event!(Level::DEBUG, %name, path = %path.display(), "Opened output.");
    Ok(Self {
      name: name.to_string(),
      path: path.to_path_buf(),
      writer: Mutex::new(Some(BufWriter::new(file))),
      records_written: AtomicU64::new(0),
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn is_open(&self) -> bool {
    self.writer.lock().is_some()
  }

  pub fn records_written(&self) -> u64 {
    self.records_written.load(Ordering::Relaxed)
  }

  /// Appends one record followed by a newline.
  pub fn write_record(&self, record: &str) -> KernelResult<()> {
    let mut guard = self.writer.lock();
    let writer = guard.as_mut().ok_or_else(|| KernelError::ResourceClosed {
      name: self.name.clone(),
    })?;
    writeln!(writer, "{}", record).map_err(|e| KernelError::io(&self.path, e))?;
    self.records_written.fetch_add(1, Ordering::Relaxed);
    Ok(())
  }

  pub fn flush(&self) -> KernelResult<()> {
    match self.writer.lock().as_mut() {
      Some(writer) => writer.flush().map_err(|e| KernelError::io(&self.path, e)),
      None => Err(KernelError::ResourceClosed {
        name: self.name.clone(),
      }),
    }
  }

  /// Flushes and releases the file. Closing twice is a no-op.
  pub fn close(&self) -> KernelResult<()> {
    let writer = self.writer.lock().take();
    if let Some(mut writer) = writer {
      event!(Level::DEBUG, name = %self.name, records = self.records_written(), "Closing output.");
      writer.flush().map_err(|e| KernelError::io(&self.path, e))?;
    }
    Ok(())
  }
}
