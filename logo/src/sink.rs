//! Serialized record output.
//!
//! A sink owns the single writer behind a facade (and every child derived
//! from it). Records arrive fully encoded and are written with one
//! `write_all` while the writer lock is held, so concurrent records never
//! interleave.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::config::LogOutput;
use crate::error::{LogError, Result};

pub(crate) struct Sink {
    writer: Mutex<Box<dyn Write + Send>>,
    closed: AtomicBool,
}

impl Sink {
    pub(crate) fn open(output: &LogOutput) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match output {
            LogOutput::Stderr => Box::new(io::stderr()),
            LogOutput::Stdout => Box::new(io::stdout()),
            LogOutput::File(path) => {
                let open_err = |source: io::Error| LogError::OpenSink {
                    path: path.clone(),
                    source,
                };
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(open_err)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(open_err)?;
                Box::new(BufWriter::new(file))
            }
            LogOutput::Writer(shared) => Box::new(shared.clone()),
        };

        Ok(Self {
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
        })
    }

    /// Write one encoded record. Failures are dropped; logging never fails the caller.
    pub(crate) fn write_record(&self, record: &[u8]) {
        let mut writer = self.lock();
        // Checked under the lock so no record lands behind the final flush
        if self.is_closed() {
            return;
        }
        let _ = writer.write_all(record);
    }

    pub(crate) fn flush(&self) {
        let _ = self.lock().flush();
    }

    /// Flush and stop accepting records. Repeated calls only flush.
    pub(crate) fn close(&self) {
        let mut writer = self.lock();
        let _ = writer.flush();
        self.closed.store(true, Ordering::Release);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        // A panic while writing leaves the writer usable
        self.writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
