//! Record writer
//!
//! Capture runs on failure paths, often from a panic hook, so it must never
//! make things worse: every error is swallowed and logged at `debug`, and a
//! half-written file is removed.
//!
//! A record is written under a dot-prefixed `.partial` name and renamed into
//! place once synced, so a scan never sees a file that is still being written.

use crate::store::CRASHLOG_EXTENSION;
use crashlog_core::{panic_message, Failure, FailureRecord};
use crashlog_wire::{encode_record, EncodeError};
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Extension of a record that is still being written
const PARTIAL_EXTENSION: &str = "partial";

/// Persists failures as record files in one directory.
///
/// Holds no lock and no shared state; concurrent captures each create their
/// own uniquely named file.
#[derive(Debug, Clone)]
pub struct RecordWriter {
    dir: PathBuf,
}

impl RecordWriter {
    /// Writer for `dir`.
    ///
    /// The directory is not checked here; use [`LogStore::open`](crate::LogStore::open)
    /// to get a writer for a directory known to be writable.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Flatten `failure` into a record stamped with now and `session_id`
    pub fn record_for(failure: &Failure, session_id: &str) -> FailureRecord {
        FailureRecord::from_failure(failure, session_id)
    }

    /// Persist `failure` as a new record file.
    ///
    /// Returns the file path, or `None` if the record was lost. Never panics
    /// and never returns an error.
    pub fn capture(&self, failure: &Failure, session_id: &str) -> Option<PathBuf> {
        Self::guarded(|| self.persist(&Self::record_for(failure, session_id)))
    }

    /// Build the failure with `build` and persist it.
    ///
    /// `build` runs under the same panic guard as the write, so a
    /// `Display` impl that panics while the chain is collected only loses
    /// the record.
    pub fn capture_with<F>(&self, build: F, session_id: &str) -> Option<PathBuf>
    where
        F: FnOnce() -> Failure,
    {
        Self::guarded(|| self.persist(&Self::record_for(&build(), session_id)))
    }

    fn guarded<F>(write: F) -> Option<PathBuf>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        match panic::catch_unwind(AssertUnwindSafe(write)) {
            Ok(path) => path,
            Err(payload) => {
                debug!(
                    "Panic while capturing crash record: {}",
                    panic_message(payload.as_ref())
                );
                None
            }
        }
    }

    /// Persist an already built record.
    ///
    /// Same contract as [`capture`](Self::capture).
    pub fn persist(&self, record: &FailureRecord) -> Option<PathBuf> {
        let id = Uuid::new_v4();
        let partial = self.dir.join(format!(".{}.{}", id, PARTIAL_EXTENSION));
        let path = self.dir.join(format!("{}.{}", id, CRASHLOG_EXTENSION));

        let file = match OpenOptions::new().write(true).create_new(true).open(&partial) {
            Ok(file) => file,
            Err(e) => {
                debug!("Cannot create crash record {}: {}", partial.display(), e);
                return None;
            }
        };

        let written = write_record(file, record)
            .and_then(|()| fs::rename(&partial, &path).map_err(EncodeError::from));

        match written {
            Ok(()) => {
                debug!("Wrote crash record {}", path.display());
                Some(path)
            }
            Err(e) => {
                debug!("Failed to write crash record {}: {}", path.display(), e);
                if let Err(e) = fs::remove_file(&partial) {
                    debug!("Cannot remove partial record {}: {}", partial.display(), e);
                }
                None
            }
        }
    }
}

fn write_record(file: File, record: &FailureRecord) -> Result<(), EncodeError> {
    let buffered = encode_record(record, BufWriter::new(file))?;
    let file = buffered.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}
