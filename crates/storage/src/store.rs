//! Directory-backed record store
//!
//! ## Layout
//!
//! ```text
//! <dir>/
//!   3f2b...e1.crashlog    one record, one compact JSON document
//!   9a07...4c.crashlog
//!   notes.txt             ignored
//! ```
//!
//! Enumeration re-reads the directory every time and tolerates files that
//! appear or disappear mid-scan, so several stores (or processes) can share
//! one directory.

use crate::error::StoreError;
use crate::writer::RecordWriter;
use crashlog_core::FailureRecord;
use crashlog_wire::decode_record;
use std::fs::{self, File, OpenOptions, ReadDir};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// File extension of record files
pub const CRASHLOG_EXTENSION: &str = "crashlog";

/// Prefix of the writability probe; never carries the record extension
const PROBE_PREFIX: &str = ".probe-";

/// Handle on one crash log directory.
///
/// Cheap to clone; holds nothing but the path.
#[derive(Debug, Clone)]
pub struct LogStore {
    dir: PathBuf,
}

/// A decoded record and the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// Path of the record file
    pub path: PathBuf,
    /// Decoded contents
    pub record: FailureRecord,
}

/// One record file seen by [`LogStore::scan`]
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEntry {
    /// The file decoded
    Record(StoredRecord),
    /// The file was read but is not a valid record
    Corrupt(PathBuf),
}

impl LogStore {
    /// Open a store on an existing, writable directory.
    ///
    /// Writes and deletes a probe file to prove writability. On failure no
    /// file is left behind.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();

        let unavailable = |source: io::Error| StoreError::DirectoryUnavailable {
            path: dir.clone(),
            source,
        };

        let meta = fs::metadata(&dir).map_err(unavailable)?;
        if !meta.is_dir() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::Other,
                "not a directory",
            )));
        }
        probe(&dir).map_err(unavailable)?;

        debug!("Opened crash log store at {}", dir.display());
        Ok(Self { dir })
    }

    /// Directory this store reads and writes
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// A writer that persists new records into this store
    pub fn writer(&self) -> RecordWriter {
        RecordWriter::new(self.dir.clone())
    }

    /// Lazily enumerate every readable record.
    ///
    /// Each call starts a fresh scan. Unreadable and corrupt files are
    /// skipped and logged.
    pub fn list(&self) -> Records {
        Records {
            inner: self.entries(),
        }
    }

    /// Like [`list`](Self::list) but keeps each record's file path
    pub fn entries(&self) -> Entries {
        Entries { scan: self.scan() }
    }

    /// Lazily walk every record file, reporting corrupt ones instead of
    /// skipping them.
    ///
    /// Files that vanish or cannot be opened are still skipped; they may
    /// belong to another reader.
    pub fn scan(&self) -> Scan {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => Some(read_dir),
            Err(e) => {
                debug!("Cannot enumerate {}: {}", self.dir.display(), e);
                None
            }
        };
        Scan { read_dir }
    }

    /// Delete one record file.
    ///
    /// Returns `Ok(false)` if the file was already gone.
    pub fn remove(&self, entry: &StoredRecord) -> Result<bool, StoreError> {
        self.remove_path(&entry.path)
    }

    /// Delete one record file by path; see [`remove`](Self::remove)
    pub fn remove_path(&self, path: &Path) -> Result<bool, StoreError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Delete every record file and return how many were removed.
    ///
    /// Not transactional: a file that cannot be removed is logged and
    /// skipped.
    pub fn clear(&self) -> usize {
        let mut removed = 0;
        for path in self.record_paths() {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        if removed > 0 {
            info!("Cleared {} crash records from {}", removed, self.dir.display());
        }
        removed
    }

    /// Number of record files, without decoding them
    pub fn len(&self) -> usize {
        self.record_paths().count()
    }

    /// True when the directory holds no record files
    pub fn is_empty(&self) -> bool {
        self.record_paths().next().is_none()
    }

    fn record_paths(&self) -> impl Iterator<Item = PathBuf> {
        fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_record_file(path))
    }
}

/// Iterator over decoded records, see [`LogStore::list`]
pub struct Records {
    inner: Entries,
}

impl Iterator for Records {
    type Item = FailureRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| entry.record)
    }
}

/// Iterator over decoded records with their paths, see [`LogStore::entries`]
pub struct Entries {
    scan: Scan,
}

impl Iterator for Entries {
    type Item = StoredRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan.find_map(|entry| match entry {
            ScanEntry::Record(stored) => Some(stored),
            ScanEntry::Corrupt(_) => None,
        })
    }
}

/// Iterator over record files, see [`LogStore::scan`]
pub struct Scan {
    read_dir: Option<ReadDir>,
}

impl Iterator for Scan {
    type Item = ScanEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let read_dir = self.read_dir.as_mut()?;

        for entry in read_dir.by_ref() {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    debug!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if !is_record_file(&path) {
                continue;
            }
            match read_record(&path) {
                ReadOutcome::Record(record) => {
                    return Some(ScanEntry::Record(StoredRecord { path, record }))
                }
                ReadOutcome::Corrupt => return Some(ScanEntry::Corrupt(path)),
                ReadOutcome::Unreadable => {}
            }
        }

        self.read_dir = None;
        None
    }
}

enum ReadOutcome {
    Record(FailureRecord),
    Corrupt,
    Unreadable,
}

/// Open, decode and close one record file
fn read_record(path: &Path) -> ReadOutcome {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Record {} vanished before it was read", path.display());
            return ReadOutcome::Unreadable;
        }
        Err(e) => {
            warn!("Cannot open crash record {}: {}", path.display(), e);
            return ReadOutcome::Unreadable;
        }
    };

    match decode_record(BufReader::new(file)) {
        Ok(record) => ReadOutcome::Record(record),
        Err(e) => {
            warn!("Corrupt crash record {}: {}", path.display(), e);
            ReadOutcome::Corrupt
        }
    }
}

fn is_record_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == CRASHLOG_EXTENSION) && path.is_file()
}

/// Write and delete a throwaway file in `dir`
fn probe(dir: &Path) -> io::Result<()> {
    let path = dir.join(format!("{}{}", PROBE_PREFIX, Uuid::new_v4()));
    let written = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .and_then(|mut file| file.write_all(b"test"));

    match written {
        Ok(()) => fs::remove_file(&path),
        Err(e) => {
            let _ = fs::remove_file(&path);
            Err(e)
        }
    }
}
