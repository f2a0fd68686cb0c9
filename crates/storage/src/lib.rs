//! Local persistence for crashlog
//!
//! One record per file, one directory per store:
//! - [`LogStore`]: opens (and probes) the directory, enumerates, removes and
//!   clears record files
//! - [`RecordWriter`]: flattens a [`Failure`](crashlog_core::Failure) and
//!   writes it to a fresh `<uuid>.crashlog` file, never failing the caller
//!
//! There is no index and no in-memory state beyond the directory path; the
//! directory listing is the source of truth.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod store;
pub mod writer;

pub use error::StoreError;
pub use store::{
    Entries, LogStore, Records, Scan, ScanEntry, StoredRecord, CRASHLOG_EXTENSION,
};
pub use writer::RecordWriter;
