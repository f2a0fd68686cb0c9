//! Store errors

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`LogStore`](crate::LogStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// The directory is missing, not a directory, or not writable
    #[error("crash log directory unavailable: {}: {source}", path.display())]
    DirectoryUnavailable {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// A file operation on an individual record failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// True for [`StoreError::DirectoryUnavailable`]
    pub fn is_directory_unavailable(&self) -> bool {
        matches!(self, StoreError::DirectoryUnavailable { .. })
    }
}
