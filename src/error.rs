//! Unified error type for crashlog.
//!
//! Each crate has its own error enum; this one folds them into a single type
//! for hosts that only talk to the facade.

use crashlog_storage::StoreError;
use crashlog_wire::DecodeError;
use std::path::PathBuf;
use thiserror::Error;

/// All crashlog errors.
///
/// Capture never returns one of these; they come from opening a store,
/// loading configuration, or reading records explicitly.
#[derive(Debug, Error)]
pub enum Error {
    /// The crash log directory is missing or not writable
    #[error("crash log directory unavailable: {}: {source}", path.display())]
    DirectoryUnavailable {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying failure
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A record file could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Result type for crashlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a construction failure on the directory.
    pub fn is_directory_unavailable(&self) -> bool {
        matches!(self, Error::DirectoryUnavailable { .. })
    }

    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

// Convert from store errors
impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DirectoryUnavailable { path, source } => {
                Error::DirectoryUnavailable { path, source }
            }
            StoreError::Io(io_err) => Error::Io(io_err),
        }
    }
}

// Convert from TOML parse errors
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
