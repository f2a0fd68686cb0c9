//! Encoding and decoding errors

use crashlog_core::RecordError;
use thiserror::Error;

/// Errors raised while writing a document
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The underlying writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A property was written with an empty name
    #[error("property name cannot be empty")]
    EmptyPropertyName,

    /// A named property was written while no object was open
    #[error("property '{0}' written outside of an object")]
    PropertyOutsideObject(String),

    /// A container was closed that is not the innermost open one
    #[error("unbalanced document: expected to close {expected}")]
    Unbalanced {
        /// What the writer expected to close
        expected: &'static str,
    },
}

/// Errors raised while reading a stored record
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not a JSON document of the expected shape
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),

    /// The `timestamp` property is not ISO-8601
    #[error("invalid timestamp '{value}': {source}")]
    Timestamp {
        /// Raw timestamp text
        value: String,
        /// Parser error
        source: chrono::ParseError,
    },

    /// The document parsed but breaks a record invariant
    #[error("invalid record: {0}")]
    Invalid(#[from] RecordError),
}
