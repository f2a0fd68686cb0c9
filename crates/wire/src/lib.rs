//! Wire encoding for crashlog
//!
//! This crate turns [`FailureRecord`](crashlog_core::FailureRecord)s into the
//! compact JSON document stored in each `.crashlog` file, and back.
//!
//! The write side is a streaming [`JsonWriter`]: properties go straight to the
//! underlying `io::Write` in call order, nothing is buffered as a tree. The
//! read side leans on `serde_json`.
//!
//! ## Wire Encoding Rules
//!
//! | Rule | Behaviour |
//! |------|-----------|
//! | Omission | empty strings, `None`, empty lists and maps write no key at all |
//! | Ordering | properties appear in the order they are written |
//! | Whitespace | none |
//! | Timestamps | `2024-05-01T12:00:00.0000000+00:00` |
//! | Durations | `[d.]hh:mm:ss[.fffffff]` |
//!
//! ## Examples
//!
//! ```
//! use crashlog_core::{Failure, FailureRecord};
//! use crashlog_wire::{decode_record, encode_record};
//!
//! let record = FailureRecord::from_failure(&Failure::new("Io", "disk full"), "session");
//! let bytes = encode_record(&record, Vec::new()).unwrap();
//! let decoded = decode_record(bytes.as_slice()).unwrap();
//! assert_eq!(decoded, record);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod json;
pub mod record;

// Re-export main types
pub use error::{DecodeError, EncodeError};
pub use json::{encode_string, escape_into, JsonWriter, WriteJson};
pub use record::{decode_record, decode_record_bytes, encode_record, encode_record_to_string};
