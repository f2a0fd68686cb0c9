//! Core types for crashlog
//!
//! This crate defines the data shared by every other crate in the workspace:
//! - [`Failure`]: an owned snapshot of a live failure and its cause chain
//! - [`FailureRecord`]: the flattened, persisted form of one failure
//! - [`StackTrace`]: parsed stack frames captured from a backtrace
//! - [`SessionId`]: the per-run identifier stamped into every record
//!
//! Nothing here touches the file system or the network.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod failure;
pub mod record;
pub mod session;
pub mod stack;

pub use error::RecordError;
pub use failure::{panic_message, Failure, FailureLevel, MAX_CAUSE_DEPTH};
pub use record::{CauseFrame, FailureRecord, StackFrame, FORMAT_VERSION, ROOT_OUTER_ID};
pub use session::SessionId;
pub use stack::StackTrace;
