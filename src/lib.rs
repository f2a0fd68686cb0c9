//! # crashlog
//!
//! Offline-first crash capture.
//!
//! Failures are written to a local directory the moment they happen, one
//! small JSON file per failure, and forwarded to a telemetry backend later,
//! once the host reports connectivity.
//!
//! ## Quick Start
//!
//! ```no_run
//! use crashlog::prelude::*;
//!
//! # async fn run() -> crashlog::Result<()> {
//! // Open a crash log on an existing directory
//! let log = CrashLog::open("/var/lib/app/crashes")?;
//! log.install_panic_hook();
//!
//! // Capture failures as they happen
//! log.capture(&Failure::new("SyncError", "upload failed"));
//!
//! // Later, when the network is back
//! let coordinator = log.coordinator(AlwaysOnline, TracingSink);
//! let outcome = coordinator.drain().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Components
//!
//! - [`JsonWriter`] - streaming JSON encoder with an omission rule
//! - [`FailureRecord`] - flattened failure with linked cause frames
//! - [`RecordWriter`] - persists one record per file, never fails the caller
//! - [`LogStore`] - enumerates, removes and clears record files
//! - [`DrainCoordinator`] - forwards stored records when online

#![warn(missing_docs)]

mod config;
mod crash_log;
mod error;
mod types;

pub mod prelude;

// Re-export main entry points
pub use crash_log::{CrashLog, CrashLogBuilder};
pub use config::{CrashLogConfig, ProbeConfig};
pub use error::{Error, Result};

// Re-export types
pub use types::*;
