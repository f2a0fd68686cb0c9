//! Convenient imports for crashlog.
//!
//! ```no_run
//! use crashlog::prelude::*;
//!
//! # fn run() -> crashlog::Result<()> {
//! let log = CrashLog::open("/var/lib/app/crashes")?;
//! log.capture(&Failure::new("E", "boom"));
//! # Ok(())
//! # }
//! ```

// Main entry point
pub use crate::crash_log::{CrashLog, CrashLogBuilder};
pub use crate::config::CrashLogConfig;

// Error handling
pub use crate::error::{Error, Result};

// Failure model
pub use crate::types::{Failure, FailureRecord, SessionId, StackTrace};

// Draining
pub use crate::types::{
    AlwaysOnline, ClearPolicy, ConnectivityProbe, DrainCoordinator, DrainOutcome, ManualProbe,
    SinkError, TcpProbe, TelemetrySink, TracingSink,
};
