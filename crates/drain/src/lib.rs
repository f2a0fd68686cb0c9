//! Draining stored crash records
//!
//! A drain asks a [`ConnectivityProbe`] whether the network is up and, if so,
//! hands every stored record to a [`TelemetrySink`] one at a time, then
//! deletes what was delivered according to a [`ClearPolicy`].
//!
//! Both capabilities are async traits so hosts can plug in their own
//! transport; [`AlwaysOnline`], [`ManualProbe`], [`TcpProbe`] and
//! [`TracingSink`] cover the common cases.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod probe;
pub mod sink;

pub use coordinator::{
    drain, ClearPolicy, DrainCoordinator, DrainLock, DrainOutcome, DrainStats,
};
pub use probe::{AlwaysOnline, ConnectivityProbe, ManualProbe, TcpProbe};
pub use sink::{SinkError, TelemetrySink, TracingSink};
