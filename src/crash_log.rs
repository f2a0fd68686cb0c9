//! Main entry point for crashlog.
//!
//! This module provides the `CrashLog` struct, which ties a store, a session
//! and a clear policy together.

use crate::config::CrashLogConfig;
use crate::error::{Error, Result};
use crashlog_core::{panic_message, Failure, FailureRecord, SessionId, StackTrace};
use crashlog_drain::{ClearPolicy, ConnectivityProbe, DrainCoordinator, DrainLock, TelemetrySink};
use crashlog_storage::{LogStore, RecordWriter, Records};
use crashlog_wire::decode_record;
use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fs::File;
use std::io::BufReader;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// An opened crash log.
///
/// Create one with [`CrashLog::open`] or [`CrashLog::builder`]. Capturing
/// never fails; opening does, when the directory is unusable.
///
/// # Example
///
/// ```no_run
/// use crashlog::prelude::*;
///
/// # fn run() -> crashlog::Result<()> {
/// let log = CrashLog::open("/var/lib/app/crashes")?;
///
/// let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
/// log.capture_error(&err);
///
/// for record in log.records() {
///     println!("{}: {}", record.type_name(), record.message());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CrashLog {
    store: LogStore,
    writer: RecordWriter,
    session: SessionId,
    clear_policy: ClearPolicy,
    drain_lock: DrainLock,
}

impl CrashLog {
    /// Open a crash log on an existing directory with a fresh session.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().directory(directory).open()
    }

    /// Open a crash log from loaded configuration.
    pub fn from_config(config: &CrashLogConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .directory(config.directory.clone())
            .clear_policy(config.clear_policy);
        if let Some(id) = &config.session_id {
            builder = builder.session(SessionId::from(id.as_str()));
        }
        builder.open()
    }

    /// Create a builder.
    pub fn builder() -> CrashLogBuilder {
        CrashLogBuilder::new()
    }

    /// Session stamped into every record captured through this handle.
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Underlying store.
    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// Directory holding the record files.
    pub fn directory(&self) -> &Path {
        self.store.directory()
    }

    /// Clear policy used by coordinators created from this handle.
    pub fn clear_policy(&self) -> ClearPolicy {
        self.clear_policy
    }

    /// Persist a failure. Returns the record path, or `None` if it was lost.
    pub fn capture(&self, failure: &Failure) -> Option<PathBuf> {
        self.writer.capture(failure, self.session.as_str())
    }

    /// Persist an error and its `source()` chain with the current stack.
    ///
    /// A panicking `Display` impl anywhere in the chain loses the record
    /// instead of unwinding into the caller.
    pub fn capture_error<E: StdError + 'static>(&self, err: &E) -> Option<PathBuf> {
        self.writer.capture_with(
            || Failure::from_error(err).with_stack(StackTrace::capture()),
            self.session.as_str(),
        )
    }

    /// Persist a type-erased error and its `source()` chain.
    pub fn capture_dyn_error(&self, err: &(dyn StdError + 'static)) -> Option<PathBuf> {
        self.writer.capture_with(
            || Failure::from_dyn_error(err).with_stack(StackTrace::capture()),
            self.session.as_str(),
        )
    }

    /// Lazily enumerate every readable stored record.
    pub fn records(&self) -> Records {
        self.store.list()
    }

    /// Read a single record file.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<FailureRecord> {
        let file = File::open(path.as_ref())?;
        decode_record(BufReader::new(file)).map_err(Error::from)
    }

    /// Delete every stored record; returns how many were removed.
    pub fn clear(&self) -> usize {
        self.store.clear()
    }

    /// Coordinator that drains this log into `sink` when `probe` says online.
    ///
    /// Every coordinator created from this handle (or its clones) shares one
    /// [`DrainLock`], so at most one of them is mid-pass at any time.
    pub fn coordinator<P, S>(&self, probe: P, sink: S) -> DrainCoordinator
    where
        P: ConnectivityProbe + 'static,
        S: TelemetrySink + 'static,
    {
        DrainCoordinator::with_lock(
            Arc::new(probe),
            Arc::new(sink),
            self.store.clone(),
            self.clear_policy,
            self.drain_lock.clone(),
        )
    }

    /// Record every panic before handing it to the previously installed hook.
    ///
    /// The hook owns its own writer and session; dropping this handle does
    /// not uninstall it.
    ///
    /// Best effort only: a panic raised while the hook itself is capturing
    /// is a panic inside a panic, and the runtime aborts the process before
    /// any guard can catch it.
    pub fn install_panic_hook(&self) {
        let writer = self.writer.clone();
        let session = self.session.clone();
        let previous = panic::take_hook();

        panic::set_hook(Box::new(move |info| {
            let message = panic_message(info.payload());
            let location = info.location().map(|l| (l.file(), l.line()));
            let backtrace = Backtrace::force_capture();
            let failure = Failure::from_panic(message, location, &backtrace);
            writer.capture(&failure, session.as_str());
            previous(info);
        }));

        info!("Installed crash log panic hook for {}", self.directory().display());
    }
}

/// Builder for a [`CrashLog`].
///
/// # Example
///
/// ```no_run
/// use crashlog::{ClearPolicy, CrashLog, SessionId};
///
/// # fn run() -> crashlog::Result<()> {
/// let log = CrashLog::builder()
///     .directory("/var/lib/app/crashes")
///     .session(SessionId::from("run-42"))
///     .clear_policy(ClearPolicy::All)
///     .open()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CrashLogBuilder {
    directory: Option<PathBuf>,
    session: Option<SessionId>,
    clear_policy: ClearPolicy,
}

impl CrashLogBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record directory. Required.
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Use a fixed session id instead of a random one.
    pub fn session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the clear policy (default: [`ClearPolicy::Forwarded`]).
    pub fn clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    /// Open the crash log, probing the directory for writability.
    pub fn open(self) -> Result<CrashLog> {
        let directory = self
            .directory
            .ok_or_else(|| Error::Config("directory not set".into()))?;
        let store = LogStore::open(directory)?;

        Ok(CrashLog {
            writer: store.writer(),
            store,
            session: self.session.unwrap_or_default(),
            clear_policy: self.clear_policy,
            drain_lock: DrainLock::new(),
        })
    }
}
