//! Drain coordinator
//!
//! One drain pass:
//!
//! 1. ask the probe; offline means nothing is read or deleted
//! 2. walk the store, awaiting the sink for each record before reading the next
//! 3. delete according to the [`ClearPolicy`]
//!
//! Coordinators sharing a [`DrainLock`] run at most one pass between them; a
//! trigger that arrives while a pass is in flight is ignored.
//!
//! File reads, decodes and deletes run on tokio's blocking pool, one file per
//! task, so a pass never stalls a runtime worker on disk I/O.

use crate::probe::ConnectivityProbe;
use crate::sink::TelemetrySink;
use crashlog_storage::{LogStore, Scan, ScanEntry};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

/// What to delete after a drain pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearPolicy {
    /// Delete each record as soon as the sink accepts it; rejected records
    /// stay for the next pass
    #[default]
    Forwarded,
    /// Delete every record file once the pass is over, delivered or not
    All,
}

/// Counters for one completed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainStats {
    /// Records the sink accepted
    pub forwarded: usize,
    /// Records the sink refused or could not receive
    pub failed: usize,
    /// Record files deleted, corrupt ones included
    pub removed: usize,
    /// Files that could not be decoded
    pub corrupt: usize,
}

/// Result of asking for a drain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The probe reported no connectivity; the store was not touched
    Offline,
    /// Another pass was already running under the same lock
    AlreadyRunning,
    /// The pass ran to the end
    Completed(DrainStats),
}

impl DrainOutcome {
    /// Stats of a completed pass
    pub fn stats(&self) -> Option<DrainStats> {
        match self {
            DrainOutcome::Completed(stats) => Some(*stats),
            _ => None,
        }
    }
}

/// Run one drain pass over `store`.
///
/// Under [`ClearPolicy::Forwarded`] a file that does not decode is deleted
/// too, since no later pass could deliver it. Files that vanish or cannot be
/// opened are left alone.
///
/// Must run inside a tokio runtime. No reentrancy guard here;
/// [`DrainCoordinator`] adds one.
pub async fn drain<P, S>(probe: &P, sink: &S, store: &LogStore, policy: ClearPolicy) -> DrainOutcome
where
    P: ConnectivityProbe + ?Sized,
    S: TelemetrySink + ?Sized,
{
    if !probe.is_online().await {
        debug!("Offline, leaving crash records in {}", store.directory().display());
        return DrainOutcome::Offline;
    }

    let mut stats = DrainStats::default();
    let mut scan = store.scan();

    loop {
        let entry = match next_entry(scan).await {
            Some((rest, Some(entry))) => {
                scan = rest;
                entry
            }
            _ => break,
        };

        match entry {
            ScanEntry::Record(stored) => match sink.report(&stored.record).await {
                Ok(()) => {
                    stats.forwarded += 1;
                    if policy == ClearPolicy::Forwarded && remove(store, stored.path).await {
                        stats.removed += 1;
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    warn!("Sink did not accept {}: {}", stored.path.display(), e);
                }
            },
            ScanEntry::Corrupt(path) => {
                stats.corrupt += 1;
                if policy == ClearPolicy::Forwarded && remove(store, path).await {
                    stats.removed += 1;
                }
            }
        }
    }

    if policy == ClearPolicy::All {
        let store = store.clone();
        match task::spawn_blocking(move || store.clear()).await {
            Ok(removed) => stats.removed = removed,
            Err(e) => warn!("Clear task failed: {}", e),
        }
    }

    info!(
        "Drain complete: {} forwarded, {} failed, {} corrupt, {} removed",
        stats.forwarded, stats.failed, stats.corrupt, stats.removed
    );
    DrainOutcome::Completed(stats)
}

/// Read the next file off the blocking pool; `None` if the task died
async fn next_entry(mut scan: Scan) -> Option<(Scan, Option<ScanEntry>)> {
    match task::spawn_blocking(move || {
        let entry = scan.next();
        (scan, entry)
    })
    .await
    {
        Ok(step) => Some(step),
        Err(e) => {
            warn!("Scan task failed, ending drain early: {}", e);
            None
        }
    }
}

/// Delete one file off the blocking pool; true if it was removed
async fn remove(store: &LogStore, path: PathBuf) -> bool {
    let store = store.clone();
    let removed = task::spawn_blocking(move || match store.remove_path(&path) {
        Ok(removed) => removed,
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            false
        }
    })
    .await;

    match removed {
        Ok(removed) => removed,
        Err(e) => {
            warn!("Remove task failed: {}", e);
            false
        }
    }
}

/// Running flag shared by every coordinator that drains the same records.
///
/// Clones share the flag. [`DrainCoordinator::new`] creates a private one;
/// pass one lock to [`DrainCoordinator::with_lock`] to serialize several
/// coordinators.
#[derive(Debug, Clone, Default)]
pub struct DrainLock {
    running: Arc<AtomicBool>,
}

impl DrainLock {
    /// A fresh, unheld lock
    pub fn new() -> Self {
        Self::default()
    }

    /// True while some coordinator holding this lock is mid-pass
    pub fn is_held(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

struct Inner {
    probe: Arc<dyn ConnectivityProbe>,
    sink: Arc<dyn TelemetrySink>,
    store: LogStore,
    policy: ClearPolicy,
    lock: DrainLock,
    last_outcome: Mutex<Option<DrainOutcome>>,
}

/// Clears the running flag when a pass ends, however it ends
struct RunningGuard {
    inner: Arc<Inner>,
}

impl RunningGuard {
    fn acquire(inner: &Arc<Inner>) -> Option<Self> {
        inner
            .lock
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningGuard {
                inner: Arc::clone(inner),
            })
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.inner.lock.running.store(false, Ordering::Release);
    }
}

/// Owns a probe, a sink and a store, and serializes drain passes over them.
///
/// Cloning shares the same [`DrainLock`].
///
/// # Example
///
/// ```no_run
/// use crashlog_drain::{AlwaysOnline, ClearPolicy, DrainCoordinator, TracingSink};
/// use crashlog_storage::{LogStore, Scan, ScanEntry};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LogStore::open("/var/lib/app/crashes")?;
/// let coordinator = DrainCoordinator::new(AlwaysOnline, TracingSink, store, ClearPolicy::Forwarded);
/// let outcome = coordinator.drain().await;
/// println!("{:?}", outcome);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DrainCoordinator {
    inner: Arc<Inner>,
}

impl DrainCoordinator {
    /// Create a coordinator
    pub fn new<P, S>(probe: P, sink: S, store: LogStore, policy: ClearPolicy) -> Self
    where
        P: ConnectivityProbe + 'static,
        S: TelemetrySink + 'static,
    {
        Self::from_shared(Arc::new(probe), Arc::new(sink), store, policy)
    }

    /// Create a coordinator from already shared capabilities
    pub fn from_shared(
        probe: Arc<dyn ConnectivityProbe>,
        sink: Arc<dyn TelemetrySink>,
        store: LogStore,
        policy: ClearPolicy,
    ) -> Self {
        Self::with_lock(probe, sink, store, policy, DrainLock::new())
    }

    /// Create a coordinator that refuses to start while any other holder of
    /// `lock` is mid-pass
    pub fn with_lock(
        probe: Arc<dyn ConnectivityProbe>,
        sink: Arc<dyn TelemetrySink>,
        store: LogStore,
        policy: ClearPolicy,
        lock: DrainLock,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                probe,
                sink,
                store,
                policy,
                lock,
                last_outcome: Mutex::new(None),
            }),
        }
    }

    /// Store being drained
    pub fn store(&self) -> &LogStore {
        &self.inner.store
    }

    /// Clear policy in effect
    pub fn policy(&self) -> ClearPolicy {
        self.inner.policy
    }

    /// Lock this coordinator runs under
    pub fn lock(&self) -> &DrainLock {
        &self.inner.lock
    }

    /// True while a pass is in flight under this coordinator's lock
    pub fn is_running(&self) -> bool {
        self.inner.lock.is_held()
    }

    /// Outcome of the most recent pass that was allowed to start
    pub fn last_outcome(&self) -> Option<DrainOutcome> {
        *self.inner.last_outcome.lock()
    }

    /// Run a pass now, or return [`DrainOutcome::AlreadyRunning`]
    pub async fn drain(&self) -> DrainOutcome {
        match RunningGuard::acquire(&self.inner) {
            Some(guard) => Self::run(guard).await,
            None => {
                debug!("Drain already in progress, ignoring trigger");
                DrainOutcome::AlreadyRunning
            }
        }
    }

    /// Start a pass in the background on the current tokio runtime.
    ///
    /// Returns `None` without spawning if a pass is already running or no
    /// runtime is available.
    pub fn trigger(&self) -> Option<JoinHandle<DrainOutcome>> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                debug!("Cannot trigger drain outside a tokio runtime: {}", e);
                return None;
            }
        };

        match RunningGuard::acquire(&self.inner) {
            Some(guard) => Some(handle.spawn(Self::run(guard))),
            None => {
                debug!("Drain already in progress, ignoring trigger");
                None
            }
        }
    }

    async fn run(guard: RunningGuard) -> DrainOutcome {
        let inner = &guard.inner;
        let outcome = drain(
            inner.probe.as_ref(),
            inner.sink.as_ref(),
            &inner.store,
            inner.policy,
        )
        .await;
        *inner.last_outcome.lock() = Some(outcome);
        outcome
    }
}
