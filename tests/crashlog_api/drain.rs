//! Drain Tests
//!
//! Coordinator behaviour against the facade.

use crate::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

/// Collects delivered records; rejects messages containing "poison"
#[derive(Default)]
struct CollectingSink {
    delivered: Mutex<Vec<FailureRecord>>,
}

impl CollectingSink {
    fn messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .delivered
            .lock()
            .iter()
            .map(|r| r.message().to_string())
            .collect();
        messages.sort();
        messages
    }
}

#[async_trait]
impl TelemetrySink for CollectingSink {
    async fn report(&self, record: &FailureRecord) -> std::result::Result<(), SinkError> {
        if record.message().contains("poison") {
            return Err(SinkError::Rejected("poison".into()));
        }
        self.delivered.lock().push(record.clone());
        Ok(())
    }
}

/// Fails every delivery with a transport error
struct DownSink;

#[async_trait]
impl TelemetrySink for DownSink {
    async fn report(&self, _record: &FailureRecord) -> std::result::Result<(), SinkError> {
        Err(SinkError::Transport(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "backend down",
        ))))
    }
}

/// Holds the first delivery until released
struct SlowSink {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl TelemetrySink for SlowSink {
    async fn report(&self, _record: &FailureRecord) -> std::result::Result<(), SinkError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

// =============================================================================
// CONNECTIVITY
// =============================================================================

#[tokio::test]
async fn test_drain_offline_does_nothing() {
    let (dir, log) = create_log();
    log.capture(&Failure::new("E", "a"));
    let sink = Arc::new(CollectingSink::default());

    let coordinator = log.coordinator(ManualProbe::new(false), sink.clone());
    assert_eq!(coordinator.drain().await, DrainOutcome::Offline);

    assert!(sink.messages().is_empty());
    assert_eq!(file_names(dir.path()).len(), 1);
}

#[tokio::test]
async fn test_drain_after_coming_online() {
    let (_dir, log) = create_log();
    log.capture(&Failure::new("E", "queued"));
    let probe = Arc::new(ManualProbe::new(false));
    let sink = Arc::new(CollectingSink::default());
    let coordinator = log.coordinator(probe.clone(), sink.clone());

    assert_eq!(coordinator.drain().await, DrainOutcome::Offline);
    probe.set_online(true);
    assert!(matches!(coordinator.drain().await, DrainOutcome::Completed(_)));

    assert_eq!(sink.messages(), vec!["queued"]);
    assert_eq!(log.records().count(), 0);
}

// =============================================================================
// FORWARD AND CLEAR
// =============================================================================

#[tokio::test]
async fn test_drain_forwards_and_clears() {
    let (dir, log) = create_log_with("drain-session", ClearPolicy::Forwarded);
    log.capture(&Failure::new("E", "one"));
    log.capture(&Failure::new("E", "two"));
    let sink = Arc::new(CollectingSink::default());

    let outcome = log.coordinator(AlwaysOnline, sink.clone()).drain().await;

    let stats = outcome.stats().unwrap();
    assert_eq!((stats.forwarded, stats.failed, stats.removed), (2, 0, 2));
    assert_eq!(sink.messages(), vec!["one", "two"]);
    assert!(sink
        .delivered
        .lock()
        .iter()
        .all(|r| r.session_id == "drain-session"));
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_rejected_record_survives_forwarded_drain() {
    let (_dir, log) = create_log_with("s", ClearPolicy::Forwarded);
    log.capture(&Failure::new("E", "fine"));
    log.capture(&Failure::new("E", "poison pill"));
    let sink = Arc::new(CollectingSink::default());
    let coordinator = log.coordinator(AlwaysOnline, sink.clone());

    let stats = coordinator.drain().await.stats().unwrap();
    assert_eq!((stats.forwarded, stats.failed, stats.removed), (1, 1, 1));
    assert_eq!(stored_messages(&log), vec!["poison pill"]);

    // Still there on the next pass
    let stats = coordinator.drain().await.stats().unwrap();
    assert_eq!((stats.forwarded, stats.failed), (0, 1));
    assert_eq!(stored_messages(&log), vec!["poison pill"]);
}

#[tokio::test]
async fn test_rejected_record_dropped_by_all_drain() {
    let (dir, log) = create_log_with("s", ClearPolicy::All);
    log.capture(&Failure::new("E", "fine"));
    log.capture(&Failure::new("E", "poison pill"));
    let sink = Arc::new(CollectingSink::default());

    let stats = log
        .coordinator(AlwaysOnline, sink.clone())
        .drain()
        .await
        .stats()
        .unwrap();

    assert_eq!((stats.forwarded, stats.failed, stats.removed), (1, 1, 2));
    assert_eq!(sink.messages(), vec!["fine"]);
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_transport_failure_keeps_everything() {
    let (_dir, log) = create_log();
    log.capture(&Failure::new("E", "a"));
    log.capture(&Failure::new("E", "b"));

    let stats = log.coordinator(AlwaysOnline, DownSink).drain().await.stats().unwrap();

    assert_eq!((stats.forwarded, stats.failed, stats.removed), (0, 2, 0));
    assert_eq!(log.records().count(), 2);
}

#[tokio::test]
async fn test_corrupt_files_are_dropped_not_forwarded() {
    let (dir, log) = create_log();
    log.capture(&Failure::new("E", "real"));
    std::fs::write(dir.path().join("junk.crashlog"), b"{").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"keep").unwrap();
    let sink = Arc::new(CollectingSink::default());

    let stats = log.coordinator(AlwaysOnline, sink.clone()).drain().await.stats().unwrap();

    assert_eq!(stats.forwarded, 1);
    assert_eq!(stats.corrupt, 1);
    assert_eq!(stats.removed, 2);
    assert_eq!(sink.messages(), vec!["real"]);
    assert_eq!(file_names(dir.path()), vec!["notes.txt"]);
}

#[tokio::test]
async fn test_tracing_sink_drain() {
    let (_dir, log) = create_log();
    log.capture(&Failure::new("E", "logged"));

    let stats = log.coordinator(AlwaysOnline, TracingSink).drain().await.stats().unwrap();
    assert_eq!(stats.forwarded, 1);
    assert!(log.store().is_empty());
}

// =============================================================================
// REENTRANCY
// =============================================================================

#[tokio::test]
async fn test_second_concurrent_drain_is_refused() {
    let (_dir, log) = create_log();
    log.capture(&Failure::new("E", "slow"));
    let sink = Arc::new(SlowSink {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let coordinator = log.coordinator(AlwaysOnline, sink.clone());

    let first = coordinator.trigger().expect("first trigger should spawn");
    sink.entered.notified().await;

    assert!(coordinator.trigger().is_none());
    assert_eq!(coordinator.clone().drain().await, DrainOutcome::AlreadyRunning);

    sink.release.notify_one();
    let outcome = first.await.unwrap();
    assert_eq!(outcome.stats().unwrap().forwarded, 1);
    assert_eq!(coordinator.last_outcome(), Some(outcome));
    assert!(log.store().is_empty());
}

#[tokio::test]
async fn test_coordinators_from_one_log_do_not_overlap() {
    let (_dir, log) = create_log();
    log.capture(&Failure::new("E", "only"));
    let slow = Arc::new(SlowSink {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let collecting = Arc::new(CollectingSink::default());

    let first = log.coordinator(AlwaysOnline, slow.clone());
    let second = log.clone().coordinator(AlwaysOnline, collecting.clone());

    let handle = first.trigger().expect("first trigger should spawn");
    slow.entered.notified().await;

    assert!(second.is_running());
    assert!(second.trigger().is_none());
    assert_eq!(second.drain().await, DrainOutcome::AlreadyRunning);

    slow.release.notify_one();
    assert_eq!(handle.await.unwrap().stats().unwrap().forwarded, 1);

    let stats = second.drain().await.stats().unwrap();
    assert_eq!(stats.forwarded, 0);
    assert!(collecting.messages().is_empty());
    assert!(log.store().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_triggers_run_one_pass_at_a_time() {
    let (_dir, log) = create_log();
    for i in 0..20 {
        log.capture(&Failure::new("E", format!("r{}", i)));
    }
    let sink = Arc::new(CollectingSink::default());
    let coordinator = log.coordinator(AlwaysOnline, sink.clone());

    let handles: Vec<_> = (0..10).filter_map(|_| coordinator.trigger()).collect();
    assert!(!handles.is_empty());
    for handle in handles {
        handle.await.unwrap();
    }

    // Every record delivered exactly once
    let messages = sink.messages();
    let mut unique = messages.clone();
    unique.dedup();
    assert_eq!(messages.len(), 20);
    assert_eq!(unique.len(), 20);
    assert!(log.store().is_empty());
}
