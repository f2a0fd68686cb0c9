//! Capture Tests
//!
//! Round trip from a live failure to a decoded record.

use crate::*;
use std::fmt;
use std::sync::Arc;
use std::thread;

#[derive(Debug)]
struct WrapError {
    context: &'static str,
    source: std::io::Error,
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "while {}", self.context)
    }
}

impl std::error::Error for WrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

// =============================================================================
// ROUND TRIP
// =============================================================================

#[test]
fn test_single_failure_round_trip() {
    let (_dir, log) = create_log();

    let stack = StackTrace::parse("   0: app::sync::upload\n             at src/sync.rs:40:9\n", true);
    let failure = Failure::new("SyncError", "upload failed").with_stack(stack);
    let path = log.capture(&failure).unwrap();

    let records: Vec<_> = log.records().collect();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.format_version, 2);
    assert_eq!(record.causes.len(), 1);
    assert_eq!(record.root().id, 0);
    assert_eq!(record.root().outer_id, -1);
    assert_eq!(record.type_name(), "SyncError");
    assert_eq!(record.message(), "upload failed");
    assert!(record.root().has_full_stack);
    assert_eq!(record.root().frames[0].method, "app::sync::upload");
    assert_eq!(record.root().frames[0].line, 40);

    assert_eq!(log.read(&path).unwrap(), *record);
}

#[test]
fn test_error_chain_round_trip() {
    let (_dir, log) = create_log();

    let err = WrapError {
        context: "loading settings",
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "settings.toml missing"),
    };
    log.capture_error(&err).unwrap();

    let record = log.records().next().unwrap();
    assert_eq!(record.causes.len(), 2);
    assert!(record.type_name().ends_with("WrapError"));
    assert_eq!(record.message(), "while loading settings");
    assert_eq!(record.causes[1].outer_id, 0);
    assert_eq!(record.causes[1].message, "settings.toml missing");
    assert_eq!(record.path_to_root(1), vec![1, 0]);
}

#[test]
fn test_file_naming() {
    let (dir, log) = create_log();
    let path = log.capture(&Failure::new("E", "m")).unwrap();

    let names = file_names(dir.path());
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(&format!(".{}", CRASHLOG_EXTENSION)));
    assert_eq!(path.file_name().unwrap().to_string_lossy(), names[0]);
}

#[test]
fn test_stored_json_omits_empty_parsed_stack() {
    let (_dir, log) = create_log();
    let path = log.capture(&Failure::new("E", "nostack")).unwrap();

    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.starts_with(r#"{"ver":2,"exceptions":[{"id":0,"outerId":-1,"typeName":"E""#));
    assert!(!text.contains("parsedStack"));
    assert!(!text.contains(char::is_whitespace));
}

// =============================================================================
// SESSION STAMPING
// =============================================================================

#[test]
fn test_session_stamping() {
    let (_dir, log) = create_log_with("session-abc", ClearPolicy::Forwarded);

    log.capture(&Failure::new("A", "1"));
    log.capture(&Failure::new("B", "2"));

    let sessions: Vec<_> = log.records().map(|r| r.session_id).collect();
    assert_eq!(sessions, vec!["session-abc", "session-abc"]);
}

#[test]
fn test_default_session_is_shared_by_captures() {
    let (_dir, log) = create_log();
    log.capture(&Failure::new("A", "1"));
    log.capture(&Failure::new("B", "2"));

    for record in log.records() {
        assert_eq!(record.session_id, log.session().as_str());
    }
}

#[test]
fn test_two_logs_have_distinct_sessions() {
    let (dir, a) = create_log();
    let b = CrashLog::open(dir.path()).unwrap();
    assert_ne!(a.session(), b.session());
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_concurrent_capture_yields_distinct_valid_files() {
    let (dir, log) = create_log();
    let log = Arc::new(log);
    let threads = 8;
    let per_thread = 25;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let failure = Failure::new("Concurrent", format!("t{}-{}", t, i));
                    assert!(log.capture(&failure).is_some());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(file_names(dir.path()).len(), threads * per_thread);
    for name in file_names(dir.path()) {
        let bytes = std::fs::read(dir.path().join(name)).unwrap();
        assert!(decode_record_bytes(&bytes).is_ok());
    }

    let mut messages = stored_messages(&log);
    messages.dedup();
    assert_eq!(messages.len(), threads * per_thread);
}

// =============================================================================
// CAPTURE NEVER FAILS
// =============================================================================

#[test]
fn test_capture_after_directory_removed_returns_none() {
    let (dir, _) = create_log();
    let sub = dir.path().join("logs");
    std::fs::create_dir(&sub).unwrap();
    let log = CrashLog::open(&sub).unwrap();
    std::fs::remove_dir(&sub).unwrap();

    assert!(log.capture(&Failure::new("E", "lost")).is_none());
    assert_eq!(log.records().count(), 0);
}
