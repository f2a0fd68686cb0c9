//! Store Tests
//!
//! Construction, enumeration, corrupt-file tolerance and clearing.

use crate::*;
use std::fs;

// =============================================================================
// CONSTRUCTION
// =============================================================================

#[test]
fn test_construction_failure_creates_no_files() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing");

    let err = CrashLog::open(&missing).unwrap_err();

    assert!(err.is_directory_unavailable());
    assert!(!missing.exists());
    assert!(file_names(temp_dir.path()).is_empty());
}

#[test]
fn test_construction_on_file_fails() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("file");
    fs::write(&file, b"").unwrap();

    assert!(CrashLog::open(&file).unwrap_err().is_directory_unavailable());
    assert_eq!(file_names(temp_dir.path()), vec!["file"]);
}

#[test]
fn test_successful_open_leaves_no_probe_file() {
    let (dir, _log) = create_log();
    assert!(file_names(dir.path()).is_empty());
}

// =============================================================================
// ENUMERATION
// =============================================================================

#[test]
fn test_empty_log_lists_nothing() {
    let (_dir, log) = create_log();
    assert_eq!(log.records().count(), 0);
    assert!(log.store().is_empty());
}

#[test]
fn test_corrupt_file_tolerance() {
    let (dir, log) = create_log();
    log.capture(&Failure::new("E", "good one"));
    log.capture(&Failure::new("E", "good two"));

    fs::write(dir.path().join("truncated.crashlog"), br#"{"ver":2,"exceptions":[{"id":0"#).unwrap();
    fs::write(dir.path().join("broken.crashlog"), br#"{"ver":2,"exceptions":[],"timestamp":"2024-01-01T00:00:00Z"}"#).unwrap();
    fs::write(dir.path().join("readme.md"), b"not a record").unwrap();

    assert_eq!(stored_messages(&log), vec!["good one", "good two"]);
    // Files are untouched by enumeration
    assert_eq!(file_names(dir.path()).len(), 5);
}

#[test]
fn test_enumeration_sees_writes_from_other_handles() {
    let (dir, a) = create_log();
    let b = CrashLog::open(dir.path()).unwrap();

    a.capture(&Failure::new("E", "from a"));
    b.capture(&Failure::new("E", "from b"));

    assert_eq!(stored_messages(&a), vec!["from a", "from b"]);
    assert_eq!(stored_messages(&b), vec!["from a", "from b"]);
}

#[test]
fn test_records_iterator_is_lazy_and_finite() {
    let (_dir, log) = create_log();
    for i in 0..5 {
        log.capture(&Failure::new("E", format!("{}", i)));
    }

    let mut records = log.records();
    assert!(records.next().is_some());
    assert_eq!(records.count(), 4);
    assert_eq!(log.records().count(), 5);
}

// =============================================================================
// CLEARING
// =============================================================================

#[test]
fn test_clearing() {
    let (dir, log) = create_log();
    log.capture(&Failure::new("E", "a"));
    log.capture(&Failure::new("E", "b"));
    fs::write(dir.path().join("corrupt.crashlog"), b"???").unwrap();
    fs::write(dir.path().join("other.txt"), b"stay").unwrap();

    assert_eq!(log.clear(), 3);
    assert_eq!(log.records().count(), 0);
    assert_eq!(file_names(dir.path()), vec!["other.txt"]);
}

#[test]
fn test_capture_after_clear() {
    let (_dir, log) = create_log();
    log.capture(&Failure::new("E", "old"));
    log.clear();
    log.capture(&Failure::new("E", "new"));

    assert_eq!(stored_messages(&log), vec!["new"]);
}
