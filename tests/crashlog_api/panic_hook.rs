//! Panic Hook Tests
//!
//! The hook is process-global, so everything that touches it lives in one
//! test.

use crate::*;
use std::panic;
use std::thread;

#[test]
fn test_panic_hook_writes_record_and_chains() {
    let (_dir, log) = create_log_with("panic-session", ClearPolicy::Forwarded);
    log.install_panic_hook();

    let result = thread::spawn(|| {
        panic!("worker exploded: {}", 42);
    })
    .join();
    assert!(result.is_err());

    // Restore the default hook for the rest of the binary
    let _ = panic::take_hook();

    let records: Vec<_> = log.records().collect();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.type_name(), "panic");
    assert_eq!(record.message(), "worker exploded: 42");
    assert_eq!(record.session_id, "panic-session");
    assert!(!record.root().frames.is_empty());
}
