//! Public types for the crashlog facade.
//!
//! This module re-exports types from the workspace crates.

// Failure model
pub use crashlog_core::{
    panic_message, CauseFrame, Failure, FailureLevel, FailureRecord, RecordError, SessionId,
    StackFrame, StackTrace, FORMAT_VERSION, MAX_CAUSE_DEPTH, ROOT_OUTER_ID,
};

// Wire encoding
pub use crashlog_wire::{
    decode_record, decode_record_bytes, encode_record, encode_record_to_string, encode_string,
    DecodeError, EncodeError, JsonWriter, WriteJson,
};

// Storage
pub use crashlog_storage::{
    Entries, LogStore, RecordWriter, Records, Scan, ScanEntry, StoreError, StoredRecord,
    CRASHLOG_EXTENSION,
};

// Draining
pub use crashlog_drain::{
    drain, AlwaysOnline, ClearPolicy, ConnectivityProbe, DrainCoordinator, DrainLock,
    DrainOutcome, DrainStats, ManualProbe, SinkError, TcpProbe, TelemetrySink, TracingSink,
};
