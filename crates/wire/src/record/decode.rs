//! Record decoding

use crate::error::DecodeError;
use chrono::{DateTime, Utc};
use crashlog_core::{CauseFrame, FailureRecord, StackFrame};
use serde::Deserialize;
use std::io::Read;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    ver: i32,
    exceptions: Vec<WireCause>,
    timestamp: String,
    #[serde(default)]
    session_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCause {
    id: i32,
    outer_id: i32,
    #[serde(default)]
    type_name: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    has_full_stack: bool,
    #[serde(default)]
    parsed_stack: Vec<WireFrame>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFrame {
    #[serde(default)]
    assembly: String,
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    level: i32,
    #[serde(default)]
    line: i32,
    #[serde(default)]
    method: String,
}

impl From<WireFrame> for StackFrame {
    fn from(f: WireFrame) -> Self {
        StackFrame {
            assembly: f.assembly,
            file_name: f.file_name,
            level: f.level,
            line: f.line,
            method: f.method,
        }
    }
}

impl From<WireCause> for CauseFrame {
    fn from(c: WireCause) -> Self {
        CauseFrame {
            id: c.id,
            outer_id: c.outer_id,
            type_name: c.type_name,
            message: c.message,
            has_full_stack: c.has_full_stack,
            frames: c.parsed_stack.into_iter().map(StackFrame::from).collect(),
        }
    }
}

impl TryFrom<WireRecord> for FailureRecord {
    type Error = DecodeError;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        let captured_at = DateTime::parse_from_rfc3339(&wire.timestamp)
            .map_err(|source| DecodeError::Timestamp {
                value: wire.timestamp.clone(),
                source,
            })?
            .with_timezone(&Utc);

        let record = FailureRecord {
            format_version: wire.ver,
            causes: wire.exceptions.into_iter().map(CauseFrame::from).collect(),
            captured_at,
            session_id: wire.session_id,
        };
        record.validate()?;
        Ok(record)
    }
}

/// Read one record document from `reader`.
///
/// The whole input must be a single document; trailing data is an error.
pub fn decode_record<R: Read>(reader: R) -> Result<FailureRecord, DecodeError> {
    let wire: WireRecord = serde_json::from_reader(reader)?;
    FailureRecord::try_from(wire)
}

/// Read one record document from a byte slice
pub fn decode_record_bytes(bytes: &[u8]) -> Result<FailureRecord, DecodeError> {
    let wire: WireRecord = serde_json::from_slice(bytes)?;
    FailureRecord::try_from(wire)
}
