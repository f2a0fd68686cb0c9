//! Record encoding

use crate::error::EncodeError;
use crate::json::{JsonWriter, WriteJson};
use crashlog_core::{CauseFrame, FailureRecord, StackFrame};
use std::io::Write;

impl WriteJson for FailureRecord {
    fn write_json<W: Write>(&self, w: &mut JsonWriter<W>) -> Result<(), EncodeError> {
        w.write_i32("ver", self.format_version)?;
        w.write_list("exceptions", &self.causes)?;
        w.write_timestamp("timestamp", &self.captured_at)?;
        w.write_str("sessionId", self.session_id.as_str())
    }
}

impl WriteJson for CauseFrame {
    fn write_json<W: Write>(&self, w: &mut JsonWriter<W>) -> Result<(), EncodeError> {
        w.write_i32("id", self.id)?;
        w.write_i32("outerId", self.outer_id)?;
        w.write_str("typeName", self.type_name.as_str())?;
        w.write_str("message", self.message.as_str())?;
        w.write_bool("hasFullStack", self.has_full_stack)?;
        w.write_list("parsedStack", &self.frames)
    }
}

impl WriteJson for StackFrame {
    fn write_json<W: Write>(&self, w: &mut JsonWriter<W>) -> Result<(), EncodeError> {
        w.write_str("assembly", self.assembly.as_str())?;
        w.write_str("fileName", self.file_name.as_str())?;
        w.write_i32("level", self.level)?;
        w.write_i32("line", self.line)?;
        w.write_str("method", self.method.as_str())
    }
}

/// Write `record` as one complete document and hand the sink back.
///
/// The sink is flushed but not synced; durability is the caller's job.
pub fn encode_record<W: Write>(record: &FailureRecord, out: W) -> Result<W, EncodeError> {
    let mut writer = JsonWriter::new(out);
    writer.begin_object()?;
    record.write_json(&mut writer)?;
    writer.end_object()?;
    writer.finish()
}

/// Encode `record` into a `String`
pub fn encode_record_to_string(record: &FailureRecord) -> Result<String, EncodeError> {
    let bytes = encode_record(record, Vec::new())?;
    // The writer only ever emits UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
