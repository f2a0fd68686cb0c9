//! Streaming JSON writer
//!
//! [`JsonWriter`] emits a compact JSON document piece by piece. It keeps an
//! explicit stack of open containers instead of recursing, so a deeply
//! nested document costs one small stack entry per level.

mod escape;
mod format;
mod writer;

pub use escape::{encode_string, escape_into};
pub use format::{format_duration, format_float, format_timestamp};
pub use writer::{JsonWriter, WriteJson};
