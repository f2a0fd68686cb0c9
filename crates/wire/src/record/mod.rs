//! Record wire mapping
//!
//! One [`FailureRecord`](crashlog_core::FailureRecord) per document:
//!
//! ```text
//! {"ver":2,
//!  "exceptions":[{"id":0,"outerId":-1,"typeName":"..","message":"..",
//!                 "hasFullStack":true,
//!                 "parsedStack":[{"assembly":"..","fileName":"..","level":0,"line":12,"method":".."}]}],
//!  "timestamp":"2024-05-01T12:00:00.0000000+00:00",
//!  "sessionId":".."}
//! ```
//!
//! Whitespace above is for reading only; the stored form has none.

mod decode;
mod encode;

pub use decode::{decode_record, decode_record_bytes};
pub use encode::{encode_record, encode_record_to_string};
