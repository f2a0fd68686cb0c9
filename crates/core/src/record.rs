//! Failure record model
//!
//! A [`FailureRecord`] is the flat, persisted representation of one captured
//! failure. The linked cause chain of a live failure becomes an ordered list of
//! [`CauseFrame`]s linked by integer ids:
//!
//! ```text
//! Failure (outermost)  ->  CauseFrame { id: 0, outer_id: -1 }
//!   caused by          ->  CauseFrame { id: 1, outer_id: 0 }
//!     caused by        ->  CauseFrame { id: 2, outer_id: 1 }
//! ```
//!
//! Records are built, written and dropped; the file on disk is the only
//! durable copy.

use crate::error::RecordError;
use crate::failure::Failure;
use chrono::{DateTime, SubsecRound, Utc};

/// Version tag written as `ver` in every record
pub const FORMAT_VERSION: i32 = 2;

/// Outer id carried by the root cause frame
pub const ROOT_OUTER_ID: i32 = -1;

/// Sub-second digits kept in `captured_at` (100ns ticks)
const TIMESTAMP_DIGITS: u16 = 7;

/// One persisted failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    /// Schema version tag
    pub format_version: i32,
    /// Cause frames, outermost first. Never empty.
    pub causes: Vec<CauseFrame>,
    /// When the failure was captured
    pub captured_at: DateTime<Utc>,
    /// Session that captured the failure
    pub session_id: String,
}

/// One level of a cause chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CauseFrame {
    /// Position in the chain, contiguous from 0
    pub id: i32,
    /// Id of the wrapping frame, or [`ROOT_OUTER_ID`]
    pub outer_id: i32,
    /// Type name of the failure at this level
    pub type_name: String,
    /// Message of the failure at this level
    pub message: String,
    /// Whether a complete native stack was available
    pub has_full_stack: bool,
    /// Parsed stack frames (may be empty)
    pub frames: Vec<StackFrame>,
}

/// One physical stack level.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackFrame {
    /// Module / crate the frame belongs to
    pub assembly: String,
    /// Source file, when known
    pub file_name: String,
    /// Depth in the stack walk, starting at 0
    pub level: i32,
    /// Source line, 0 when unknown
    pub line: i32,
    /// Fully qualified function name
    pub method: String,
}

impl FailureRecord {
    /// Flatten a live failure into a record stamped with the current time.
    ///
    /// The timestamp is truncated to 100ns so that its text form reads back
    /// to the identical value.
    pub fn from_failure(failure: &Failure, session_id: impl Into<String>) -> Self {
        Self::from_failure_at(failure, Utc::now().trunc_subsecs(TIMESTAMP_DIGITS), session_id)
    }

    /// Flatten a live failure into a record with an explicit capture time.
    pub fn from_failure_at(
        failure: &Failure,
        captured_at: DateTime<Utc>,
        session_id: impl Into<String>,
    ) -> Self {
        let causes = failure
            .levels()
            .iter()
            .enumerate()
            .map(|(idx, level)| {
                let id = idx as i32;
                let (frames, has_full_stack) = match level.stack() {
                    Some(stack) => (stack.frames().to_vec(), stack.is_full()),
                    None => (Vec::new(), false),
                };
                CauseFrame {
                    id,
                    outer_id: if id == 0 { ROOT_OUTER_ID } else { id - 1 },
                    type_name: level.type_name().to_string(),
                    message: level.message().to_string(),
                    has_full_stack,
                    frames,
                }
            })
            .collect();

        FailureRecord {
            format_version: FORMAT_VERSION,
            causes,
            captured_at,
            session_id: session_id.into(),
        }
    }

    /// The outermost cause frame.
    ///
    /// # Panics
    ///
    /// Panics if `causes` is empty, which a validated record never is.
    pub fn root(&self) -> &CauseFrame {
        &self.causes[0]
    }

    /// Message of the outermost failure
    pub fn message(&self) -> &str {
        self.causes.first().map(|c| c.message.as_str()).unwrap_or("")
    }

    /// Type name of the outermost failure
    pub fn type_name(&self) -> &str {
        self.causes.first().map(|c| c.type_name.as_str()).unwrap_or("")
    }

    /// Look up a cause frame by id
    pub fn cause(&self, id: i32) -> Option<&CauseFrame> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.causes.get(idx))
            .filter(|c| c.id == id)
    }

    /// Innermost cause, the error at the bottom of the chain
    pub fn innermost(&self) -> Option<&CauseFrame> {
        self.causes.last()
    }

    /// Ids visited following `outer_id` links from `id` up to the root.
    ///
    /// The returned path starts with `id` and ends with `0` for a valid
    /// record. Returns an empty path if `id` does not exist.
    pub fn path_to_root(&self, id: i32) -> Vec<i32> {
        let mut path = Vec::new();
        let mut current = self.cause(id);
        while let Some(frame) = current {
            path.push(frame.id);
            if frame.outer_id == ROOT_OUTER_ID || frame.outer_id >= frame.id {
                break;
            }
            current = self.cause(frame.outer_id);
        }
        path
    }

    /// Check the structural invariants of the record.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.causes.is_empty() {
            return Err(RecordError::NoCauses);
        }

        for (position, frame) in self.causes.iter().enumerate() {
            if frame.id != position as i32 {
                return Err(RecordError::NonContiguousId {
                    position,
                    id: frame.id,
                });
            }
            if position == 0 {
                if frame.outer_id != ROOT_OUTER_ID {
                    return Err(RecordError::RootHasOuter {
                        outer_id: frame.outer_id,
                    });
                }
            } else if frame.outer_id < 0 || frame.outer_id >= frame.id {
                return Err(RecordError::ForwardReference {
                    id: frame.id,
                    outer_id: frame.outer_id,
                });
            }
        }

        Ok(())
    }
}
