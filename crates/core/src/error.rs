//! Record invariant violations

use thiserror::Error;

/// A [`FailureRecord`](crate::FailureRecord) that breaks one of its structural invariants.
///
/// Records built by the writer never produce these; they show up when a
/// decoded file was edited, truncated in a lucky spot, or written by
/// something else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The record has no cause frames at all
    #[error("record has no cause frames")]
    NoCauses,

    /// A frame id is not the next id in sequence
    #[error("cause frame at position {position} has id {id}")]
    NonContiguousId {
        /// Index of the frame in the record
        position: usize,
        /// Id found at that position
        id: i32,
    },

    /// The root frame points at another frame
    #[error("root cause frame has outer id {outer_id}, expected -1")]
    RootHasOuter {
        /// Outer id found on the root frame
        outer_id: i32,
    },

    /// A frame points at itself or at a later frame
    #[error("cause frame {id} refers to outer id {outer_id} which does not precede it")]
    ForwardReference {
        /// Frame id
        id: i32,
        /// Offending outer id
        outer_id: i32,
    },
}
