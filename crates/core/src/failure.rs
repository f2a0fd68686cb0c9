//! Live failures and their cause chains
//!
//! A [`Failure`] is an owned snapshot of something that went wrong, taken at
//! the moment it is observed. The cause chain is stored flat (outermost level
//! first) so nothing downstream has to recurse through it.

use crate::record::StackFrame;
use crate::stack::StackTrace;
use std::any::Any;
use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

/// Maximum number of levels kept from a cause chain.
///
/// `Error::source()` chains are not guaranteed to terminate; anything past
/// this depth is dropped.
pub const MAX_CAUSE_DEPTH: usize = 64;

/// Type name used when a level's concrete type cannot be recovered
const UNKNOWN_TYPE: &str = "std::error::Error";

/// Type name recorded for panics
const PANIC_TYPE: &str = "panic";

/// One level of a cause chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureLevel {
    type_name: String,
    message: String,
    stack: Option<StackTrace>,
}

impl FailureLevel {
    fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Type name of this level
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Human readable message of this level
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Parsed stack, if one was attached
    pub fn stack(&self) -> Option<&StackTrace> {
        self.stack.as_ref()
    }
}

/// An observed failure with its chain of causes.
///
/// # Example
///
/// ```
/// use crashlog_core::Failure;
///
/// let failure = Failure::new("ConfigError", "cannot load settings")
///     .caused_by(Failure::new("std::io::Error", "permission denied"));
///
/// assert_eq!(failure.depth(), 2);
/// assert_eq!(failure.message(), "cannot load settings");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    levels: Vec<FailureLevel>,
}

impl Failure {
    /// Create a single-level failure
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            levels: vec![FailureLevel::new(type_name, message)],
        }
    }

    /// Attach a stack trace to the outermost level
    pub fn with_stack(mut self, stack: StackTrace) -> Self {
        self.levels[0].stack = Some(stack);
        self
    }

    /// Append `cause` (and its own causes) below the innermost level
    pub fn caused_by(mut self, cause: Failure) -> Self {
        let room = MAX_CAUSE_DEPTH.saturating_sub(self.levels.len());
        self.levels.extend(cause.levels.into_iter().take(room));
        self
    }

    /// Snapshot a typed error and its `source()` chain.
    ///
    /// The outermost type name comes from `E`; inner levels are only known
    /// as trait objects, so their names are read off their `Debug` output.
    pub fn from_error<E: StdError + 'static>(err: &E) -> Self {
        let top = FailureLevel::new(std::any::type_name::<E>(), err.to_string());
        Self::walk_sources(top, err.source())
    }

    /// Snapshot a type-erased error and its `source()` chain
    pub fn from_dyn_error(err: &(dyn StdError + 'static)) -> Self {
        let top = FailureLevel::new(debug_type_name(err), err.to_string());
        Self::walk_sources(top, err.source())
    }

    /// Snapshot a panic.
    ///
    /// When the backtrace was not captured the panic location becomes the
    /// only (partial) stack frame.
    pub fn from_panic(
        message: impl Into<String>,
        location: Option<(&str, u32)>,
        backtrace: &Backtrace,
    ) -> Self {
        let mut stack = StackTrace::from_backtrace(backtrace);
        if stack.frames().is_empty() {
            if let Some((file, line)) = location {
                stack = StackTrace::from_frames(
                    vec![StackFrame {
                        file_name: file.to_string(),
                        line: i32::try_from(line).unwrap_or(i32::MAX),
                        ..StackFrame::default()
                    }],
                    false,
                );
            }
        }
        Failure::new(PANIC_TYPE, message).with_stack(stack)
    }

    fn walk_sources(top: FailureLevel, mut source: Option<&(dyn StdError + 'static)>) -> Self {
        let mut levels = vec![top];
        while let Some(err) = source {
            if levels.len() >= MAX_CAUSE_DEPTH {
                break;
            }
            levels.push(FailureLevel::new(debug_type_name(err), err.to_string()));
            source = err.source();
        }
        Self { levels }
    }

    /// All levels, outermost first. Never empty.
    pub fn levels(&self) -> &[FailureLevel] {
        &self.levels
    }

    /// Number of levels in the chain
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Message of the outermost level
    pub fn message(&self) -> &str {
        &self.levels[0].message
    }

    /// Type name of the outermost level
    pub fn type_name(&self) -> &str {
        &self.levels[0].type_name
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, level) in self.levels.iter().enumerate() {
            if idx > 0 {
                f.write_str(": caused by ")?;
            }
            write!(f, "{}: {}", level.type_name, level.message)?;
        }
        Ok(())
    }
}

/// Extract the human readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Leading identifier of an error's `Debug` output.
///
/// Derived `Debug` impls start with the type (or variant) name, which is the
/// closest thing to a runtime type name a trait object offers.
fn debug_type_name(err: &(dyn StdError + 'static)) -> String {
    let debug = format!("{:?}", err);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        UNKNOWN_TYPE.to_string()
    } else {
        name
    }
}
