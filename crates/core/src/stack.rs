//! Stack traces parsed from `std::backtrace`

use crate::record::StackFrame;
use std::backtrace::{Backtrace, BacktraceStatus};

/// Parsed stack frames plus whether the walk was complete.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackTrace {
    frames: Vec<StackFrame>,
    full: bool,
}

impl StackTrace {
    /// Capture the current stack, honouring `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`
    pub fn capture() -> Self {
        Self::from_backtrace(&Backtrace::capture())
    }

    /// Capture the current stack regardless of environment settings
    pub fn force_capture() -> Self {
        Self::from_backtrace(&Backtrace::force_capture())
    }

    /// Parse an already captured backtrace.
    ///
    /// A disabled or unsupported backtrace yields an empty, non-full trace.
    pub fn from_backtrace(backtrace: &Backtrace) -> Self {
        match backtrace.status() {
            BacktraceStatus::Captured => Self::parse(&backtrace.to_string(), true),
            _ => Self::default(),
        }
    }

    /// Build a trace from frames gathered elsewhere
    pub fn from_frames(frames: Vec<StackFrame>, full: bool) -> Self {
        Self { frames, full }
    }

    /// Parse the text form of a backtrace.
    ///
    /// Expects the std layout:
    ///
    /// ```text
    ///    0: app::handler::run
    ///              at ./src/handler.rs:12:9
    ///    1: app::main
    /// ```
    ///
    /// Lines that fit neither shape are ignored. If nothing parses, `full` is
    /// forced to false.
    pub fn parse(text: &str, full: bool) -> Self {
        let mut frames: Vec<StackFrame> = Vec::new();

        for line in text.lines() {
            let trimmed = line.trim();

            if let Some(location) = trimmed.strip_prefix("at ") {
                // Inlined frames can list several locations; keep the first.
                if let Some(frame) = frames.last_mut() {
                    if frame.file_name.is_empty() {
                        let (file, line) = split_location(location);
                        frame.file_name = file.to_string();
                        frame.line = line;
                    }
                }
                continue;
            }

            if let Some((index, symbol)) = trimmed.split_once(": ") {
                if let Ok(level) = index.parse::<i32>() {
                    frames.push(StackFrame {
                        assembly: crate_of(symbol).to_string(),
                        file_name: String::new(),
                        level,
                        line: 0,
                        method: symbol.to_string(),
                    });
                }
            }
        }

        let full = full && !frames.is_empty();
        Self { frames, full }
    }

    /// Parsed frames in stack-walk order
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Whether the complete native stack was available
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frame was recorded
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Split `path:line:column` (column optional) into path and line
fn split_location(location: &str) -> (&str, i32) {
    let without_column = match location.rsplit_once(':') {
        Some((head, column)) if column.parse::<u32>().is_ok() => match head.rsplit_once(':') {
            Some((_, line)) if line.parse::<i32>().is_ok() => head,
            _ => location,
        },
        _ => location,
    };

    match without_column.rsplit_once(':') {
        Some((path, line)) => match line.parse() {
            Ok(line) => (path, line),
            Err(_) => (location, 0),
        },
        None => (location, 0),
    }
}

/// First path segment of a symbol, e.g. `app` for `<app::Foo as Bar>::run`
fn crate_of(symbol: &str) -> &str {
    let symbol = symbol.trim_start_matches('<');
    match symbol.find("::") {
        Some(end) => &symbol[..end],
        None => "",
    }
}
