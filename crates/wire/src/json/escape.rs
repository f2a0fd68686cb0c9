//! JSON string escaping

use std::fmt::Write as _;

/// Append `s` to `out` as a quoted, escaped JSON string.
///
/// `\\`, `"`, `\n`, `\r`, `\t`, `\b` and `\f` get two-character escapes, any
/// other control character becomes `\uXXXX`, everything else is copied.
pub fn escape_into(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Encode a string with proper JSON escaping
pub fn encode_string(s: &str) -> String {
    let mut result = String::new();
    escape_into(&mut result, s);
    result
}
