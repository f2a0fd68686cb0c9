//! Streaming JSON writer

use super::escape::escape_into;
use super::format::{format_duration, format_float, format_timestamp};
use crate::error::EncodeError;
use chrono::{DateTime, TimeZone};
use std::borrow::Borrow;
use std::io::Write;
use std::time::Duration;

/// A value that knows how to write its own properties.
///
/// Implementations write properties into the object the writer currently has
/// open; the caller opens and closes that object.
pub trait WriteJson {
    /// Write this value's properties into the currently open object
    fn write_json<W: Write>(&self, writer: &mut JsonWriter<W>) -> Result<(), EncodeError>;
}

/// One open container and whether it already has content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Object { has_members: bool },
    Array { has_items: bool },
}

/// Incremental writer for compact JSON.
///
/// Every `write_*` call for a named property follows the omission rule: an
/// empty string, `None`, an empty list or an empty map writes nothing, not
/// even the key.
///
/// # Example
///
/// ```
/// use crashlog_wire::JsonWriter;
///
/// let mut w = JsonWriter::new(Vec::new());
/// w.begin_object().unwrap();
/// w.write_str("name", "disk").unwrap();
/// w.write_str("empty", "").unwrap();
/// w.write_i64("size", 42).unwrap();
/// w.end_object().unwrap();
///
/// let out = String::from_utf8(w.finish().unwrap()).unwrap();
/// assert_eq!(out, r#"{"name":"disk","size":42}"#);
/// ```
pub struct JsonWriter<W: Write> {
    out: W,
    scopes: Vec<Scope>,
    scratch: String,
}

impl<W: Write> JsonWriter<W> {
    /// Create a writer over `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            scopes: Vec::new(),
            scratch: String::new(),
        }
    }

    /// Number of containers currently open
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Open an anonymous object (top level or array element)
    pub fn begin_object(&mut self) -> Result<(), EncodeError> {
        self.begin_value()?;
        self.open(Scope::Object { has_members: false }, b'{')
    }

    /// Open an object as the value of property `name`
    pub fn begin_named_object(&mut self, name: &str) -> Result<(), EncodeError> {
        self.write_name(name)?;
        self.open(Scope::Object { has_members: false }, b'{')
    }

    /// Close the innermost object
    pub fn end_object(&mut self) -> Result<(), EncodeError> {
        match self.scopes.last() {
            Some(Scope::Object { .. }) => {
                self.scopes.pop();
                self.out.write_all(b"}")?;
                Ok(())
            }
            _ => Err(EncodeError::Unbalanced { expected: "object" }),
        }
    }

    fn begin_named_array(&mut self, name: &str) -> Result<(), EncodeError> {
        self.write_name(name)?;
        self.open(Scope::Array { has_items: false }, b'[')
    }

    fn end_array(&mut self) -> Result<(), EncodeError> {
        match self.scopes.last() {
            Some(Scope::Array { .. }) => {
                self.scopes.pop();
                self.out.write_all(b"]")?;
                Ok(())
            }
            _ => Err(EncodeError::Unbalanced { expected: "array" }),
        }
    }

    /// String property, omitted when empty or `None`
    pub fn write_str<'a>(
        &mut self,
        name: &str,
        value: impl Into<Option<&'a str>>,
    ) -> Result<(), EncodeError> {
        match value.into() {
            Some(v) if !v.is_empty() => {
                self.write_name(name)?;
                self.write_string_value(v)
            }
            _ => Ok(()),
        }
    }

    /// Integer property, omitted when `None`
    pub fn write_i64(&mut self, name: &str, value: impl Into<Option<i64>>) -> Result<(), EncodeError> {
        if let Some(v) = value.into() {
            self.write_name(name)?;
            write!(self.out, "{}", v)?;
        }
        Ok(())
    }

    /// 32-bit integer property, omitted when `None`
    pub fn write_i32(&mut self, name: &str, value: impl Into<Option<i32>>) -> Result<(), EncodeError> {
        self.write_i64(name, value.into().map(i64::from))
    }

    /// Boolean property, omitted when `None`
    pub fn write_bool(&mut self, name: &str, value: impl Into<Option<bool>>) -> Result<(), EncodeError> {
        if let Some(v) = value.into() {
            self.write_name(name)?;
            self.out.write_all(if v { b"true" } else { b"false" })?;
        }
        Ok(())
    }

    /// Float property, omitted when `None` or not finite
    pub fn write_f64(&mut self, name: &str, value: impl Into<Option<f64>>) -> Result<(), EncodeError> {
        if let Some(text) = value.into().and_then(format_float) {
            self.write_name(name)?;
            self.out.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    /// Duration property as a `[d.]hh:mm:ss[.fffffff]` string
    pub fn write_duration(
        &mut self,
        name: &str,
        value: impl Into<Option<Duration>>,
    ) -> Result<(), EncodeError> {
        match value.into() {
            Some(v) => self.write_str(name, format_duration(v).as_str()),
            None => Ok(()),
        }
    }

    /// Timestamp property as an ISO-8601 string with offset
    pub fn write_timestamp<'a, Tz: TimeZone + 'a>(
        &mut self,
        name: &str,
        value: impl Into<Option<&'a DateTime<Tz>>>,
    ) -> Result<(), EncodeError> {
        match value.into() {
            Some(v) => self.write_str(name, format_timestamp(v).as_str()),
            None => Ok(()),
        }
    }

    /// Array of strings, omitted when there are no items
    pub fn write_string_list<I, S>(&mut self, name: &str, items: I) -> Result<(), EncodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items = items.into_iter().peekable();
        if items.peek().is_none() {
            return Ok(());
        }

        self.begin_named_array(name)?;
        for item in items {
            self.begin_value()?;
            self.write_string_value(item.as_ref())?;
        }
        self.end_array()
    }

    /// Array of nested objects, omitted when there are no items
    pub fn write_list<'a, T, I>(&mut self, name: &str, items: I) -> Result<(), EncodeError>
    where
        T: WriteJson + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut items = items.into_iter().peekable();
        if items.peek().is_none() {
            return Ok(());
        }

        self.begin_named_array(name)?;
        for item in items {
            self.begin_object()?;
            item.write_json(self)?;
            self.end_object()?;
        }
        self.end_array()
    }

    /// One nested object, omitted when `None`
    pub fn write_object<'a, T: WriteJson + 'a>(
        &mut self,
        name: &str,
        value: impl Into<Option<&'a T>>,
    ) -> Result<(), EncodeError> {
        if let Some(v) = value.into() {
            self.begin_named_object(name)?;
            v.write_json(self)?;
            self.end_object()?;
        }
        Ok(())
    }

    /// Inline a value's properties into the current object
    pub fn write_inline<T: WriteJson + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        value.write_json(self)
    }

    /// String-to-string map as an object, omitted when empty.
    ///
    /// Entries are written in iteration order; entries with an empty value
    /// are dropped like any other empty string property.
    pub fn write_string_map<I, K, V>(&mut self, name: &str, entries: I) -> Result<(), EncodeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return Ok(());
        }

        self.begin_named_object(name)?;
        for (key, value) in entries {
            self.write_str(key.as_ref(), value.as_ref())?;
        }
        self.end_object()
    }

    /// String-to-float map as an object, omitted when empty
    pub fn write_f64_map<I, K, V>(&mut self, name: &str, entries: I) -> Result<(), EncodeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<f64>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return Ok(());
        }

        self.begin_named_object(name)?;
        for (key, value) in entries {
            self.write_f64(key.as_ref(), *value.borrow())?;
        }
        self.end_object()
    }

    /// Flush the sink without checking balance
    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.out.flush()?;
        Ok(())
    }

    /// Check that every container was closed, flush, and hand back the sink
    pub fn finish(mut self) -> Result<W, EncodeError> {
        match self.scopes.last() {
            None => {
                self.out.flush()?;
                Ok(self.out)
            }
            Some(Scope::Object { .. }) => Err(EncodeError::Unbalanced { expected: "object" }),
            Some(Scope::Array { .. }) => Err(EncodeError::Unbalanced { expected: "array" }),
        }
    }

    /// Give back the sink as-is, even mid-document
    pub fn into_inner(self) -> W {
        self.out
    }

    fn open(&mut self, scope: Scope, token: u8) -> Result<(), EncodeError> {
        self.out.write_all(&[token])?;
        self.scopes.push(scope);
        Ok(())
    }

    /// Comma bookkeeping for an array element; no-op elsewhere
    fn begin_value(&mut self) -> Result<(), EncodeError> {
        if let Some(Scope::Array { has_items }) = self.scopes.last_mut() {
            if *has_items {
                self.out.write_all(b",")?;
            }
            *has_items = true;
        }
        Ok(())
    }

    fn write_name(&mut self, name: &str) -> Result<(), EncodeError> {
        if name.is_empty() {
            return Err(EncodeError::EmptyPropertyName);
        }
        match self.scopes.last_mut() {
            Some(Scope::Object { has_members }) => {
                if *has_members {
                    self.out.write_all(b",")?;
                }
                *has_members = true;
            }
            _ => return Err(EncodeError::PropertyOutsideObject(name.to_string())),
        }
        self.write_string_value(name)?;
        self.out.write_all(b":")?;
        Ok(())
    }

    fn write_string_value(&mut self, value: &str) -> Result<(), EncodeError> {
        self.scratch.clear();
        escape_into(&mut self.scratch, value);
        self.out.write_all(self.scratch.as_bytes())?;
        Ok(())
    }
}
