//! Record structure handed from the logger front end to a handler

use super::attr::{Attr, Value};
use super::log_level::Level;
use chrono::{DateTime, Utc};
use std::panic::Location;

/// Location of the call that produced a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Function or module path (`my_app::net::server`), or the file path
    /// when only a `Location` was available.
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl Source {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Source from a `#[track_caller]` location. No module path is known, so
    /// the file path stands in for the function.
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            function: location.file().to_string(),
            file: location.file().to_string(),
            line: location.line(),
        }
    }

    /// A frame without a function name or line cannot be rendered.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.function.is_empty() && self.line > 0
    }

    /// Function path reduced to its last two segments.
    ///
    /// Module paths are split on `::`, file paths on `/`.
    #[must_use]
    pub fn short_function(&self) -> &str {
        let sep = if self.function.contains("::") { "::" } else { "/" };
        match self.function.rmatch_indices(sep).nth(1) {
            Some((idx, _)) => &self.function[idx + sep.len()..],
            None => &self.function,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Record {
    /// `None` is the zero time: no time section is rendered.
    pub time: Option<DateTime<Utc>>,
    pub level: Level,
    pub message: String,
    /// `None` when no caller frame was captured.
    pub source: Option<Source>,
    pub attrs: Vec<Attr>,
}

impl Record {
    /// Create a record stamped with the current time
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Some(Utc::now()),
            level,
            message: message.into(),
            source: None,
            attrs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_time(mut self, time: Option<DateTime<Utc>>) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_attr<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.attrs.push(Attr::new(key, value));
        self
    }

    #[must_use]
    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn add_attr(&mut self, attr: Attr) {
        self.attrs.push(attr);
    }
}
