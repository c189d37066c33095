//! Serializable handler configuration
//!
//! Loaded from JSON (or any serde format) and turned into a
//! [`HandlerBuilder`]; the sink, resolver and theme overrides are code-only
//! and are added on the returned builder.

use super::error::{HandlerError, Result};
use super::handler::HandlerBuilder;
use super::log_level::Level;
use super::output_format::OutputFormat;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// ```
/// use rust_log_handler::prelude::*;
///
/// let options = HandlerOptions::from_json(r#"{
///     "level": "debug",
///     "format": "json",
///     "time_format": "Rfc3339Nano",
///     "prefix": "api",
///     "level_names": { "ERROR+4": "FATAL" }
/// }"#).unwrap();
///
/// let handler = options.into_builder().sink(MemorySink::new()).build();
/// assert!(handler.enabled(Level::DEBUG));
/// assert_eq!(handler.prefix(), "api");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlerOptions {
    pub level: Level,
    pub format: OutputFormat,
    pub time_format: TimestampFormat,
    pub prefix: String,
    pub caller: bool,
    pub full_caller: bool,
    /// Display names for specific levels
    pub level_names: BTreeMap<Level, String>,
    /// `None` follows the sink's terminal detection
    pub force_tty: Option<bool>,
    /// `None` guesses from the environment
    pub dark_background: Option<bool>,
}

impl HandlerOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents).map_err(|e| {
            HandlerError::config("options", format!("{}: {}", path.display(), e))
        })
    }

    pub fn into_builder(self) -> HandlerBuilder {
        let mut builder = HandlerBuilder::new()
            .level(self.level)
            .format(self.format)
            .time_format(self.time_format)
            .prefix(self.prefix)
            .caller(self.caller)
            .full_caller(self.full_caller);
        for (level, name) in self.level_names {
            builder = builder.level_name(level, name);
        }
        if let Some(tty) = self.force_tty {
            builder = builder.force_tty(tty);
        }
        if let Some(dark) = self.dark_background {
            builder = builder.dark_background(dark);
        }
        builder
    }
}
