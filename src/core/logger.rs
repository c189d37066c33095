//! Logger front end
//!
//! [`Logger`] builds records and hands them to a [`Handler`]. Records are
//! rendered on the calling thread; a handler error cannot be returned from the
//! convenience methods, so it is reported on stderr instead.

use super::attr::Attr;
use super::error::Result;
use super::handler::Handler;
use super::log_level::Level;
use super::record::{Record, Source};
use parking_lot::RwLock;
use std::panic::Location;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
}

impl Logger {
    #[must_use]
    pub fn new<H: Handler + 'static>(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn from_handler(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.handler.enabled(level)
    }

    /// Log `message` with `attrs`, recording the caller's location
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        if !self.enabled(level) {
            return;
        }
        let source = Source::from_location(Location::caller());
        self.log_record(Record::new(level, message).with_source(source).with_attrs(attrs));
    }

    /// Pass a prepared record to the handler, reporting failures on stderr
    pub fn log_record(&self, record: Record) {
        if let Err(e) = self.try_log(&record) {
            eprintln!("[LOGGER ERROR] Handler failed: {}", e);
        }
    }

    /// Pass a prepared record to the handler
    pub fn try_log(&self, record: &Record) -> Result<()> {
        self.handler.handle(record)
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::DEBUG, message, attrs)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::INFO, message, attrs)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::WARN, message, attrs)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::ERROR, message, attrs)
    }

    /// A logger whose records all carry `attrs`
    #[must_use]
    pub fn with(&self, attrs: impl IntoIterator<Item = Attr>) -> Logger {
        let attrs: Vec<Attr> = attrs.into_iter().collect();
        Logger {
            handler: Arc::clone(&self.handler).with_attrs(attrs),
        }
    }

    /// A logger whose later attributes are nested under `name`
    #[must_use]
    pub fn with_group(&self, name: &str) -> Logger {
        Logger {
            handler: Arc::clone(&self.handler).with_group(name),
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// A replaceable logger shared between threads
///
/// # Example
///
/// ```
/// use rust_log_handler::prelude::*;
///
/// let slot = LoggerSlot::empty();
/// assert!(slot.get().is_none());
///
/// let logger = Logger::new(FormatHandler::builder().sink(MemorySink::new()).build());
/// slot.replace(logger);
/// assert!(slot.get().is_some());
/// ```
#[derive(Debug, Default)]
pub struct LoggerSlot {
    current: RwLock<Option<Logger>>,
}

impl LoggerSlot {
    pub const fn empty() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub fn new(logger: Logger) -> Self {
        Self {
            current: RwLock::new(Some(logger)),
        }
    }

    /// The current logger, if any
    pub fn get(&self) -> Option<Logger> {
        self.current.read().clone()
    }

    /// Install `logger`, returning the one it replaces
    pub fn replace(&self, logger: Logger) -> Option<Logger> {
        self.current.write().replace(logger)
    }

    pub fn take(&self) -> Option<Logger> {
        self.current.write().take()
    }
}

static DEFAULT_LOGGER: LoggerSlot = LoggerSlot::empty();

/// Install the process-wide default logger, returning the previous one
pub fn set_default(logger: Logger) -> Option<Logger> {
    DEFAULT_LOGGER.replace(logger)
}

/// The process-wide default logger, if one was installed
pub fn default_logger() -> Option<Logger> {
    DEFAULT_LOGGER.get()
}
