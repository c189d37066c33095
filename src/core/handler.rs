//! Record handler
//!
//! A [`FormatHandler`] turns records into text or JSON lines and writes them
//! to a [`Sink`]. Handlers are immutable once built; binding attributes,
//! groups, a prefix or themes produces a new handler that shares the sink,
//! pools and metrics of the one it came from.

use super::attr::Attr;
use super::error::Result;
use super::log_level::Level;
use super::metrics::HandlerMetrics;
use super::output_format::OutputFormat;
use super::pool::{Pool, RenderPools, DEFAULT_POOL_SIZE};
use super::record::Record;
use super::theme::{default_themes, has_dark_background, Theme, ThemeRole, Themes};
use super::timestamp::TimestampFormat;
use crate::builder;
use crate::sinks::{ConsoleSink, Sink, WriterSink};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Rewrites or suppresses a non-group attribute before it is rendered.
///
/// Receives the names of the groups enclosing the attribute, outermost
/// first. Returning an attribute with an empty key and a null value drops it.
pub type Resolver = Arc<dyn Fn(&[String], Attr) -> Attr + Send + Sync>;

/// Record processing seam used by [`crate::Logger`]
pub trait Handler: Send + Sync {
    /// Whether records at `level` would be written
    fn enabled(&self, level: Level) -> bool;

    /// Render and write one record
    fn handle(&self, record: &Record) -> Result<()>;

    /// A handler that also renders `attrs` on every record
    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// A handler that nests subsequent attributes under `name`
    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn Handler>;
}

/// State every derived handler shares with its ancestor
pub(crate) struct Shared {
    pub(crate) sink: Mutex<Box<dyn Sink>>,
    pub(crate) pools: RenderPools,
    pub(crate) metrics: Arc<HandlerMetrics>,
}

/// Settings fixed when the root handler is built
pub(crate) struct HandlerConfig {
    pub(crate) min_level: Level,
    pub(crate) time_format: TimestampFormat,
    pub(crate) caller: bool,
    pub(crate) full_caller: bool,
    pub(crate) resolver: Option<Resolver>,
    pub(crate) format: OutputFormat,
    pub(crate) level_names: HashMap<Level, String>,
    /// Sink is a terminal (or forced to be treated as one)
    pub(crate) tty: bool,
    pub(crate) dark_background: bool,
    pub(crate) custom_level_theme: Theme,
}

/// Handler rendering text or JSON lines
///
/// # Example
///
/// ```
/// use rust_log_handler::prelude::*;
///
/// let sink = MemorySink::new();
/// let handler = FormatHandler::builder()
///     .sink(sink.clone())
///     .level(Level::DEBUG)
///     .build()
///     .with_prefix("api")
///     .with_group("request")
///     .with_attrs(vec![Attr::new("id", 7)]);
///
/// let record = Record::new(Level::INFO, "done").with_time(None);
/// handler.handle(&record).unwrap();
/// assert_eq!(sink.contents_string(), "INFO [api]: done request.id=7\n");
/// ```
#[derive(Clone)]
pub struct FormatHandler {
    pub(crate) shared: Arc<Shared>,
    pub(crate) config: Arc<HandlerConfig>,
    pub(crate) prefix: String,
    pub(crate) themes: Themes,
    /// Bound group names, outermost first
    pub(crate) groups: Vec<String>,
    /// Leading groups already opened inside `preformatted`
    pub(crate) n_open_groups: usize,
    /// Attributes bound with `with_attrs`, already rendered
    pub(crate) preformatted: Vec<u8>,
}

impl FormatHandler {
    #[must_use]
    pub fn builder() -> HandlerBuilder {
        HandlerBuilder::new()
    }

    /// Builder preset for JSON output
    #[must_use]
    pub fn json() -> HandlerBuilder {
        HandlerBuilder::new().format(OutputFormat::Json)
    }

    /// Builder preset for text output
    #[must_use]
    pub fn text() -> HandlerBuilder {
        HandlerBuilder::new().format(OutputFormat::Text)
    }

    /// Derive a handler with `attrs` pre-rendered.
    ///
    /// An empty list, or one whose attributes all render to nothing,
    /// yields an equivalent handler.
    #[must_use]
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        match builder::preformat_attrs(self, &attrs) {
            Ok(Some(preformatted)) => {
                let mut derived = self.clone();
                derived.preformatted = preformatted;
                derived.n_open_groups = derived.groups.len();
                derived
            }
            Ok(None) => self.clone(),
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to pre-render attributes: {}", e);
                self.clone()
            }
        }
    }

    /// Derive a handler whose later attributes are nested under `name`.
    ///
    /// An empty name yields an equivalent handler.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        let mut derived = self.clone();
        if !name.is_empty() {
            derived.groups.push(name.to_string());
        }
        derived
    }

    /// Derive a handler with a different prefix section
    #[must_use]
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        let mut derived = self.clone();
        derived.prefix = prefix.into();
        derived
    }

    /// Derive a handler with `themes` overriding the current ones per role
    #[must_use]
    pub fn with_themes(&self, themes: Themes) -> Self {
        let mut derived = self.clone();
        derived.themes.extend(themes);
        derived
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn format(&self) -> OutputFormat {
        self.config.format
    }

    pub fn min_level(&self) -> Level {
        self.config.min_level
    }

    /// Whether themes are applied
    pub fn is_tty(&self) -> bool {
        self.config.tty
    }

    pub fn is_dark_background(&self) -> bool {
        self.config.dark_background
    }

    pub fn metrics(&self) -> &HandlerMetrics {
        &self.shared.metrics
    }

    /// Shared handle to the metrics, for reading after the handler is gone
    pub fn metrics_handle(&self) -> Arc<HandlerMetrics> {
        Arc::clone(&self.shared.metrics)
    }

    pub fn flush(&self) -> Result<()> {
        self.shared.sink.lock().flush()?;
        Ok(())
    }

    /// Theme for `role`, or `None` when output is not styled
    pub(crate) fn theme_for(&self, role: ThemeRole) -> Option<&Theme> {
        if !self.config.tty {
            return None;
        }
        self.themes.get(&role).map(|theme| theme.as_ref())
    }

    pub(crate) fn custom_level_theme(&self) -> Option<&Theme> {
        self.config.tty.then_some(&self.config.custom_level_theme)
    }

    /// `<function:line>` when caller reporting is on and the frame is known
    pub(crate) fn caller_label(&self, record: &Record) -> Option<String> {
        if !self.config.caller {
            return None;
        }
        let source = record.source.as_ref().filter(|s| s.is_resolved())?;
        let function = if self.config.full_caller {
            source.function.as_str()
        } else {
            source.short_function()
        };
        Some(format!("<{}:{}>", function, source.line))
    }
}

impl Handler for FormatHandler {
    fn enabled(&self, level: Level) -> bool {
        level >= self.config.min_level
    }

    fn handle(&self, record: &Record) -> Result<()> {
        if !self.enabled(record.level) {
            self.shared.metrics.record_filtered();
            return Ok(());
        }

        let buf = builder::build_record(self, record)?;
        let mut sink = self.shared.sink.lock();
        match sink.write_all(buf.as_bytes()) {
            Ok(()) => {
                self.shared.metrics.record_written(buf.len());
                Ok(())
            }
            Err(e) => {
                self.shared.metrics.record_write_failure();
                Err(e.into())
            }
        }
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        if attrs.is_empty() {
            return self;
        }
        Arc::new(FormatHandler::with_attrs(&self, attrs))
    }

    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn Handler> {
        if name.is_empty() {
            return self;
        }
        Arc::new(FormatHandler::with_group(&self, name))
    }
}

impl fmt::Debug for FormatHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatHandler")
            .field("format", &self.config.format)
            .field("min_level", &self.config.min_level)
            .field("prefix", &self.prefix)
            .field("groups", &self.groups)
            .field("tty", &self.config.tty)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FormatHandler`]
///
/// Everything except the sink has a default: records at `INFO` and above,
/// kitchen clock time, text output, no caller, no prefix. The sink defaults
/// to stderr.
///
/// # Example
///
/// ```
/// use rust_log_handler::prelude::*;
///
/// let handler = FormatHandler::builder()
///     .sink(MemorySink::new())
///     .level(Level::WARN)
///     .time_format(TimestampFormat::Rfc3339Nano)
///     .caller(true)
///     .level_name(Level::new(12), "FATAL")
///     .resolver(|_groups, attr| attr)
///     .build();
/// assert!(!handler.enabled(Level::INFO));
/// ```
pub struct HandlerBuilder {
    sink: Option<Box<dyn Sink>>,
    min_level: Level,
    time_format: TimestampFormat,
    prefix: String,
    caller: bool,
    full_caller: bool,
    resolver: Option<Resolver>,
    format: OutputFormat,
    themes: Themes,
    level_names: HashMap<Level, String>,
    tty: Option<bool>,
    dark_background: Option<bool>,
    pool_size: usize,
}

impl HandlerBuilder {
    pub fn new() -> Self {
        Self {
            sink: None,
            min_level: Level::INFO,
            time_format: TimestampFormat::default(),
            prefix: String::new(),
            caller: false,
            full_caller: false,
            resolver: None,
            format: OutputFormat::default(),
            themes: Themes::new(),
            level_names: HashMap::new(),
            tty: None,
            dark_background: None,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Destination for rendered lines
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Destination from any writer; it is never treated as a terminal
    #[must_use = "builder methods return a new value"]
    pub fn writer<W: Write + Send + 'static>(self, writer: W) -> Self {
        self.sink(WriterSink::new(writer))
    }

    /// Minimum level written
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn time_format(mut self, format: TimestampFormat) -> Self {
        self.time_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Report the calling function and line
    #[must_use = "builder methods return a new value"]
    pub fn caller(mut self, enabled: bool) -> Self {
        self.caller = enabled;
        self
    }

    /// Report the full function path instead of its last two segments.
    /// Turns caller reporting on.
    #[must_use = "builder methods return a new value"]
    pub fn full_caller(mut self, enabled: bool) -> Self {
        self.full_caller = enabled;
        if enabled {
            self.caller = true;
        }
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&[String], Attr) -> Attr + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Override the default theme of one role
    #[must_use = "builder methods return a new value"]
    pub fn theme(mut self, role: ThemeRole, theme: Theme) -> Self {
        self.themes.insert(role, Arc::new(theme));
        self
    }

    /// Override the default themes of several roles
    #[must_use = "builder methods return a new value"]
    pub fn themes(mut self, themes: Themes) -> Self {
        self.themes.extend(themes);
        self
    }

    /// Render `level` with `name` instead of its standard label
    #[must_use = "builder methods return a new value"]
    pub fn level_name(mut self, level: Level, name: impl Into<String>) -> Self {
        self.level_names.insert(level, name.into());
        self
    }

    /// Apply themes regardless of what the sink reports
    #[must_use = "builder methods return a new value"]
    pub fn force_tty(mut self, tty: bool) -> Self {
        self.tty = Some(tty);
        self
    }

    /// Pick theme variants for a dark or light terminal instead of guessing
    #[must_use = "builder methods return a new value"]
    pub fn dark_background(mut self, dark: bool) -> Self {
        self.dark_background = Some(dark);
        self
    }

    /// Idle buffers kept per pool
    #[must_use = "builder methods return a new value"]
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    pub fn build(self) -> FormatHandler {
        let sink: Box<dyn Sink> = match self.sink {
            Some(sink) => sink,
            None => Box::new(ConsoleSink::stderr()),
        };
        let tty = self.tty.unwrap_or_else(|| sink.is_terminal());
        let dark_background = self.dark_background.unwrap_or_else(has_dark_background);

        let mut themes = default_themes(dark_background);
        themes.extend(self.themes);

        let shared = Shared {
            sink: Mutex::new(sink),
            pools: RenderPools {
                buffers: Pool::new(self.pool_size),
                groups: Pool::new(self.pool_size),
            },
            metrics: Arc::new(HandlerMetrics::new()),
        };
        let config = HandlerConfig {
            min_level: self.min_level,
            time_format: self.time_format,
            caller: self.caller,
            full_caller: self.full_caller,
            resolver: self.resolver,
            format: self.format,
            level_names: self.level_names,
            tty,
            dark_background,
            custom_level_theme: Theme::bold(),
        };

        FormatHandler {
            shared: Arc::new(shared),
            config: Arc::new(config),
            prefix: self.prefix,
            themes,
            groups: Vec::new(),
            n_open_groups: 0,
            preformatted: Vec::new(),
        }
    }
}

impl Default for HandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
