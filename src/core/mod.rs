//! Core handler types

pub mod attr;
pub mod error;
pub mod format;
pub mod handler;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod options;
pub mod output_format;
pub mod pool;
pub mod quoting;
pub mod record;
pub mod theme;
pub mod timestamp;

pub use attr::{Attr, LogValuer, Value};
pub use error::{HandlerError, Result};
pub use handler::{FormatHandler, Handler, HandlerBuilder, Resolver};
pub use log_level::Level;
pub use logger::{default_logger, set_default, Logger, LoggerSlot};
pub use metrics::HandlerMetrics;
pub use options::HandlerOptions;
pub use output_format::OutputFormat;
pub use pool::{Buffer, RenderPools};
pub use quoting::{needs_quoting, quote};
pub use record::{Record, Source};
pub use theme::{Rgb, Theme, ThemeBuilder, ThemeRole, Themes};
pub use timestamp::TimestampFormat;
