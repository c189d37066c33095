//! # Rust Log Handler
//!
//! Structured record rendering for terminals and log pipelines.
//!
//! ## Features
//!
//! - **Two formats**: colored `key=value` text, or JSON lines
//! - **Groups and bound attributes**: derive handlers cheaply; bound
//!   attributes are rendered once
//! - **Resolver hook**: rewrite or drop attributes before they are written
//! - **Themes**: 24-bit colors chosen for dark or light terminals, applied only
//!   when the sink is a terminal
//! - **Pooled buffers**: steady-state logging reuses its allocations
//!
//! ```
//! use rust_log_handler::prelude::*;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::new(FormatHandler::json().sink(sink.clone()).build());
//!
//! logger.with_group("http").info("request", [Attr::new("status", 200)]);
//! assert!(sink.contents_string().contains(r#""msg":"request","http":{"status":200}}"#));
//! ```

pub mod builder;
pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Attr, FormatHandler, Handler, HandlerBuilder, HandlerError, HandlerMetrics,
        HandlerOptions, Level, LogValuer, Logger, LoggerSlot, OutputFormat, Record, Result,
        Source, Theme, ThemeBuilder, ThemeRole, Themes, TimestampFormat, Value,
    };
    pub use crate::sinks::{ConsoleSink, FileSink, MemorySink, Sink, WriterSink};
}

pub use crate::core::{
    default_logger, set_default, Attr, FormatHandler, Handler, HandlerBuilder, HandlerError,
    HandlerMetrics, HandlerOptions, Level, LogValuer, Logger, LoggerSlot, OutputFormat, Record,
    Resolver, Result, Source, Theme, ThemeBuilder, ThemeRole, Themes, TimestampFormat, Value,
};
pub use sinks::{ConsoleSink, FileSink, MemorySink, Sink, WriterSink};
