//! Logging macros
//!
//! The message is formatted like `format!`; attributes follow a `;` as
//! `key => value` pairs. The caller is recorded as the enclosing module path
//! and line, and nothing is built when the level is disabled.
//!
//! # Examples
//!
//! ```
//! use rust_log_handler::prelude::*;
//! use rust_log_handler::info;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::new(FormatHandler::builder().sink(sink.clone()).build());
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Listening on port {}", port; "tls" => true, "workers" => 4);
//!
//! assert!(sink.lines()[1].ends_with("Listening on port 8080 tls=true workers=4"));
//! ```

/// Log at an explicit level.
///
/// ```
/// # use rust_log_handler::prelude::*;
/// # let logger = Logger::new(FormatHandler::builder().sink(MemorySink::new()).build());
/// use rust_log_handler::log;
/// log!(logger, Level::WARN, "Simple message");
/// log!(logger, Level::new(2), "Code {}", 500; "path" => "/health");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)? $(; $($key:expr => $value:expr),+ $(,)?)?) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.log_record(
                $crate::Record::new(level, format!($fmt $(, $arg)*))
                    .with_source($crate::Source::new(module_path!(), file!(), line!()))
                    $($(.with_attr($key, $value))+)?,
            );
        }
    }};
}

/// Log a debug-level message.
///
/// ```
/// # use rust_log_handler::prelude::*;
/// # let logger = Logger::new(FormatHandler::builder().sink(MemorySink::new()).build());
/// use rust_log_handler::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::DEBUG, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::INFO, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use rust_log_handler::prelude::*;
/// # let logger = Logger::new(FormatHandler::builder().sink(MemorySink::new()).build());
/// use rust_log_handler::warn;
/// warn!(logger, "Retry attempt {} of {}", 3, 5; "backoff_ms" => 250);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::WARN, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::ERROR, $($arg)+)
    };
}
