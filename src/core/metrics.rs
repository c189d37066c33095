//! Handler metrics for observability
//!
//! Counters are shared by a handler and every handler derived from it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for handler observability
///
/// # Example
///
/// ```
/// use rust_log_handler::HandlerMetrics;
///
/// let metrics = HandlerMetrics::new();
/// metrics.record_written(42);
/// metrics.record_filtered();
///
/// assert_eq!(metrics.records_written(), 1);
/// assert_eq!(metrics.bytes_written(), 42);
/// assert_eq!(metrics.records_filtered(), 1);
/// ```
#[derive(Debug, Default)]
pub struct HandlerMetrics {
    /// Records rendered and accepted by the sink
    records_written: AtomicU64,

    /// Records below the handler's minimum level
    records_filtered: AtomicU64,

    /// Records whose sink write failed
    write_failures: AtomicU64,

    /// Total bytes handed to the sink
    bytes_written: AtomicU64,
}

impl HandlerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            records_filtered: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_filtered(&self) -> u64 {
        self.records_filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self, bytes: usize) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.records_filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Failure rate as a percentage (0.0 - 100.0) of attempted writes
    ///
    /// Returns 0.0 if nothing has been written.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.write_failures();
        let total = failed + self.records_written();
        if total == 0 {
            0.0
        } else {
            (failed as f64 / total as f64) * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.records_written.store(0, Ordering::Relaxed);
        self.records_filtered.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
    }
}
