//! Output destinations for rendered records
//!
//! A sink is a byte writer that also reports whether it is attached to a
//! terminal; handlers use that to decide once whether to emit colors.

pub mod console;
pub mod file;
pub mod memory;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use memory::MemorySink;

use std::io::{self, Write};

pub trait Sink: Write + Send {
    /// Whether the destination is an interactive terminal
    fn is_terminal(&self) -> bool {
        false
    }

    fn name(&self) -> &str;
}

/// Adapter for any writer that is never a terminal
pub struct WriterSink<W: Write + Send> {
    inner: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> Write for WriterSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn name(&self) -> &str {
        "writer"
    }
}
