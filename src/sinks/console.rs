//! Console sink writing to stderr or stdout

use super::Sink;
use std::io::{self, IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

pub struct ConsoleSink {
    stream: Stream,
    terminal: bool,
}

impl ConsoleSink {
    /// Sink on stderr, the default destination for handlers
    pub fn stderr() -> Self {
        Self {
            stream: Stream::Stderr,
            terminal: io::stderr().is_terminal(),
        }
    }

    pub fn stdout() -> Self {
        Self {
            stream: Stream::Stdout,
            terminal: io::stdout().is_terminal(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Write for ConsoleSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stream {
            Stream::Stdout => io::stdout().lock().write(buf),
            Stream::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        // One lock for the whole line so lines from other writers never interleave.
        match self.stream {
            Stream::Stdout => io::stdout().lock().write_all(buf),
            Stream::Stderr => io::stderr().lock().write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush(),
            Stream::Stderr => io::stderr().flush(),
        }
    }
}

impl Sink for ConsoleSink {
    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn name(&self) -> &str {
        match self.stream {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}
