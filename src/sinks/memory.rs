//! In-memory sink for capturing output

use super::Sink;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Shared byte buffer; clones see the same contents.
///
/// A terminal flag can be forced to exercise colored output without a TTY.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    bytes: Arc<Mutex<Vec<u8>>>,
    terminal: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A memory sink that claims to be a terminal
    pub fn terminal() -> Self {
        Self {
            bytes: Arc::default(),
            terminal: true,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Contents decoded as UTF-8, replacing invalid sequences
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents_string().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for MemorySink {
    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn name(&self) -> &str {
        "memory"
    }
}
