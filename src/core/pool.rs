//! Reusable buffers for record rendering
//!
//! Each render borrows a `Buffer` (and, when a resolver is configured, a
//! group tracker) from a pool and hands it back when the scoped guard drops.
//! Idle items sit in a bounded lock-free queue; a miss allocates, a full
//! queue discards, so neither side ever blocks.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt;
use std::io;
use std::ops::{Deref, DerefMut};

/// Starting capacity of a fresh buffer
pub const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Buffers grown past this are dropped instead of being pooled
pub const MAX_POOLED_BUFFER_CAPACITY: usize = 64 * 1024;

/// Starting capacity of a fresh group tracker
pub const INITIAL_GROUP_CAPACITY: usize = 10;

/// Default number of idle items each pool retains
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Items that can live in a [`Pool`]
pub trait Poolable: Send {
    fn fresh() -> Self;

    /// Clear the item for its next user. Returning `false` discards it.
    fn recycle(&mut self) -> bool;
}

/// Growable byte sequence used to assemble one formatted line
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        self.bytes.push(b);
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_bytes(&mut self, b: &[u8]) {
        self.bytes.extend_from_slice(b);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn last_byte(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer({:?})", String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.bytes.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Poolable for Buffer {
    fn fresh() -> Self {
        Buffer::with_capacity(INITIAL_BUFFER_CAPACITY)
    }

    fn recycle(&mut self) -> bool {
        self.bytes.clear();
        self.bytes.capacity() <= MAX_POOLED_BUFFER_CAPACITY
    }
}

/// Names of the groups enclosing the attribute being resolved
pub type GroupTracker = Vec<String>;

impl Poolable for GroupTracker {
    fn fresh() -> Self {
        Vec::with_capacity(INITIAL_GROUP_CAPACITY)
    }

    fn recycle(&mut self) -> bool {
        self.clear();
        true
    }
}

/// Bounded pool of reusable items
pub struct Pool<T: Poolable> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T: Poolable> Pool<T> {
    pub fn new(max_idle: usize) -> Self {
        let (sender, receiver) = bounded(max_idle.max(1));
        Self { sender, receiver }
    }

    /// Take an empty item, allocating when the pool is dry
    pub fn acquire(&self) -> Pooled<'_, T> {
        let item = self.receiver.try_recv().unwrap_or_else(|_| T::fresh());
        Pooled {
            pool: self,
            item: Some(item),
        }
    }

    fn release(&self, mut item: T) {
        if item.recycle() {
            // A full pool simply lets the item drop.
            let _ = self.sender.try_send(item);
        }
    }

    /// Number of idle items currently held
    pub fn idle(&self) -> usize {
        self.receiver.len()
    }
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl<T: Poolable> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool").field("idle", &self.idle()).finish()
    }
}

/// Scoped acquisition: the item goes back to its pool when dropped
pub struct Pooled<'a, T: Poolable> {
    pool: &'a Pool<T>,
    item: Option<T>,
}

impl<T: Poolable> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `Drop` takes the item out.
        match self.item.as_ref() {
            Some(item) => item,
            None => unreachable!("pooled item accessed after release"),
        }
    }
}

impl<T: Poolable> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match self.item.as_mut() {
            Some(item) => item,
            None => unreachable!("pooled item accessed after release"),
        }
    }
}

impl<T: Poolable> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}

/// Pools shared by a handler and everything derived from it
#[derive(Debug, Default)]
pub struct RenderPools {
    pub buffers: Pool<Buffer>,
    pub groups: Pool<GroupTracker>,
}
