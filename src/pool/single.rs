//! Single-slot buffer cache
//!
//! Keeps at most one buffer, matched by exact length. Built for the strict
//! acquire/release rhythm of a single encode or decode cursor reusing one
//! scratch buffer of a stable size.

use tracing::{debug, trace};

use super::{BufferPool, PoolStats};
use crate::alloc::{check_size, Allocator};
use crate::buffer::Buffer;

/// Pool caching zero or one buffer
#[derive(Debug)]
pub struct SinglePool<A: Allocator> {
    allocator: A,
    cached: Option<Buffer>,
    stats: PoolStats,
}

impl<A: Allocator> SinglePool<A> {
    /// Create an empty pool owning `allocator`
    pub fn new(allocator: A) -> Self {
        Self {
            allocator,
            cached: None,
            stats: PoolStats::default(),
        }
    }

    /// Length of the cached buffer, if any
    pub fn cached_len(&self) -> Option<usize> {
        self.cached.as_ref().map(Buffer::len)
    }

    /// The underlying allocator
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    fn release(&mut self, buffer: Buffer) {
        self.stats.dropped();
        self.allocator.dispose(buffer);
    }
}

impl<A: Allocator> BufferPool for SinglePool<A> {
    fn acquire(&mut self, size: usize) -> Buffer {
        let size = check_size(size).get();

        match self.cached.take() {
            Some(buffer) if buffer.len() == size => {
                trace!(size, "Single pool hit");
                self.stats.hit();
                return buffer;
            }
            Some(stale) => {
                debug!(cached = stale.len(), requested = size, "Discarding stale cached buffer");
                self.release(stale);
            }
            None => {}
        }

        self.stats.miss();
        self.allocator.allocate(size)
    }

    fn dispose(&mut self, buffer: Buffer) {
        if self.cached.is_none() {
            self.stats.returned();
            self.cached = Some(buffer);
            return;
        }

        // A second buffer was outstanding; keep the cached one.
        debug!(len = buffer.len(), "Single slot occupied, releasing returned buffer");
        self.release(buffer);
    }

    fn close(&mut self) {
        if let Some(buffer) = self.cached.take() {
            self.release(buffer);
        }
    }

    fn cached(&self) -> usize {
        usize::from(self.cached.is_some())
    }

    fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<A: Allocator> Drop for SinglePool<A> {
    fn drop(&mut self) {
        self.close();
    }
}
