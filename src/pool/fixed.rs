//! Bounded LIFO free list
//!
//! Caches up to `capacity` buffers of one nominal size. The free list is a
//! vector preallocated with `capacity` slots and used as a stack, so pushes
//! never allocate and the most recently returned (hottest) buffer is served
//! first. Memory held by the pool is bounded by roughly `capacity * size`.

use tracing::trace;

use super::{BufferPool, PoolStats};
use crate::alloc::{check_size, Allocator};
use crate::buffer::Buffer;

/// Pool with a fixed-capacity free list
///
/// Only buffers of the nominal size are retained; any other length is
/// released to the allocator on dispose.
#[derive(Debug)]
pub struct FixedPool<A: Allocator> {
    allocator: A,
    free: Vec<Buffer>,
    size: usize,
    capacity: usize,
    stats: PoolStats,
}

impl<A: Allocator> FixedPool<A> {
    /// Create an empty pool for buffers of `size` bytes, caching at most
    /// `capacity` of them
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(allocator: A, size: usize, capacity: usize) -> Self {
        let size = check_size(size).get();
        Self {
            allocator,
            free: Vec::with_capacity(capacity),
            size,
            capacity,
            stats: PoolStats::default(),
        }
    }

    /// Nominal buffer size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Maximum number of cached buffers
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached buffers
    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Slots reserved by the free list's storage
    pub fn reserved_slots(&self) -> usize {
        self.free.capacity()
    }

    /// The underlying allocator
    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

impl<A: Allocator> BufferPool for FixedPool<A> {
    fn acquire(&mut self, size: usize) -> Buffer {
        let size = check_size(size).get();

        if size == self.size {
            if let Some(buffer) = self.free.pop() {
                self.stats.hit();
                return buffer;
            }
        }

        self.stats.miss();
        self.allocator.allocate(size)
    }

    fn dispose(&mut self, buffer: Buffer) {
        // Off-size buffers are never cached, so hits always match the request.
        if buffer.len() == self.size && self.free.len() < self.capacity {
            self.stats.returned();
            self.free.push(buffer);
            return;
        }

        trace!(
            len = buffer.len(),
            cached = self.free.len(),
            "Fixed pool not retaining buffer"
        );
        self.stats.dropped();
        self.allocator.dispose(buffer);
    }

    fn close(&mut self) {
        for buffer in self.free.drain(..) {
            self.stats.dropped();
            self.allocator.dispose(buffer);
        }
    }

    fn cached(&self) -> usize {
        self.free.len()
    }

    fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<A: Allocator> Drop for FixedPool<A> {
    fn drop(&mut self) {
        self.close();
    }
}
