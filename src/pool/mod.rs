//! Buffer reuse pools
//!
//! A [`BufferPool`] wraps one [`Allocator`] and decides whether a returned
//! buffer is kept for the next request or handed back to the allocator.
//! Pools are single-owner: every operation takes `&mut self`, and callers
//! that share a pool across workers bring their own lock.

mod fixed;
mod single;

pub use fixed::FixedPool;
pub use single::SinglePool;

use serde::Deserialize;

use crate::alloc::{Allocator, AllocatorKind};
use crate::buffer::Buffer;
use crate::metrics::METRICS;

/// Reuse layer over an allocator
pub trait BufferPool {
    /// Get a buffer of exactly `size` bytes, from cache when possible
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    fn acquire(&mut self, size: usize) -> Buffer;

    /// Hand a buffer back for reuse, or release it through the allocator
    fn dispose(&mut self, buffer: Buffer);

    /// Release every cached buffer; the pool stays usable
    fn close(&mut self);

    /// Number of buffers currently cached
    fn cached(&self) -> usize;

    /// Counters for this pool
    fn stats(&self) -> PoolStats;
}

/// Per-pool counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Requests served from the cache
    pub hits: u64,
    /// Requests that went to the allocator
    pub misses: u64,
    /// Disposed buffers the pool kept
    pub returns: u64,
    /// Buffers the pool released to the allocator
    pub drops: u64,
}

impl PoolStats {
    #[inline]
    pub(crate) fn hit(&mut self) {
        self.hits += 1;
        METRICS.pool_hit();
    }

    #[inline]
    pub(crate) fn miss(&mut self) {
        self.misses += 1;
        METRICS.pool_miss();
    }

    #[inline]
    pub(crate) fn returned(&mut self) {
        self.returns += 1;
        METRICS.pool_return();
    }

    #[inline]
    pub(crate) fn dropped(&mut self) {
        self.drops += 1;
        METRICS.pool_drop();
    }
}

/// Reuse policy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStrategy {
    /// [`SinglePool`]
    Single,
    /// [`FixedPool`]
    Fixed,
}

/// Wire an allocator backend and a reuse policy together
///
/// `size` and `capacity` only apply to the fixed strategy.
pub fn build_pool(
    allocator: AllocatorKind,
    strategy: PoolStrategy,
    size: usize,
    capacity: usize,
) -> Box<dyn BufferPool> {
    let allocator: Box<dyn Allocator> = allocator.build();
    match strategy {
        PoolStrategy::Single => Box::new(SinglePool::new(allocator)),
        PoolStrategy::Fixed => Box::new(FixedPool::new(allocator, size, capacity)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Allocator wrapper that counts traffic, for asserting cache hits.

    use std::cell::Cell;
    use std::rc::Rc;

    use crate::alloc::{Allocator, HeapAllocator};
    use crate::buffer::Buffer;
    use crate::error::Result;

    #[derive(Debug, Default)]
    pub struct Counts {
        pub allocated: Cell<usize>,
        pub disposed: Cell<usize>,
    }

    impl Counts {
        pub fn outstanding(&self) -> usize {
            self.allocated.get() - self.disposed.get()
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct CountingAllocator {
        inner: HeapAllocator,
        pub counts: Rc<Counts>,
    }

    impl Allocator for CountingAllocator {
        fn try_allocate(&self, size: usize) -> Result<Buffer> {
            let buffer = self.inner.try_allocate(size)?;
            self.counts.allocated.set(self.counts.allocated.get() + 1);
            Ok(buffer)
        }

        fn dispose(&self, buffer: Buffer) {
            self.counts.disposed.set(self.counts.disposed.get() + 1);
            self.inner.dispose(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_pool_single() {
        let mut pool = build_pool(AllocatorKind::Heap, PoolStrategy::Single, 0, 0);
        let buf = pool.acquire(128);
        pool.dispose(buf);
        assert_eq!(pool.cached(), 1);

        let buf = pool.acquire(128);
        assert_eq!(pool.stats().hits, 1);
        pool.dispose(buf);
        pool.close();
        assert_eq!(pool.cached(), 0);
    }

    #[test]
    fn test_build_pool_fixed() {
        let mut pool = build_pool(AllocatorKind::Heap, PoolStrategy::Fixed, 256, 2);
        let bufs: Vec<_> = (0..3).map(|_| pool.acquire(256)).collect();
        for buf in bufs {
            pool.dispose(buf);
        }
        assert_eq!(pool.cached(), 2);
        assert_eq!(pool.stats().drops, 1);
    }

    #[test]
    fn test_strategy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            strategy: PoolStrategy,
        }

        let w: Wrapper = toml::from_str("strategy = \"fixed\"").unwrap();
        assert_eq!(w.strategy, PoolStrategy::Fixed);
    }
}
