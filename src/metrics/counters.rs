//! Atomic counters for hot-path metrics
//!
//! Lock-free counters that can be safely updated from any thread, even
//! though individual pools are single-owner.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics instance
pub static METRICS: Metrics = Metrics::new();

/// Atomic metrics counters
pub struct Metrics {
    // Allocator metrics
    pub heap_allocations: AtomicU64,
    pub mapped_allocations: AtomicU64,
    pub unmaps: AtomicU64,
    pub unmap_failures: AtomicU64,
    pub mapped_bytes: AtomicU64,

    // Pool metrics
    pub pool_hits: AtomicU64,
    pub pool_misses: AtomicU64,
    pub pool_returns: AtomicU64,
    pub pool_drops: AtomicU64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            heap_allocations: AtomicU64::new(0),
            mapped_allocations: AtomicU64::new(0),
            unmaps: AtomicU64::new(0),
            unmap_failures: AtomicU64::new(0),
            mapped_bytes: AtomicU64::new(0),
            pool_hits: AtomicU64::new(0),
            pool_misses: AtomicU64::new(0),
            pool_returns: AtomicU64::new(0),
            pool_drops: AtomicU64::new(0),
        }
    }

    // Allocator tracking
    #[inline]
    pub fn heap_allocated(&self) {
        self.heap_allocations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn mapped(&self, len: usize) {
        self.mapped_allocations.fetch_add(1, Ordering::Relaxed);
        self.mapped_bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn unmapped(&self, len: usize) {
        self.unmaps.fetch_add(1, Ordering::Relaxed);
        self.mapped_bytes.fetch_sub(len as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn unmap_failed(&self) {
        self.unmap_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Pool tracking
    #[inline]
    pub fn pool_hit(&self) {
        self.pool_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn pool_miss(&self) {
        self.pool_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn pool_return(&self) {
        self.pool_returns.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn pool_drop(&self) {
        self.pool_drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            heap_allocations: self.heap_allocations.load(Ordering::Relaxed),
            mapped_allocations: self.mapped_allocations.load(Ordering::Relaxed),
            unmaps: self.unmaps.load(Ordering::Relaxed),
            unmap_failures: self.unmap_failures.load(Ordering::Relaxed),
            mapped_bytes: self.mapped_bytes.load(Ordering::Relaxed),
            pool_hits: self.pool_hits.load(Ordering::Relaxed),
            pool_misses: self.pool_misses.load(Ordering::Relaxed),
            pool_returns: self.pool_returns.load(Ordering::Relaxed),
            pool_drops: self.pool_drops.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics for reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub heap_allocations: u64,
    pub mapped_allocations: u64,
    pub unmaps: u64,
    pub unmap_failures: u64,
    pub mapped_bytes: u64,
    pub pool_hits: u64,
    pub pool_misses: u64,
    pub pool_returns: u64,
    pub pool_drops: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_bytes_tracks_live_mappings() {
        let metrics = Metrics::new();
        metrics.mapped(8192);
        metrics.mapped(4096);
        metrics.unmapped(8192);

        let snap = metrics.snapshot();
        assert_eq!(snap.mapped_allocations, 2);
        assert_eq!(snap.unmaps, 1);
        assert_eq!(snap.mapped_bytes, 4096);
    }

    #[test]
    fn test_pool_counters() {
        let metrics = Metrics::new();
        metrics.pool_miss();
        metrics.pool_return();
        metrics.pool_hit();
        metrics.pool_drop();

        let snap = metrics.snapshot();
        assert_eq!(
            (snap.pool_hits, snap.pool_misses, snap.pool_returns, snap.pool_drops),
            (1, 1, 1, 1)
        );
    }
}
