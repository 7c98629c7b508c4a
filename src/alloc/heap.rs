//! Heap-backed allocator

use crate::buffer::{Buffer, BufferKind};
use crate::error::{AllocError, Result};
use crate::metrics::METRICS;

use super::{check_size, Allocator};

/// Allocator drawing from the general-purpose heap
///
/// Disposal simply drops the buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl HeapAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl Allocator for HeapAllocator {
    fn try_allocate(&self, size: usize) -> Result<Buffer> {
        let size = check_size(size).get();

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|source| AllocError::Heap { size, source })?;
        data.resize(size, 0u8);

        METRICS.heap_allocated();
        Ok(Buffer::from_heap(data.into_boxed_slice()))
    }

    #[inline]
    fn dispose(&self, buffer: Buffer) {
        debug_assert_eq!(buffer.kind(), BufferKind::Heap, "buffer disposed to the wrong allocator");
        drop(buffer);
    }
}
