//! Anonymous-mapping allocator
//!
//! Each buffer is its own private anonymous mapping, rounded up to the page
//! size. Mapped memory is not reclaimed implicitly, so disposal unmaps
//! the region right away.

use nix::errno::Errno;
use nix::sys::mman::{mmap_anonymous, munmap, MapFlags, ProtFlags};
use once_cell::sync::Lazy;
use std::mem::ManuallyDrop;
use std::num::NonZeroUsize;
use std::ptr::NonNull;
use tracing::warn;

use crate::buffer::{Buffer, BufferKind, Storage};
use crate::error::{AllocError, Result};
use crate::metrics::METRICS;

use super::{check_size, Allocator};

const FALLBACK_PAGE_SIZE: usize = 4096;

static PAGE_SIZE: Lazy<usize> = Lazy::new(|| {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        FALLBACK_PAGE_SIZE
    }
});

/// Platform page size
pub fn page_size() -> usize {
    *PAGE_SIZE
}

/// An owned anonymous mapping
///
/// Unmapped on drop unless released through [`MappedRegion::unmap`].
pub(crate) struct MappedRegion {
    ptr: NonNull<u8>,
    len: usize,
}

// SAFETY: the region is exclusively owned, like a `Box<[u8]>`.
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

impl MappedRegion {
    /// Map at least `size` bytes of zeroed, read-write memory
    pub(crate) fn map(size: NonZeroUsize) -> Result<Self> {
        let len = size
            .get()
            .checked_next_multiple_of(page_size())
            .ok_or_else(|| AllocError::Map {
                size: size.get(),
                source: Errno::ENOMEM.into(),
            })?;
        let length = NonZeroUsize::new(len).unwrap_or(size);

        // SAFETY: a fresh private anonymous mapping aliases nothing.
        let ptr = unsafe {
            mmap_anonymous(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_PRIVATE,
            )
        }
        .map_err(|errno| AllocError::Map {
            size: size.get(),
            source: errno.into(),
        })?;

        Ok(Self {
            ptr: ptr.cast(),
            len: length.get(),
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Return the pages to the OS, reporting failure
    pub(crate) fn unmap(self) -> Result<()> {
        let region = ManuallyDrop::new(self);
        // SAFETY: the region was produced by mmap with this length and is
        // consumed here, so no reference into it survives.
        unsafe { munmap(region.ptr.cast(), region.len) }.map_err(|errno| AllocError::Unmap {
            len: region.len,
            source: errno.into(),
        })
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        // SAFETY: see `unmap`; drop runs at most once.
        if let Err(e) = unsafe { munmap(self.ptr.cast(), self.len) } {
            warn!(len = self.len, error = %e, "Failed to unmap dropped buffer");
            METRICS.unmap_failed();
            return;
        }
        METRICS.unmapped(self.len);
    }
}

/// Allocator backed by anonymous OS mappings
#[derive(Debug, Clone, Copy, Default)]
pub struct MappedAllocator;

impl MappedAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl Allocator for MappedAllocator {
    fn try_allocate(&self, size: usize) -> Result<Buffer> {
        let size = check_size(size);
        let region = MappedRegion::map(size)?;
        METRICS.mapped(region.len());
        Ok(Buffer::from_mapped(region, size.get()))
    }

    fn dispose(&self, buffer: Buffer) {
        debug_assert_eq!(buffer.kind(), BufferKind::Mapped, "buffer disposed to the wrong allocator");

        match buffer.into_storage() {
            Storage::Mapped(region) => {
                let len = region.len();
                match region.unmap() {
                    Ok(()) => METRICS.unmapped(len),
                    Err(e) => {
                        warn!(error = %e, "Failed to unmap buffer");
                        METRICS.unmap_failed();
                    }
                }
            }
            Storage::Heap(data) => drop(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(page_size().is_power_of_two());
    }

    #[test]
    fn test_length_is_exact_reservation_is_paged() {
        let alloc = MappedAllocator::new();
        for size in [1, 100, page_size() - 1, page_size(), page_size() + 1] {
            let buf = alloc.allocate(size);
            assert_eq!(buf.len(), size);
            assert_eq!(buf.reserved() % page_size(), 0);
            assert!(buf.reserved() >= size);
            assert!(buf.reserved() < size + page_size());
            alloc.dispose(buf);
        }
    }

    #[test]
    fn test_memory_is_zeroed_and_writable() {
        let alloc = MappedAllocator::new();
        let mut buf = alloc.allocate(3 * page_size());
        assert!(buf.iter().all(|&b| b == 0));
        buf.fill(0x5A);
        assert!(buf.iter().all(|&b| b == 0x5A));
        alloc.dispose(buf);
    }

    #[test]
    fn test_dropped_buffer_is_unmapped() {
        let before = METRICS.snapshot().unmaps;
        let buf = MappedAllocator::new().allocate(64);
        drop(buf);
        assert!(METRICS.snapshot().unmaps > before);
    }

    #[test]
    fn test_dispose_unmaps() {
        let alloc = MappedAllocator::new();
        let buf = alloc.allocate(4096);
        assert_eq!(buf.kind(), BufferKind::Mapped);

        let before = METRICS.snapshot().unmaps;
        alloc.dispose(buf);
        assert!(METRICS.snapshot().unmaps > before);
    }
}
