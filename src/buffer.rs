//! Owned byte buffers
//!
//! A [`Buffer`] is the unit handed between allocators, pools and callers.
//! It always exposes exactly the length it was requested with, even when
//! the backing reservation is larger (mapped memory is page granular).
//! Hand-offs move the handle, so a disposed buffer cannot be touched again.

use std::fmt;
use std::ops::{Deref, DerefMut};

#[cfg(unix)]
use crate::alloc::MappedRegion;

/// Memory source backing a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// General-purpose heap memory
    Heap,
    /// Anonymous OS mapping
    Mapped,
}

pub(crate) enum Storage {
    Heap(Box<[u8]>),
    #[cfg(unix)]
    Mapped(MappedRegion),
}

/// A fixed-length byte buffer
pub struct Buffer {
    len: usize,
    storage: Storage,
}

impl Buffer {
    pub(crate) fn from_heap(data: Box<[u8]>) -> Self {
        Self {
            len: data.len(),
            storage: Storage::Heap(data),
        }
    }

    #[cfg(unix)]
    pub(crate) fn from_mapped(region: MappedRegion, len: usize) -> Self {
        debug_assert!(len <= region.len());
        Self {
            len,
            storage: Storage::Mapped(region),
        }
    }

    /// Usable length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Buffers are never empty; kept for API symmetry with slices
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Where the memory came from
    pub fn kind(&self) -> BufferKind {
        match &self.storage {
            Storage::Heap(_) => BufferKind::Heap,
            #[cfg(unix)]
            Storage::Mapped(_) => BufferKind::Mapped,
        }
    }

    /// Bytes actually reserved for this buffer (page rounded when mapped)
    pub fn reserved(&self) -> usize {
        match &self.storage {
            Storage::Heap(data) => data.len(),
            #[cfg(unix)]
            Storage::Mapped(region) => region.len(),
        }
    }

    pub(crate) fn into_storage(self) -> Storage {
        self.storage
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match &self.storage {
            Storage::Heap(data) => &data[..],
            // SAFETY: the region is live for as long as the buffer owns it
            // and `len` never exceeds the mapped length.
            #[cfg(unix)]
            Storage::Mapped(region) => unsafe {
                std::slice::from_raw_parts(region.as_ptr(), self.len)
            },
        }
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.storage {
            Storage::Heap(data) => &mut data[..],
            // SAFETY: as above; `&mut self` guarantees exclusive access.
            #[cfg(unix)]
            Storage::Mapped(region) => unsafe {
                std::slice::from_raw_parts_mut(region.as_mut_ptr(), self.len)
            },
        }
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len)
            .field("kind", &self.kind())
            .field("reserved", &self.reserved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_buffer_exposes_exact_length() {
        let mut buf = Buffer::from_heap(vec![0u8; 100].into_boxed_slice());
        assert_eq!(buf.len(), 100);
        assert_eq!(buf.reserved(), 100);
        assert_eq!(buf.kind(), BufferKind::Heap);
        assert!(!buf.is_empty());

        buf[99] = 7;
        assert_eq!(buf[99], 7);
        assert_eq!(buf.iter().map(|&b| b as usize).sum::<usize>(), 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_mapped_buffer_hides_page_slack() {
        use crate::alloc::{Allocator, MappedAllocator};

        let alloc = MappedAllocator::new();
        let mut buf = alloc.allocate(10);
        assert_eq!(buf.len(), 10);
        assert!(buf.reserved() >= 10);
        assert_eq!(buf.kind(), BufferKind::Mapped);

        buf.copy_from_slice(b"0123456789");
        assert_eq!(&buf[..], b"0123456789");
        alloc.dispose(buf);
    }

    #[test]
    fn test_debug_does_not_dump_contents() {
        let buf = Buffer::from_heap(vec![0xAA; 4].into_boxed_slice());
        let out = format!("{:?}", buf);
        assert!(out.contains("len: 4"));
        assert!(out.contains("Heap"));
    }
}
