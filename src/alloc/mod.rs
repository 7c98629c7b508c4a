//! Raw buffer sources
//!
//! An [`Allocator`] hands out [`Buffer`]s of an exact length and takes them
//! back. Two backends are provided: [`HeapAllocator`] for ordinary heap
//! memory and [`MappedAllocator`] for anonymous OS mappings.

mod heap;
#[cfg(unix)]
mod mapped;

pub use heap::HeapAllocator;
#[cfg(unix)]
pub use mapped::{page_size, MappedAllocator};
#[cfg(unix)]
pub(crate) use mapped::MappedRegion;

use serde::Deserialize;
use std::alloc::Layout;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::Arc;
use tracing::error;

use crate::buffer::Buffer;
use crate::error::Result;

/// Source of raw buffers
///
/// Every buffer returned by `allocate` has exactly the requested length.
/// A buffer must only be disposed through the allocator that produced it.
pub trait Allocator {
    /// Allocate a buffer of exactly `size` bytes
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    fn try_allocate(&self, size: usize) -> Result<Buffer>;

    /// Allocate a buffer of exactly `size` bytes, treating exhaustion as fatal
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero. Allocation failure goes through
    /// [`std::alloc::handle_alloc_error`].
    fn allocate(&self, size: usize) -> Buffer {
        match self.try_allocate(size) {
            Ok(buffer) => buffer,
            Err(e) => {
                error!(size, error = %e, "Buffer allocation failed");
                match Layout::array::<u8>(size) {
                    Ok(layout) => std::alloc::handle_alloc_error(layout),
                    Err(_) => panic!("{e}"),
                }
            }
        }
    }

    /// Release a buffer previously produced by this allocator
    fn dispose(&self, buffer: Buffer);
}

/// Reject zero-sized requests at the boundary
#[inline]
pub(crate) fn check_size(size: usize) -> NonZeroUsize {
    match NonZeroUsize::new(size) {
        Some(size) => size,
        None => panic!("buffer size must be positive"),
    }
}

macro_rules! forward_allocator {
    ($($ptr:ty),*) => {
        $(
            impl<A: Allocator + ?Sized> Allocator for $ptr {
                #[inline]
                fn try_allocate(&self, size: usize) -> Result<Buffer> {
                    (**self).try_allocate(size)
                }

                #[inline]
                fn allocate(&self, size: usize) -> Buffer {
                    (**self).allocate(size)
                }

                #[inline]
                fn dispose(&self, buffer: Buffer) {
                    (**self).dispose(buffer)
                }
            }
        )*
    };
}

forward_allocator!(&A, Box<A>, Rc<A>, Arc<A>);

/// Allocator backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocatorKind {
    /// [`HeapAllocator`]
    Heap,
    /// [`MappedAllocator`]
    Mapped,
}

impl AllocatorKind {
    /// Whether this backend exists on the current platform
    pub fn is_supported(self) -> bool {
        match self {
            AllocatorKind::Heap => true,
            AllocatorKind::Mapped => cfg!(unix),
        }
    }

    /// Construct the selected backend
    pub fn build(self) -> Box<dyn Allocator> {
        match self {
            AllocatorKind::Heap => Box::new(HeapAllocator::new()),
            #[cfg(unix)]
            AllocatorKind::Mapped => Box::new(MappedAllocator::new()),
            #[cfg(not(unix))]
            AllocatorKind::Mapped => {
                tracing::warn!("Mapped allocator unavailable on this platform, using heap");
                Box::new(HeapAllocator::new())
            }
        }
    }
}
