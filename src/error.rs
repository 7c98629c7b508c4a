//! Allocation errors
//!
//! Raised by the fallible allocator entry points. The infallible paths turn
//! these into the process allocation-failure handler instead.

use std::collections::TryReserveError;
use std::io;

/// Errors produced by allocator backends
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    /// The general-purpose allocator refused the request
    #[error("heap allocation of {size} bytes failed")]
    Heap {
        size: usize,
        #[source]
        source: TryReserveError,
    },

    /// The anonymous mapping could not be created
    #[error("mapping {size} bytes failed")]
    Map {
        size: usize,
        #[source]
        source: io::Error,
    },

    /// Returning a mapping to the OS failed
    #[error("unmapping {len} bytes failed")]
    Unmap {
        len: usize,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for allocator operations
pub type Result<T> = std::result::Result<T, AllocError>;
