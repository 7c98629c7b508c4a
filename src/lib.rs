//! wirebuf - buffer allocation and reuse
//!
//! Raw buffer sources ([`alloc`]) and reuse pools built on them ([`pool`])
//! for encode/decode hot paths that should not hammer the general-purpose
//! allocator.
//!
//! ```
//! use wirebuf::alloc::HeapAllocator;
//! use wirebuf::pool::{BufferPool, FixedPool};
//!
//! let mut pool = FixedPool::new(HeapAllocator::new(), 4096, 32);
//! let mut buf = pool.acquire(4096);
//! buf[0] = 1;
//! pool.dispose(buf);
//! assert_eq!(pool.len(), 1);
//! pool.close();
//! ```

pub mod alloc;
pub mod buffer;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod util;

pub use alloc::{Allocator, AllocatorKind, HeapAllocator};
#[cfg(unix)]
pub use alloc::MappedAllocator;
pub use buffer::{Buffer, BufferKind};
pub use config::Config;
pub use error::{AllocError, Result};
pub use pool::{BufferPool, FixedPool, PoolStats, PoolStrategy, SinglePool};

/// Crate version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
