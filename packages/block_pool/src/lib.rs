#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A bounded pool of fixed-size memory blocks obtained directly from the operating system.
//!
//! This crate provides [`BlockPool`], which hands out [`Block`]s whose bytes live outside the
//! Rust global allocator, in anonymous private memory mapped directly from the operating system
//! (`mmap()` on Unix, `VirtualAlloc()` on Windows). Returned blocks are reused, so a workload
//! that repeatedly needs large scratch buffers pays for the system calls only once per block.
//!
//! # Key Features
//!
//! - **Bounded capacity**: The pool never holds more than a fixed number of blocks
//! - **Reuse**: Returned blocks are handed out again, most recently returned first
//! - **Preallocation**: Blocks can be acquired eagerly to avoid first-use latency
//! - **Strict validation**: Only the complete, original view of a block is accepted back
//! - **Complete release**: Closing the pool releases every block, reporting every failure
//! - **Thread safety**: Blocks may be taken and returned from many threads concurrently
//!
//! # Lifetime of the memory
//!
//! Every [`Block`] borrows the [`BlockPool`] it came from, and the memory is only released
//! when the pool is closed via [`BlockPool::close()`] (which requires exclusive access) or
//! dropped. Thus a block can never be accessed after its memory has been released, without any
//! runtime tracking.
//!
//! A block that is dropped instead of returned is not lost to the operating system - it remains
//! owned by the pool until the pool is closed - but it can no longer be reused.
//!
//! # Examples
//!
//! ```rust
//! use block_pool::{BlockPool, Error};
//!
//! // A pool with room for a single block of the default size (4 KB).
//! let mut pool = BlockPool::new(1)?;
//!
//! let mut block = pool.get()?;
//! block[..5].copy_from_slice(b"hello");
//!
//! // There is no room for a second block until the first one is returned.
//! assert!(matches!(pool.get(), Err(Error::PoolFull)));
//!
//! pool.return_block(block)?;
//!
//! // The returned block is reused and still contains what we wrote into it.
//! let block = pool.get()?;
//! assert_eq!(&block[..5], b"hello");
//! pool.return_block(block)?;
//!
//! // Release all memory, observing any failures. Dropping the pool also releases everything.
//! pool.close().expect("failed to release memory");
//! # Ok::<(), Error>(())
//! ```
//!
//! ## Custom block size and preallocation
//!
//! ```rust
//! use std::num::NonZero;
//!
//! use block_pool::BlockPool;
//!
//! let pool = BlockPool::builder()
//!     .max_blocks(8)
//!     .block_size(NonZero::new(1024 * 1024).unwrap())
//!     .preallocate(2)
//!     .build()?;
//!
//! assert_eq!(pool.free_count(), 2);
//! assert_eq!(pool.alloc_count(), 2);
//! # Ok::<(), block_pool::Error>(())
//! ```

mod block;
mod builder;
mod error;
mod multi_error;
mod pal;
mod pool;

pub use block::Block;
pub use builder::*;
pub use error::*;
pub use multi_error::MultiError;
pub use pool::BlockPool;
