use std::io;

use thiserror::Error;

/// Errors that can occur when operating a [`BlockPool`][crate::BlockPool].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// More blocks were requested for preallocation than the pool may ever hold.
    #[error("prealloc value out of bounds: {requested} blocks requested but the pool holds at most {max_blocks}")]
    PreallocOutOfBounds {
        /// The number of blocks requested for preallocation.
        requested: usize,

        /// The capacity of the pool.
        max_blocks: usize,
    },

    /// Every block the pool may hold has been handed out and none has been returned.
    ///
    /// This is an expected condition under load and the caller may retry after another
    /// block has been returned.
    #[error("pool is full")]
    PoolFull,

    /// The block handed to [`return_block()`][crate::BlockPool::return_block] is not an exact,
    /// complete view of a block issued by this pool. The block has been discarded.
    #[error("trying to return invalid block")]
    InvalidBlock,

    /// The pool has been closed and all of its memory released.
    #[error("pool is closed")]
    Closed,

    /// The operating system refused to provide memory for a new block.
    #[error("failed to acquire a block of {size} bytes from the operating system")]
    AllocationFailed {
        /// The requested block size in bytes.
        size: usize,

        /// The error reported by the operating system.
        #[source]
        source: io::Error,
    },

    /// The operating system failed to release the memory of a block.
    #[error("failed to release a block of {size} bytes to the operating system: {source}")]
    DeallocationFailed {
        /// The block size in bytes.
        size: usize,

        /// The error reported by the operating system.
        #[source]
        source: io::Error,
    },
}

/// A specialized `Result` type for block pool operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
