use std::cell::Cell;
use std::marker::PhantomData;
use std::num::NonZero;

use new_zealand::nz;

use crate::pal::PlatformFacade;
use crate::{BlockPool, Result};

/// Block size used when none is specified via [`BlockPoolBuilder::block_size()`].
pub const DEFAULT_BLOCK_SIZE: NonZero<usize> = nz!(4096);

/// Builder for creating an instance of [`BlockPool`].
///
/// The capacity of the pool (`max_blocks`) is mandatory, whereas other settings are optional.
///
/// # Examples
///
/// ```
/// use std::num::NonZero;
///
/// use block_pool::BlockPool;
///
/// let pool = BlockPool::builder()
///     .max_blocks(16)
///     .block_size(NonZero::new(64 * 1024).unwrap())
///     .preallocate(4)
///     .build()?;
///
/// assert_eq!(pool.free_count(), 4);
/// assert_eq!(pool.alloc_count(), 4);
/// # Ok::<(), block_pool::Error>(())
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) and can be safely transferred between threads,
/// allowing pool configuration to happen on different threads than where the pool is used.
/// However, it is not thread-safe ([`Sync`]) as it contains mutable configuration state.
#[derive(Debug)]
#[must_use]
pub struct BlockPoolBuilder {
    max_blocks: Option<usize>,
    block_size: NonZero<usize>,
    preallocate: usize,
    platform: PlatformFacade,

    // Prevents Sync while allowing Send - builders are thread-mobile but not thread-safe
    _not_sync: PhantomData<Cell<()>>,
}

impl BlockPoolBuilder {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            max_blocks: None,
            block_size: DEFAULT_BLOCK_SIZE,
            preallocate: 0,
            platform: PlatformFacade::real(),
            _not_sync: PhantomData,
        }
    }

    /// Sets the maximum number of blocks the pool will ever hold at the same time,
    /// counting both blocks in use and blocks waiting for reuse.
    #[inline]
    pub fn max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = Some(max_blocks);
        self
    }

    /// Sets the size of every block, in bytes. Defaults to [`DEFAULT_BLOCK_SIZE`].
    ///
    /// Memory is obtained from the operating system in whole pages, so a multiple of the page
    /// size (typically 4 KB) wastes the least memory.
    #[inline]
    pub fn block_size(mut self, block_size: NonZero<usize>) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets how many blocks to acquire eagerly when the pool is built, avoiding first-use
    /// acquisition latency. Must not exceed the capacity of the pool. Defaults to 0.
    #[inline]
    pub fn preallocate(mut self, count: usize) -> Self {
        self.preallocate = count;
        self
    }

    #[cfg(test)]
    pub(crate) fn platform(mut self, platform: PlatformFacade) -> Self {
        self.platform = platform;
        self
    }

    /// Builds the block pool with the specified configuration, preallocating blocks if requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PreallocOutOfBounds`][crate::Error::PreallocOutOfBounds] if more blocks
    /// are to be preallocated than the pool may hold.
    ///
    /// Returns [`Error::AllocationFailed`][crate::Error::AllocationFailed] if the operating system
    /// refuses to provide memory for a preallocated block. Any blocks already preallocated are
    /// released before returning.
    ///
    /// # Panics
    ///
    /// Panics if the capacity has not been set using [`max_blocks()`](Self::max_blocks).
    pub fn build(self) -> Result<BlockPool> {
        let max_blocks = self
            .max_blocks
            .expect("capacity must be set using .max_blocks() before calling .build()");

        BlockPool::new_inner(max_blocks, self.block_size, self.preallocate, self.platform)
    }
}
