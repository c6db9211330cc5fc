use std::num::NonZero;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use foldhash::{HashMap, HashMapExt};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::pal::{Platform, PlatformFacade};
use crate::{Block, BlockPoolBuilder, Error, MultiError, Result};

/// Global counter for generating unique pool IDs.
static POOL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique pool ID.
fn generate_pool_id() -> u64 {
    POOL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A bounded pool of fixed-size memory blocks obtained directly from the operating system.
///
/// The memory of every block lives outside the Rust global allocator, so workloads that churn
/// through large buffers do not put any pressure on it. Blocks that are given back via
/// [`return_block()`][Self::return_block] are reused by later calls to [`get()`][Self::get],
/// most recently returned first.
///
/// The pool never holds more than `max_blocks` blocks. Once that many have been acquired and
/// none are waiting for reuse, [`get()`][Self::get] fails with [`Error::PoolFull`].
///
/// # Memory release
///
/// All memory is released back to the operating system when the pool is closed via
/// [`close()`][Self::close] or dropped. Blocks that were never returned are released as well.
/// Because every [`Block`] borrows the pool that issued it, the borrow checker guarantees that
/// no block is accessed after its memory has been released.
///
/// # Examples
///
/// ```
/// use block_pool::{BlockPool, Error};
///
/// let mut pool = BlockPool::new(1)?;
///
/// let block = pool.get()?;
/// assert_eq!(block.len(), 4096);
///
/// // The only block is in use, so the pool is full.
/// assert!(matches!(pool.get(), Err(Error::PoolFull)));
///
/// pool.return_block(block)?;
/// assert_eq!(pool.free_count(), 1);
///
/// pool.close().expect("releasing memory failed");
/// # Ok::<(), block_pool::Error>(())
/// ```
///
/// # Thread safety
///
/// The pool is thread-safe ([`Send`] + [`Sync`]). Blocks may be taken and returned from any
/// number of threads concurrently.
#[derive(Debug)]
pub struct BlockPool {
    /// We need to uniquely identify each pool to ensure that blocks are not returned to the
    /// wrong pool. A block from another pool is treated as invalid.
    pool_id: u64,

    block_size: NonZero<usize>,
    max_blocks: usize,

    /// A single lock guards all bookkeeping, so the free list and the allocated set can never
    /// be observed out of sync with each other.
    state: Mutex<PoolState>,

    platform: PlatformFacade,
}

#[derive(Debug)]
struct PoolState {
    /// Every block owned by the pool, whether waiting for reuse or in use, keyed by block ID.
    allocated: HashMap<u64, Region>,

    /// Blocks waiting for reuse. Used as a stack so that recently touched memory is reused first.
    free: Vec<FreeBlock>,

    next_block_id: u64,

    closed: bool,
}

/// Base address of a region obtained from the platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Region(NonNull<u8>);

// SAFETY: The pool only stores the address for bookkeeping, it never accesses the bytes
// through it. Access to the bytes is governed by `Block`.
unsafe impl Send for Region {}

#[derive(Debug)]
struct FreeBlock {
    block_id: u64,
    region: Region,
}

impl PoolState {
    fn new(capacity: usize) -> Self {
        Self {
            allocated: HashMap::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            next_block_id: 0,
            closed: false,
        }
    }

    /// Registers a freshly acquired region as owned by the pool and returns its block ID.
    fn register(&mut self, region: Region) -> u64 {
        let block_id = self.next_block_id;

        self.next_block_id = self
            .next_block_id
            .checked_add(1)
            .expect("block ID overflow - would need billions of years of acquisitions");

        self.allocated.insert(block_id, region);

        block_id
    }
}

impl BlockPool {
    /// Creates a builder for configuring and constructing a [`BlockPool`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::num::NonZero;
    ///
    /// use block_pool::BlockPool;
    ///
    /// let pool = BlockPool::builder()
    ///     .max_blocks(3)
    ///     .block_size(NonZero::new(8192).unwrap())
    ///     .preallocate(2)
    ///     .build()?;
    ///
    /// assert_eq!(pool.free_count(), 2);
    /// assert_eq!(pool.alloc_count(), 2);
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    #[inline]
    pub fn builder() -> BlockPoolBuilder {
        BlockPoolBuilder::new()
    }

    /// Creates a pool that holds at most `max_blocks` blocks of the
    /// [default size][crate::DEFAULT_BLOCK_SIZE], without preallocating any of them.
    ///
    /// # Errors
    ///
    /// Never fails with the default configuration today. The signature matches
    /// [`BlockPoolBuilder::build()`] so that configuration can be added without changing callers.
    pub fn new(max_blocks: usize) -> Result<Self> {
        Self::builder().max_blocks(max_blocks).build()
    }

    pub(crate) fn new_inner(
        max_blocks: usize,
        block_size: NonZero<usize>,
        preallocate: usize,
        platform: PlatformFacade,
    ) -> Result<Self> {
        if preallocate > max_blocks {
            return Err(Error::PreallocOutOfBounds {
                requested: preallocate,
                max_blocks,
            });
        }

        let mut pool = Self {
            pool_id: generate_pool_id(),
            block_size,
            max_blocks,
            state: Mutex::new(PoolState::new(preallocate)),
            platform,
        };

        if let Err(error) = pool.preallocate(preallocate) {
            // The pool was never handed out, so we can give back what we got so far.
            if let Err(errors) = pool.close() {
                warn!(
                    pool_id = pool.pool_id,
                    failed = errors.len(),
                    %errors,
                    "failed to release preallocated blocks after preallocation failure"
                );
            }

            return Err(error);
        }

        debug!(
            pool_id = pool.pool_id,
            block_size = block_size.get(),
            max_blocks,
            preallocate,
            "block pool created"
        );

        Ok(pool)
    }

    fn preallocate(&mut self, count: usize) -> Result<()> {
        let state = self.state.get_mut();

        for _ in 0..count {
            let region = Region(self.platform.acquire(self.block_size).map_err(|source| {
                Error::AllocationFailed {
                    size: self.block_size.get(),
                    source,
                }
            })?);

            let block_id = state.register(region);
            state.free.push(FreeBlock { block_id, region });
        }

        Ok(())
    }

    /// The size of every block in the pool, in bytes.
    #[must_use]
    #[inline]
    pub fn block_size(&self) -> NonZero<usize> {
        self.block_size
    }

    /// The maximum number of blocks the pool will hold at the same time.
    #[must_use]
    #[inline]
    pub fn max_blocks(&self) -> usize {
        self.max_blocks
    }

    /// Takes a block from the pool.
    ///
    /// The most recently returned block is reused if any is available. Otherwise a new block is
    /// acquired from the operating system, as long as the pool is below its capacity.
    ///
    /// The contents of the block are unspecified. A reused block contains whatever its previous
    /// owner wrote into it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolFull`] if the pool already holds `max_blocks` blocks and none of them
    /// are available for reuse.
    ///
    /// Returns [`Error::AllocationFailed`] if the operating system refuses to provide memory for
    /// a new block.
    ///
    /// Returns [`Error::Closed`] if the pool has been closed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use block_pool::BlockPool;
    ///
    /// let pool = BlockPool::new(2)?;
    ///
    /// let first = pool.get()?;
    /// let first_ptr = first.as_ptr();
    /// pool.return_block(first)?;
    ///
    /// // The returned block is reused.
    /// let second = pool.get()?;
    /// assert_eq!(second.as_ptr(), first_ptr);
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    pub fn get(&self) -> Result<Block<'_>> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(Error::Closed);
        }

        if let Some(free) = state.free.pop() {
            trace!(pool_id = self.pool_id, block_id = free.block_id, "reusing block");

            return Ok(Block::new(
                self.pool_id,
                free.block_id,
                free.region.0,
                self.block_size,
            ));
        }

        if state.allocated.len() >= self.max_blocks {
            return Err(Error::PoolFull);
        }

        let ptr = self
            .platform
            .acquire(self.block_size)
            .map_err(|source| Error::AllocationFailed {
                size: self.block_size.get(),
                source,
            })?;

        let block_id = state.register(Region(ptr));

        trace!(pool_id = self.pool_id, block_id, "acquired new block");

        Ok(Block::new(self.pool_id, block_id, ptr, self.block_size))
    }

    /// Gives a block back to the pool so it can be reused by a later [`get()`][Self::get].
    ///
    /// The block must be the complete, unmodified view of a block issued by this pool. A block
    /// narrowed via [`Block::truncate()`] or [`Block::advance()`], or a block issued by a
    /// different pool, is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlock`] if the block fails validation. The block is discarded: it
    /// is neither reused nor released until the pool is closed, as its true boundaries cannot be
    /// trusted. A block issued by a different pool remains owned by that pool.
    ///
    /// Returns [`Error::Closed`] if the pool has been closed.
    pub fn return_block(&self, block: Block<'_>) -> Result<()> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(Error::Closed);
        }

        if !self.is_complete_block_of_pool(&state, &block) {
            debug!(
                pool_id = self.pool_id,
                block_pool_id = block.pool_id(),
                block_id = block.block_id(),
                len = block.len(),
                capacity = block.capacity(),
                "discarding invalid block"
            );

            return Err(Error::InvalidBlock);
        }

        trace!(pool_id = self.pool_id, block_id = block.block_id(), "block returned");

        state.free.push(FreeBlock {
            block_id: block.block_id(),
            region: Region(block.ptr()),
        });

        Ok(())
    }

    fn is_complete_block_of_pool(&self, state: &PoolState, block: &Block<'_>) -> bool {
        !block.is_empty()
            && block.len() == block.capacity()
            && block.pool_id() == self.pool_id
            && state.allocated.get(&block.block_id()) == Some(&Region(block.ptr()))
            && block.len() == self.block_size.get()
    }

    /// The number of blocks waiting for reuse.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.state.lock().free.len()
    }

    /// The number of blocks owned by the pool, both in use and waiting for reuse.
    ///
    /// Blocks that were dropped instead of returned, or rejected by
    /// [`return_block()`][Self::return_block], are still counted until the pool is closed.
    #[must_use]
    pub fn alloc_count(&self) -> usize {
        self.state.lock().allocated.len()
    }

    /// Whether the pool has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Releases the memory of every block owned by the pool back to the operating system,
    /// including blocks that were never returned.
    ///
    /// Release of every block is attempted even if some fail. Afterwards the pool is empty and
    /// all further [`get()`][Self::get] and [`return_block()`][Self::return_block] calls fail
    /// with [`Error::Closed`]. Closing an already closed pool does nothing and succeeds.
    ///
    /// Dropping the pool closes it automatically, logging any failures. Call this explicitly to
    /// observe the failures.
    ///
    /// # Errors
    ///
    /// Returns a [`MultiError`] with one [`Error::DeallocationFailed`] for every block whose
    /// memory the operating system failed to release.
    pub fn close(&mut self) -> std::result::Result<(), MultiError> {
        let state = self.state.get_mut();

        state.closed = true;
        state.free.clear();

        let released = state.allocated.len();
        let mut errors = MultiError::new();

        for (_, region) in state.allocated.drain() {
            // SAFETY: Every region in the allocated set was obtained from this platform with
            // this block size and is released only once, as draining removes it from the set.
            // We hold an exclusive reference to the pool, so no `Block` borrowing it is alive.
            let result = unsafe { self.platform.release(region.0, self.block_size) };

            errors.add(result.map_err(|source| Error::DeallocationFailed {
                size: self.block_size.get(),
                source,
            }));
        }

        if released > 0 {
            debug!(
                pool_id = self.pool_id,
                released,
                failed = errors.len(),
                "block pool closed"
            );
        }

        errors.into_result()
    }
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        if let Err(errors) = self.close() {
            warn!(
                pool_id = self.pool_id,
                failed = errors.len(),
                %errors,
                "failed to release blocks when dropping block pool"
            );
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;
    use std::thread;

    use mockall::Sequence;
    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::pal::{BUILD_TARGET_PLATFORM, MockPlatform};

    assert_impl_all!(BlockPool: Send, Sync, std::fmt::Debug);

    fn simulated_failure() -> io::Error {
        io::Error::other("simulated platform failure")
    }

    #[test]
    fn smoke_test() {
        let mut pool = BlockPool::new(3).unwrap();

        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.alloc_count(), 0);

        let mut a = pool.get().unwrap();
        let b = pool.get().unwrap();

        assert_eq!(a.len(), 4096);
        assert_eq!(pool.alloc_count(), 2);
        assert_ne!(a.as_ptr(), b.as_ptr());

        a.fill(0x42);
        assert!(a.iter().all(|x| *x == 0x42));

        pool.return_block(a).unwrap();
        assert_eq!(pool.free_count(), 1);

        // b is never returned, leaving it up to close() to release it.
        drop(b);

        pool.close().unwrap();
        assert!(pool.is_closed());
    }

    #[test]
    fn reuses_most_recently_returned_block_first() {
        let pool = BlockPool::new(2).unwrap();

        let a = pool.get().unwrap();
        let b = pool.get().unwrap();
        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();

        pool.return_block(a).unwrap();
        pool.return_block(b).unwrap();

        assert_eq!(pool.get().unwrap().as_ptr(), b_ptr);
        assert_eq!(pool.get().unwrap().as_ptr(), a_ptr);
    }

    #[test]
    fn reused_block_keeps_contents() {
        let pool = BlockPool::new(1).unwrap();

        let mut block = pool.get().unwrap();
        block[..3].copy_from_slice(b"abc");
        pool.return_block(block).unwrap();

        let block = pool.get().unwrap();
        assert_eq!(&block[..3], b"abc");
    }

    #[test]
    fn get_fails_when_full() {
        let pool = BlockPool::new(2).unwrap();

        let _a = pool.get().unwrap();
        let _b = pool.get().unwrap();

        assert!(matches!(pool.get(), Err(Error::PoolFull)));
        assert_eq!(pool.alloc_count(), 2);
    }

    #[test]
    fn zero_capacity_pool_is_always_full() {
        let pool = BlockPool::new(0).unwrap();

        assert!(matches!(pool.get(), Err(Error::PoolFull)));
        assert_eq!(pool.alloc_count(), 0);
    }

    #[test]
    fn preallocate_beyond_capacity_fails() {
        let result = BlockPool::builder()
            .max_blocks(3)
            .preallocate(4)
            .platform(PlatformFacade::from_mock(MockPlatform::new()))
            .build();

        assert!(matches!(
            result,
            Err(Error::PreallocOutOfBounds {
                requested: 4,
                max_blocks: 3
            })
        ));
    }

    #[test]
    fn preallocate_up_to_capacity_succeeds() {
        let pool = BlockPool::builder()
            .max_blocks(3)
            .preallocate(3)
            .build()
            .unwrap();

        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.alloc_count(), 3);
        assert!(matches!(pool.get(), Ok(_)));
    }

    #[test]
    fn preallocation_failure_releases_acquired_blocks() {
        let mut platform = MockPlatform::new();
        let mut seq = Sequence::new();

        platform
            .expect_acquire()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|size| BUILD_TARGET_PLATFORM.acquire(size));

        platform
            .expect_acquire()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(simulated_failure()));

        platform.expect_release().times(2).returning(|ptr, size| {
            // SAFETY: The pool only releases regions it acquired via the passthrough above.
            unsafe { BUILD_TARGET_PLATFORM.release(ptr, size) }
        });

        let result = BlockPool::builder()
            .max_blocks(5)
            .preallocate(4)
            .platform(PlatformFacade::from_mock(platform))
            .build();

        assert!(matches!(
            result,
            Err(Error::AllocationFailed { size: 4096, .. })
        ));
    }

    #[test]
    fn allocation_failure_leaves_pool_usable() {
        let mut platform = MockPlatform::new();
        let mut seq = Sequence::new();

        platform
            .expect_acquire()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(simulated_failure()));

        platform
            .expect_acquire()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|size| BUILD_TARGET_PLATFORM.acquire(size));

        platform.expect_release().times(1).returning(|ptr, size| {
            // SAFETY: The pool only releases regions it acquired via the passthrough above.
            unsafe { BUILD_TARGET_PLATFORM.release(ptr, size) }
        });

        let pool = BlockPool::builder()
            .max_blocks(1)
            .platform(PlatformFacade::from_mock(platform))
            .build()
            .unwrap();

        assert!(matches!(pool.get(), Err(Error::AllocationFailed { .. })));
        assert_eq!(pool.alloc_count(), 0);

        let block = pool.get().unwrap();
        assert_eq!(pool.alloc_count(), 1);
        pool.return_block(block).unwrap();
    }

    #[test]
    fn truncated_block_is_rejected() {
        let pool = BlockPool::new(2).unwrap();

        let mut block = pool.get().unwrap();
        block.truncate(100);

        assert!(matches!(pool.return_block(block), Err(Error::InvalidBlock)));
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.alloc_count(), 1);
    }

    #[test]
    fn advanced_block_is_rejected() {
        let pool = BlockPool::new(2).unwrap();

        let mut block = pool.get().unwrap();
        block.advance(2);

        assert!(matches!(pool.return_block(block), Err(Error::InvalidBlock)));
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.alloc_count(), 1);
    }

    #[test]
    fn empty_view_is_rejected() {
        let pool = BlockPool::new(1).unwrap();

        let mut block = pool.get().unwrap();
        block.advance(block.len());

        assert!(matches!(pool.return_block(block), Err(Error::InvalidBlock)));
    }

    #[test]
    fn block_from_other_pool_is_rejected() {
        let pool = BlockPool::new(1).unwrap();
        let other = BlockPool::new(1).unwrap();

        let foreign = other.get().unwrap();

        assert!(matches!(pool.return_block(foreign), Err(Error::InvalidBlock)));
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.alloc_count(), 0);

        // The discarded block is still owned by the other pool.
        assert_eq!(other.alloc_count(), 1);
        assert_eq!(other.free_count(), 0);
    }

    #[test]
    fn block_with_mismatched_size_is_rejected() {
        let pool = BlockPool::new(1).unwrap();
        let other = BlockPool::builder()
            .max_blocks(1)
            .block_size(nz!(8192))
            .build()
            .unwrap();

        let large = other.get().unwrap();

        assert!(matches!(pool.return_block(large), Err(Error::InvalidBlock)));
    }

    #[test]
    fn discarded_block_is_released_on_close() {
        let mut platform = MockPlatform::new();

        platform
            .expect_acquire()
            .times(1)
            .returning(|size| BUILD_TARGET_PLATFORM.acquire(size));

        platform.expect_release().times(1).returning(|ptr, size| {
            // SAFETY: The pool only releases regions it acquired via the passthrough above.
            unsafe { BUILD_TARGET_PLATFORM.release(ptr, size) }
        });

        let mut pool = BlockPool::builder()
            .max_blocks(1)
            .platform(PlatformFacade::from_mock(platform))
            .build()
            .unwrap();

        let mut block = pool.get().unwrap();
        block.truncate(1);
        assert!(matches!(pool.return_block(block), Err(Error::InvalidBlock)));

        // The discarded block still occupies capacity.
        assert!(matches!(pool.get(), Err(Error::PoolFull)));

        pool.close().unwrap();
    }

    #[test]
    fn close_aggregates_release_failures() {
        let mut platform = MockPlatform::new();

        platform
            .expect_acquire()
            .times(3)
            .returning(|size| BUILD_TARGET_PLATFORM.acquire(size));

        let mut seq = Sequence::new();

        platform
            .expect_release()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|ptr, size| {
                // SAFETY: The pool only releases regions it acquired via the passthrough above.
                unsafe { BUILD_TARGET_PLATFORM.release(ptr, size) }?;
                Err(simulated_failure())
            });

        platform
            .expect_release()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|ptr, size| {
                // SAFETY: The pool only releases regions it acquired via the passthrough above.
                unsafe { BUILD_TARGET_PLATFORM.release(ptr, size) }
            });

        let mut pool = BlockPool::builder()
            .max_blocks(3)
            .preallocate(3)
            .platform(PlatformFacade::from_mock(platform))
            .build()
            .unwrap();

        let errors = pool.close().unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, Error::DeallocationFailed { size: 4096, .. }))
        );

        let message = errors.to_string();
        assert_eq!(message.lines().count(), 2);
        assert!(message.contains("simulated platform failure"));
        assert!(!message.ends_with('\n'));

        // Everything was attempted and the state was cleared regardless.
        assert_eq!(pool.alloc_count(), 0);
        assert_eq!(pool.free_count(), 0);
        pool.close().unwrap();
    }

    #[test]
    fn close_releases_blocks_in_use() {
        let mut platform = MockPlatform::new();

        platform
            .expect_acquire()
            .times(2)
            .returning(|size| BUILD_TARGET_PLATFORM.acquire(size));

        platform.expect_release().times(2).returning(|ptr, size| {
            // SAFETY: The pool only releases regions it acquired via the passthrough above.
            unsafe { BUILD_TARGET_PLATFORM.release(ptr, size) }
        });

        let mut pool = BlockPool::builder()
            .max_blocks(2)
            .platform(PlatformFacade::from_mock(platform))
            .build()
            .unwrap();

        let a = pool.get().unwrap();
        let b = pool.get().unwrap();
        pool.return_block(a).unwrap();
        drop(b);

        pool.close().unwrap();
    }

    #[test]
    fn drop_releases_all_blocks() {
        let mut platform = MockPlatform::new();

        platform
            .expect_acquire()
            .times(2)
            .returning(|size| BUILD_TARGET_PLATFORM.acquire(size));

        platform.expect_release().times(2).returning(|ptr, size| {
            // SAFETY: The pool only releases regions it acquired via the passthrough above.
            unsafe { BUILD_TARGET_PLATFORM.release(ptr, size) }
        });

        let pool = BlockPool::builder()
            .max_blocks(2)
            .preallocate(2)
            .platform(PlatformFacade::from_mock(platform))
            .build()
            .unwrap();

        drop(pool);
    }

    #[test]
    fn drop_after_close_releases_nothing_more() {
        let mut platform = MockPlatform::new();

        platform
            .expect_acquire()
            .times(1)
            .returning(|size| BUILD_TARGET_PLATFORM.acquire(size));

        platform.expect_release().times(1).returning(|ptr, size| {
            // SAFETY: The pool only releases regions it acquired via the passthrough above.
            unsafe { BUILD_TARGET_PLATFORM.release(ptr, size) }
        });

        let mut pool = BlockPool::builder()
            .max_blocks(1)
            .preallocate(1)
            .platform(PlatformFacade::from_mock(platform))
            .build()
            .unwrap();

        pool.close().unwrap();
        drop(pool);
    }

    #[test]
    fn operations_after_close_fail() {
        let mut pool = BlockPool::builder()
            .max_blocks(2)
            .preallocate(1)
            .build()
            .unwrap();
        let other = BlockPool::new(1).unwrap();

        pool.close().unwrap();

        assert!(pool.is_closed());
        assert!(matches!(pool.get(), Err(Error::Closed)));
        assert!(matches!(
            pool.return_block(other.get().unwrap()),
            Err(Error::Closed)
        ));
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.alloc_count(), 0);

        pool.close().unwrap();
    }

    #[test]
    fn pool_ids_are_unique() {
        let a = BlockPool::new(0).unwrap();
        let b = BlockPool::new(0).unwrap();

        assert_ne!(a.pool_id, b.pool_id);
    }

    #[test]
    #[cfg_attr(miri, ignore = "too slow under Miri")]
    fn concurrent_get_and_return() {
        const THREADS: usize = 8;
        const ITERATIONS: usize = 200;

        let pool = BlockPool::new(4).unwrap();

        thread::scope(|s| {
            for thread_index in 0..THREADS {
                let pool = &pool;

                s.spawn(move || {
                    let marker = u8::try_from(thread_index).unwrap();

                    for _ in 0..ITERATIONS {
                        match pool.get() {
                            Ok(mut block) => {
                                block.fill(marker);
                                assert!(block.iter().all(|b| *b == marker));
                                pool.return_block(block).unwrap();
                            }
                            Err(Error::PoolFull) => thread::yield_now(),
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                });
            }
        });

        assert!(pool.alloc_count() <= 4);
        assert_eq!(pool.free_count(), pool.alloc_count());
    }
}
