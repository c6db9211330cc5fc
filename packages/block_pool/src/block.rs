use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

use crate::BlockPool;

/// Exclusive handle to a fixed-size block of memory issued by a [`BlockPool`].
///
/// The bytes of the block live outside the Rust global allocator, in memory obtained directly
/// from the operating system. The handle dereferences to `[u8]` and the owner of the handle has
/// exclusive read-write access to the bytes until the block is given back via
/// [`BlockPool::return_block()`].
///
/// The handle cannot be copied or cloned. It borrows the pool that issued it, so the pool
/// cannot be closed (and the memory released) while the handle is alive.
///
/// Dropping the handle without returning it does not release anything - the block remains
/// owned by the pool but can no longer be reused. Its memory is released when the pool is closed.
///
/// # Contents
///
/// Blocks are not cleared when they are reused. A block may contain whatever the previous
/// owner wrote into it.
///
/// # Sub-views
///
/// [`truncate()`][Self::truncate] and [`advance()`][Self::advance] narrow the view of the block.
/// A block that no longer covers its complete original region is rejected by
/// [`BlockPool::return_block()`] because the pool cannot trust its boundaries anymore.
///
/// # Examples
///
/// ```
/// use block_pool::BlockPool;
///
/// let pool = BlockPool::new(1)?;
///
/// let mut block = pool.get()?;
/// assert_eq!(block.len(), 4096);
///
/// block[..5].copy_from_slice(b"hello");
/// assert_eq!(&block[..5], b"hello");
///
/// pool.return_block(block)?;
/// # Ok::<(), block_pool::Error>(())
/// ```
///
/// # Thread safety
///
/// The handle is thread-safe ([`Send`] + [`Sync`]) because it is the only path to the bytes.
pub struct Block<'p> {
    /// Ensures this block can only be returned to the pool it came from.
    pool_id: u64,

    /// Identity of the block within the pool, issued when the block was first acquired.
    block_id: u64,

    ptr: NonNull<u8>,
    len: usize,

    /// Bytes from `ptr` to the end of the underlying region.
    capacity: usize,

    _pool: PhantomData<&'p BlockPool>,
}

impl Block<'_> {
    #[must_use]
    pub(crate) fn new(pool_id: u64, block_id: u64, ptr: NonNull<u8>, size: NonZero<usize>) -> Self {
        Self {
            pool_id,
            block_id,
            ptr,
            len: size.get(),
            capacity: size.get(),
            _pool: PhantomData,
        }
    }

    /// The length of the current view of the block, in bytes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the current view of the block is empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of bytes from the start of the current view to the end of the underlying
    /// region. Equal to [`len()`][Self::len] unless the view has been truncated.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to the first byte of the current view.
    #[must_use]
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Mutable pointer to the first byte of the current view.
    #[must_use]
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Shortens the view to `len` bytes, keeping the start. Has no effect if `len` is not
    /// smaller than the current length.
    ///
    /// A truncated block can no longer be returned to the pool.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Moves the start of the view forward by `count` bytes.
    ///
    /// A block advanced by a non-zero count can no longer be returned to the pool.
    ///
    /// # Panics
    ///
    /// Panics if `count` is greater than the current length.
    pub fn advance(&mut self, count: usize) {
        let Some(len) = self.len.checked_sub(count) else {
            panic!(
                "cannot advance a block view of {} bytes by {count} bytes",
                self.len
            );
        };

        self.len = len;
        self.capacity = self
            .capacity
            .checked_sub(count)
            .expect("capacity is never smaller than length");

        // SAFETY: `count` is at most `len`, so the result is within the region or one past its end.
        self.ptr = unsafe { self.ptr.add(count) };
    }

    #[must_use]
    pub(crate) fn pool_id(&self) -> u64 {
        self.pool_id
    }

    #[must_use]
    pub(crate) fn block_id(&self) -> u64 {
        self.block_id
    }

    #[must_use]
    pub(crate) fn ptr(&self) -> NonNull<u8> {
        self.ptr
    }
}

impl Deref for Block<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        // SAFETY: The view is within a live region owned exclusively by this handle. The region
        // cannot be released while the handle borrows the pool. The platform only provides
        // initialized (zeroed) memory and every later write goes through this type.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for Block<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: See `deref()`. We hold `&mut self`, so the access is exclusive.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl AsRef<[u8]> for Block<'_> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl AsMut<[u8]> for Block<'_> {
    #[inline]
    fn as_mut(&mut self) -> &mut [u8] {
        self
    }
}

impl fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("pool_id", &self.pool_id)
            .field("block_id", &self.block_id)
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

// SAFETY: The handle is the only way to reach the bytes of the block, so moving it to another
// thread moves the exclusive access along with it.
unsafe impl Send for Block<'_> {}

// SAFETY: Shared references only allow reading the bytes.
unsafe impl Sync for Block<'_> {}
