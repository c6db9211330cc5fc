use std::fmt::Debug;
use std::io;
use std::num::NonZero;
use std::ptr::NonNull;

/// Source of raw memory regions that live outside the Rust global allocator.
///
/// All memory the pool hands out is obtained through this trait, enabling it to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Acquires `size` bytes of process-private, anonymous memory with read/write access.
    ///
    /// The contents of the region are unspecified. The region is aligned to whatever the
    /// underlying primitive provides, typically a memory page.
    fn acquire(&self, size: NonZero<usize>) -> io::Result<NonNull<u8>>;

    /// Releases a region previously obtained from [`acquire()`][Self::acquire].
    ///
    /// # Safety
    ///
    /// `ptr` and `size` must be exactly the pair of a region returned by `acquire()` on the same
    /// platform that has not yet been released. Nothing may access the region afterwards.
    unsafe fn release(&self, ptr: NonNull<u8>, size: NonZero<usize>) -> io::Result<()>;
}
