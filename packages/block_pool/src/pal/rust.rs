use std::alloc::{self, Layout};
use std::io;
use std::num::NonZero;
use std::ptr::NonNull;

use crate::pal::Platform;

/// Mimics the page alignment that the operating system primitives provide.
const ALIGNMENT: usize = 4096;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

/// We use this under Miri because Miri cannot talk to a real OS but the Rust global
/// allocator still works. Also the only option on targets without `mmap()` or `VirtualAlloc()`.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetPlatform;

fn layout_for(size: NonZero<usize>) -> io::Result<Layout> {
    Layout::from_size_align(size.get(), ALIGNMENT).map_err(io::Error::other)
}

impl Platform for BuildTargetPlatform {
    fn acquire(&self, size: NonZero<usize>) -> io::Result<NonNull<u8>> {
        let layout = layout_for(size)?;

        // Blocks are exposed as `&[u8]`, which requires initialized bytes. The operating system
        // primitives always provide zeroed pages, so we do the same here.
        // SAFETY: The layout has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };

        NonNull::new(ptr).ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))
    }

    unsafe fn release(&self, ptr: NonNull<u8>, size: NonZero<usize>) -> io::Result<()> {
        let layout = layout_for(size)?;

        // SAFETY: The caller guarantees the pointer came from acquire() with the same size,
        // which means it was allocated with this exact layout.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) };

        Ok(())
    }
}
