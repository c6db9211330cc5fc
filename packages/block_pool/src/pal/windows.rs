use std::io;
use std::num::NonZero;
use std::ptr::NonNull;

use windows::Win32::System::Memory::{
    MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE, VirtualAlloc, VirtualFree,
};

use crate::pal::Platform;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

/// Obtains memory via `VirtualAlloc()`, reserving and committing in one step.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetPlatform;

// Error paths require OS-level failures that are impractical to trigger in tests.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Platform for BuildTargetPlatform {
    fn acquire(&self, size: NonZero<usize>) -> io::Result<NonNull<u8>> {
        // SAFETY: No safety requirements beyond passing valid arguments.
        let ptr = unsafe { VirtualAlloc(None, size.get(), MEM_COMMIT | MEM_RESERVE, PAGE_READWRITE) };

        NonNull::new(ptr.cast::<u8>()).ok_or_else(io::Error::last_os_error)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, size: NonZero<usize>) -> io::Result<()> {
        // MEM_RELEASE always frees the entire reservation and requires a size of zero.
        _ = size;

        // SAFETY: The caller guarantees this is a live region we obtained from VirtualAlloc().
        unsafe { VirtualFree(ptr.as_ptr().cast(), 0, MEM_RELEASE) }.map_err(io::Error::from)
    }
}
