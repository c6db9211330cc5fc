use std::io;
use std::num::NonZero;
use std::ptr::{self, NonNull};

use libc::{MAP_ANON, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE};

use crate::pal::Platform;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

/// Obtains memory via anonymous private `mmap()` mappings.
///
/// Private so that other processes never observe the contents, anonymous so that nothing is
/// ever synchronized to a file.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetPlatform;

// Error paths require OS-level failures that are impractical to trigger in tests.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Platform for BuildTargetPlatform {
    fn acquire(&self, size: NonZero<usize>) -> io::Result<NonNull<u8>> {
        // SAFETY: No safety requirements beyond passing valid arguments. The file descriptor
        // must be -1 and the offset 0 for anonymous mappings.
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                size.get(),
                PROT_READ | PROT_WRITE,
                MAP_PRIVATE | MAP_ANON,
                -1,
                0,
            )
        };

        if ptr == MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        NonNull::new(ptr.cast::<u8>())
            .ok_or_else(|| io::Error::other("mmap() returned a null mapping"))
    }

    unsafe fn release(&self, ptr: NonNull<u8>, size: NonZero<usize>) -> io::Result<()> {
        // SAFETY: The caller guarantees this is a live mapping we created with this size.
        let result = unsafe { libc::munmap(ptr.as_ptr().cast(), size.get()) };

        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}
