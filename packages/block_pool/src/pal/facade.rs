use std::fmt::Debug;
use std::io;
use std::num::NonZero;
use std::ptr::NonNull;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::MockPlatform;
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, Platform};

/// Enum to hide the real/mock choice behind a single wrapper type.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Real(&'static BuildTargetPlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    fn acquire(&self, size: NonZero<usize>) -> io::Result<NonNull<u8>> {
        match self {
            Self::Real(p) => p.acquire(size),
            #[cfg(test)]
            Self::Mock(p) => p.acquire(size),
        }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, size: NonZero<usize>) -> io::Result<()> {
        match self {
            // SAFETY: Forwarding the guarantees of our own caller.
            Self::Real(p) => unsafe { p.release(ptr, size) },
            #[cfg(test)]
            // SAFETY: Forwarding the guarantees of our own caller.
            Self::Mock(p) => unsafe { p.release(ptr, size) },
        }
    }
}

impl From<&'static BuildTargetPlatform> for PlatformFacade {
    fn from(p: &'static BuildTargetPlatform) -> Self {
        Self::Real(p)
    }
}

#[cfg(test)]
impl From<MockPlatform> for PlatformFacade {
    fn from(p: MockPlatform) -> Self {
        Self::from_mock(p)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(p) => p.fmt(f),
            #[cfg(test)]
            Self::Mock(p) => p.fmt(f),
        }
    }
}
