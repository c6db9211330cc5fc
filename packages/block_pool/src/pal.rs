//! Platform Abstraction Layer (PAL). This is private API that hides the operating system
//! primitives used to obtain and release the raw memory regions handed out as blocks.

mod abstractions;
mod facade;

pub(crate) use abstractions::*;
pub(crate) use facade::*;

#[cfg(all(unix, not(miri)))]
mod unix;
#[cfg(all(unix, not(miri)))]
pub(crate) use unix::*;

#[cfg(all(windows, not(miri)))]
mod windows;
#[cfg(all(windows, not(miri)))]
pub(crate) use windows::*;

// Miri cannot talk to a real OS and some targets have neither family of primitives, so there
// we fall back to the Rust global allocator.
#[cfg(any(miri, not(any(unix, windows))))]
mod rust;
#[cfg(any(miri, not(any(unix, windows))))]
pub(crate) use rust::*;
