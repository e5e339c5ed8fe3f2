//! The heap growth controller (spec §4.6) and the "more-core" collaborator
//! it talks to (spec §6).
//!
//! The teacher crate (`rallocator::bump::BumpAllocator`) calls
//! `libc::sbrk` directly from inside its allocator struct. This crate
//! keeps that as the default backend (see [`SbrkSource`]) but names the
//! collaborator as a trait, matching spec §6's framing of more-core as "a
//! single operation... that returns either the address of n freshly-
//! appended bytes... or an out-of-memory indicator."

use log::debug;
#[cfg(feature = "sbrk")]
use log::warn;

/// The lower-level page/break-acquisition primitive this allocator grows
/// against. A single operation: request `n` more bytes, contiguous with
/// whatever was returned last time, or fail.
pub trait MoreCore {
  /// Requests `n` additional bytes. On success, returns the address of
  /// the first newly-appended byte. On failure, returns `None` and must
  /// leave any prior allocation untouched.
  fn request(&mut self, n: usize) -> Option<usize>;
}

/// The default [`MoreCore`] backend: grows the process's program break via
/// `sbrk(2)`, exactly as the teacher crate's `BumpAllocator` does.
#[cfg(feature = "sbrk")]
#[derive(Debug, Default)]
pub struct SbrkSource;

#[cfg(feature = "sbrk")]
impl MoreCore for SbrkSource {
  fn request(&mut self, n: usize) -> Option<usize> {
    let raw = unsafe { libc::sbrk(n as libc::intptr_t) };
    if raw == usize::MAX as *mut libc::c_void {
      warn!("sbrk refused to extend the heap by {n} bytes");
      return None;
    }
    Some(raw as usize)
  }
}

/// Requests `n` bytes from `source` and reports the outcome; this is the
/// one seam every heap-extending path (fresh allocation, grow-last) routes
/// through, so logging and failure handling live in one place.
pub(crate) fn morecore<S: MoreCore>(source: &mut S, n: usize) -> Option<usize> {
  match source.request(n) {
    Some(addr) => {
      debug!("more_core extended the heap by {n} bytes at {addr:#x}");
      Some(addr)
    }
    None => None,
  }
}
