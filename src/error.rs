//! Typed failures for the debug consistency checker (spec §8's testable
//! properties P1-P7, plus free-list class membership).
//!
//! The original allocator (`mm.c`'s `mm_checkheap`) reports every one of
//! these as a bare `assert()`, aborting the process. This crate's checker
//! instead returns a `Result`, so a caller (in particular, this crate's
//! own tests) can assert on *which* invariant broke instead of just that
//! something did.

use thiserror::Error;

/// A violation of one of the heap's structural invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsistencyError {
  /// P1: the physical-chain walk from `H0` didn't land exactly on `HE`.
  #[error("physical chain walk from {h0:#x} ended at {reached:#x}, expected heap end {he:#x}")]
  TilingMismatch { h0: usize, reached: usize, he: usize },

  /// P2: a block's header and footer tags disagree.
  #[error("block at {addr:#x} has header {header:#x} but footer {footer:#x}")]
  TagParityMismatch { addr: usize, header: u32, footer: u32 },

  /// P3: two physically adjacent non-sentinel blocks are both FREE.
  #[error("adjacent blocks at {first:#x} and {second:#x} are both free")]
  AdjacentFreeBlocks { first: usize, second: usize },

  /// P4: a free block isn't reachable from any head sentinel, is
  /// reachable from more than one, or its list's class doesn't fit its
  /// size.
  #[error("free block at {addr:#x} of size {size} is not reachable from exactly one head sentinel matching its class")]
  ListMembershipMismatch { addr: usize, size: usize },

  /// P4 (converse direction): a block reachable from a head sentinel
  /// isn't actually FREE, or its size doesn't fit the list's class.
  #[error("block at {addr:#x} reachable from list {list} is not a free block of a size the list accepts")]
  ListContentsMismatch { addr: usize, list: usize },

  /// P5: a list's prev/next links aren't mutual inverses.
  #[error("link asymmetry around block at {addr:#x}: next(prev(x)) or prev(next(x)) didn't return to x")]
  LinkAsymmetry { addr: usize },

  /// P6: `last` isn't the greatest-address non-sentinel block, or `HE !=
  /// last + size(last)`.
  #[error("last marker at {last:#x} (size {last_size}) does not end at heap end {he:#x}")]
  LastMarkerMismatch { last: usize, last_size: usize, he: usize },

  /// P7: a block size or payload pointer isn't aligned to `ALIGNMENT`.
  #[error("block at {addr:#x} has size {size}, which is not a multiple of {alignment}")]
  Misaligned { addr: usize, size: usize, alignment: usize },
}
