//! Split-on-allocate and coalesce-on-free (spec §4.5).
//!
//! Splitting only ever produces a remainder `>= MIN_BLOCK_SIZE`, because
//! every request and every existing block size is already a multiple of
//! `ALIGNMENT == MIN_BLOCK_SIZE`: either the sizes are equal (no split) or
//! the difference is itself a multiple of `MIN_BLOCK_SIZE` and therefore
//! at least one block's worth (spec "Design Notes", "Split minimum").

use crate::block::{self, stamp};
use crate::list::{self, insert, remove};

/// Splits a free block chosen for an allocation of `requested_size` bytes.
///
/// `chosen` must already have been removed from its free list by the
/// caller. If `requested_size == chosen_size`, this is a no-op (no
/// split possible or needed) and the block is left exactly as found;
/// the caller stamps it USED afterward. Otherwise the tail
/// `chosen_size - requested_size` bytes become a new FREE block, inserted
/// into its own list, and `last` is advanced to the remainder if `chosen`
/// was the heap's last block.
///
/// Returns the (possibly updated) `last` marker.
///
/// # Safety
/// `chosen` must be a valid, already-delisted block of size `chosen_size`,
/// and `requested_size <= chosen_size`.
pub unsafe fn split(chosen: usize, chosen_size: usize, requested_size: usize, h0: usize, last: usize) -> usize {
  debug_assert!(requested_size <= chosen_size);
  if requested_size == chosen_size {
    return last;
  }

  let remainder_addr = chosen + requested_size;
  let remainder_size = chosen_size - requested_size;
  debug_assert!(remainder_size >= crate::align::MIN_BLOCK_SIZE);

  unsafe {
    stamp(remainder_addr, remainder_size, false);
  }
  let last = if chosen == last { remainder_addr } else { last };
  unsafe {
    insert(remainder_addr, h0);
  }
  last
}

/// Whether a physical neighbor counts as USED for coalescing purposes.
/// An absent neighbor (heap boundary) behaves as if it were used, i.e. it
/// blocks coalescing in that direction (mirrors `mm.c`'s `(blk_prev) ?
/// bt_used(blk_prev) : 1`).
unsafe fn neighbor_is_used(neighbor: Option<usize>) -> bool {
  match neighbor {
    Some(addr) => unsafe { block::is_used(addr) },
    None => true,
  }
}

/// Coalesces a just-freed block with its physical neighbors and returns
/// the (possibly updated) `last` marker.
///
/// `block_addr` must already be stamped FREE by the caller, but not yet
/// inserted into any list. This function inserts the final surviving
/// block (the original, a two-way merge, or a three-way merge) into
/// its free list exactly once.
///
/// The double-coalesce case (both neighbors free) is the one the original
/// allocator got wrong: it merged all three blocks but only ever updated
/// the prev block's tags, without removing prev from its *old* (now
/// undersized) list or reinserting the merged result into the list
/// matching its new, larger size. This implementation removes both
/// neighbors from their lists before merging and inserts the final merged
/// block once, per spec §9's "Open questions".
///
/// # Safety
/// `block_addr` must be a valid, freshly-freed block, not yet in any list,
/// and `h0`/`last` must describe a consistent heap.
pub unsafe fn coalesce_on_free(block_addr: usize, h0: usize, last: usize) -> usize {
  let prev = unsafe { block::prev_block(block_addr, h0) };
  let next = unsafe { block::next_block(block_addr, last) };
  let prev_used = unsafe { neighbor_is_used(prev) };
  let next_used = unsafe { neighbor_is_used(next) };

  match (prev_used, next_used) {
    (true, true) => {
      unsafe { insert(block_addr, h0) };
      last
    }
    (false, true) => {
      let prev_addr = prev.expect("prev_used was false, so prev exists");
      let merged_size = unsafe { block::size_of_block(prev_addr) } + unsafe { block::size_of_block(block_addr) };
      unsafe { remove(prev_addr, h0) };
      let last = if block_addr == last { prev_addr } else { last };
      unsafe { stamp(prev_addr, merged_size, false) };
      unsafe { insert(prev_addr, h0) };
      last
    }
    (true, false) => {
      let next_addr = next.expect("next_used was false, so next exists");
      let merged_size = unsafe { block::size_of_block(block_addr) } + unsafe { block::size_of_block(next_addr) };
      unsafe { remove(next_addr, h0) };
      let last = if next_addr == last { block_addr } else { last };
      unsafe { stamp(block_addr, merged_size, false) };
      unsafe { insert(block_addr, h0) };
      last
    }
    (false, false) => {
      let prev_addr = prev.expect("prev_used was false, so prev exists");
      let next_addr = next.expect("next_used was false, so next exists");
      let merged_size = unsafe { block::size_of_block(prev_addr) }
        + unsafe { block::size_of_block(block_addr) }
        + unsafe { block::size_of_block(next_addr) };
      unsafe { remove(next_addr, h0) };
      unsafe { remove(prev_addr, h0) };
      let last = if block_addr == last || next_addr == last { prev_addr } else { last };
      unsafe { stamp(prev_addr, merged_size, false) };
      unsafe { insert(prev_addr, h0) };
      last
    }
  }
}
