//! Placement engine: chooses a candidate free block for a request (spec
//! §4.4).
//!
//! Starting from the list `list_for(size)` would classify the request
//! into, walk first-fit within that list; if nothing fits, advance to the
//! next list in directory order and retry, up to and including the final
//! (unbounded) list.

use crate::classifier::list_for;
use crate::list::{find_in_list, head_addr, PAIR_SIZE};

/// Finds a free block of at least `size` bytes, or `None` if the whole
/// directory has nothing suitable.
///
/// The constant regime never needs a size check beyond list membership
/// (every block in list `i` is already exactly that list's size), but the
/// segmented regime does: class membership is necessary, not sufficient,
/// for fit, which is exactly what [`find_in_list`]'s own size check
/// guards against.
///
/// # Safety
/// `h0` must be the base of a heap with an initialized directory.
pub unsafe fn find_free_block(size: usize, h0: usize) -> Option<usize> {
  let start_index = list_for(size);
  let mut head = head_addr(h0, start_index);
  loop {
    if let Some(found) = unsafe { find_in_list(head, size, h0) } {
      return Some(found);
    }
    head += PAIR_SIZE;
    if head > crate::list::last_guard_addr(h0) {
      return None;
    }
  }
}
