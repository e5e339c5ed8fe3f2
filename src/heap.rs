//! Top-level allocator operations (spec §4.7) and initialization (§4.8).
//!
//! [`Heap`] owns all allocator state (the heap bounds `h0`/`last`/`he` and
//! the [`MoreCore`] collaborator it grows against) and is the only module
//! that composes the placement engine, the split/coalesce engine and the
//! growth controller into the four user-facing verbs: `allocate`, `free`,
//! `reallocate`, `zero_allocate`.

use std::ptr::{self, NonNull};

use log::trace;

use crate::align::{self, FREE_LISTS, MIN_BLOCK_SIZE, TAG_SIZE};
use crate::block;
use crate::checker;
use crate::engine;
use crate::growth::{self, MoreCore};
#[cfg(feature = "sbrk")]
use crate::growth::SbrkSource;
use crate::list::{self, DIRECTORY_SIZE};
use crate::placement;

/// Owns one allocator's heap state and the [`MoreCore`] collaborator it
/// grows against. There is no "zero-value" heap: spec §5 requires
/// initialization "exactly once before any allocation operation", so the
/// only way to get one is [`Heap::init`].
pub struct Heap<S: MoreCore> {
  source: S,
  /// Address of the first sentinel (spec's `H0`).
  h0: usize,
  /// The physically last non-sentinel block, or the final tail sentinel
  /// if the heap holds no user block yet (spec's `last`, invariant I7).
  last: usize,
  /// One past the last byte of `last` (spec's `HE`, invariant I8).
  he: usize,
}

#[cfg(feature = "sbrk")]
impl Heap<SbrkSource> {
  /// Initializes a heap backed by the process's real program break via
  /// `sbrk`, the teacher crate's default collaborator.
  pub fn new() -> Option<Self> {
    Heap::init(SbrkSource)
  }
}

impl<S: MoreCore> Heap<S> {
  /// Initialization (spec §4.8): requests padding so the first payload
  /// lands at an aligned address, then the directory's eleven sentinel
  /// pairs, and stamps every pair empty.
  pub fn init(mut source: S) -> Option<Self> {
    let padding = align::ALIGNMENT - TAG_SIZE;
    growth::morecore(&mut source, padding)?;

    let h0 = growth::morecore(&mut source, DIRECTORY_SIZE)?;
    unsafe {
      list::init_sentinels(h0);
    }

    let last = list::tail_addr(h0, FREE_LISTS - 1);
    let he = last + MIN_BLOCK_SIZE;

    let heap = Heap { source, h0, last, he };
    heap.debug_check();
    Some(heap)
  }

  /// allocate (spec §4.7): first-fit a free block, splitting it if it's
  /// oversize; falling back to growing the heap's tail when the directory
  /// has nothing that fits.
  pub fn allocate(&mut self, requested_bytes: usize) -> Option<NonNull<u8>> {
    let size = align::blksz(requested_bytes);

    let block_addr = match unsafe { placement::find_free_block(size, self.h0) } {
      Some(candidate) => {
        unsafe { list::remove(candidate, self.h0) };
        let chosen_size = unsafe { block::size_of_block(candidate) };
        self.last = unsafe { engine::split(candidate, chosen_size, size, self.h0, self.last) };
        candidate
      }
      None => {
        let addr = growth::morecore(&mut self.source, size)?;
        self.last = addr;
        self.he = addr + size;
        addr
      }
    };

    unsafe { block::stamp(block_addr, size, true) };
    trace!("allocate({requested_bytes}) -> {block_addr:#x} (block size {size})");
    self.debug_check();
    self.to_payload(block_addr)
  }

  /// free (spec §4.7): a no-op on `None`, otherwise flips the block to
  /// FREE and coalesces it with its physical neighbors.
  pub fn free(&mut self, payload: Option<NonNull<u8>>) {
    let Some(payload) = payload else { return };
    let block_addr = self.from_payload(payload);
    let size = unsafe { block::size_of_block(block_addr) };
    unsafe { block::stamp(block_addr, size, false) };
    self.last = unsafe { engine::coalesce_on_free(block_addr, self.h0, self.last) };
    trace!("free({block_addr:#x}) (block size {size})");
    self.debug_check();
  }

  /// reallocate (spec §4.7): shrinks are a no-op, growing the last block
  /// is done in place, everything else falls back to allocate + copy +
  /// free. Matches `original_source/mm.c`'s `realloc` edge cases exactly:
  /// `requested_bytes == 0` frees and returns `None`; `old_payload ==
  /// None` is plain `allocate`; on out-of-memory the original block is
  /// left completely untouched.
  pub fn reallocate(&mut self, old_payload: Option<NonNull<u8>>, requested_bytes: usize) -> Option<NonNull<u8>> {
    if requested_bytes == 0 {
      self.free(old_payload);
      return None;
    }

    let Some(old_payload) = old_payload else {
      return self.allocate(requested_bytes);
    };

    let old_block = self.from_payload(old_payload);
    let old_size = unsafe { block::size_of_block(old_block) };
    let new_size = align::blksz(requested_bytes);

    if new_size <= old_size {
      return Some(old_payload);
    }

    if old_block == self.last {
      let delta = new_size - old_size;
      growth::morecore(&mut self.source, delta)?;
      unsafe { block::stamp(old_block, new_size, true) };
      self.he = old_block + new_size;
      trace!("reallocate: grew last block {old_block:#x} from {old_size} to {new_size} in place");
      self.debug_check();
      return Some(old_payload);
    }

    let new_payload = self.allocate(requested_bytes)?;
    let copy_len = old_size - 2 * TAG_SIZE;
    unsafe {
      ptr::copy_nonoverlapping(old_payload.as_ptr(), new_payload.as_ptr(), copy_len);
    }
    self.free(Some(old_payload));
    Some(new_payload)
  }

  /// zero_allocate (spec §4.7): allocates `count * size` bytes and zeroes
  /// them on success. Zeroing is skipped entirely on failure, matching
  /// `original_source/mm.c`'s `calloc`.
  pub fn zero_allocate(&mut self, count: usize, size: usize) -> Option<NonNull<u8>> {
    let bytes = count.checked_mul(size)?;
    let payload = self.allocate(bytes)?;
    unsafe { ptr::write_bytes(payload.as_ptr(), 0, bytes) };
    Some(payload)
  }

  /// Address of the heap's first sentinel (`H0`).
  pub fn heap_start(&self) -> usize {
    self.h0
  }

  /// One past the last byte currently owned by the heap (`HE`).
  pub fn heap_end(&self) -> usize {
    self.he
  }

  fn to_payload(&self, block_addr: usize) -> Option<NonNull<u8>> {
    NonNull::new(block::payload_addr(block_addr) as *mut u8)
  }

  fn from_payload(&self, payload: NonNull<u8>) -> usize {
    block::header_from_payload(payload.as_ptr() as usize)
  }

  /// Runs the full invariant checker (spec §8) when the `consistency-checks`
  /// feature is enabled, or unconditionally under `cfg(test)` so the test
  /// suite itself exercises P1-P7 after every mutating call.
  #[cfg(any(feature = "consistency-checks", test))]
  fn debug_check(&self) {
    checker::debug_assert_consistent(self.h0, self.last, self.he);
  }

  #[cfg(not(any(feature = "consistency-checks", test)))]
  fn debug_check(&self) {}
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::growth::test_support::ArenaSource;

  fn heap(capacity: usize) -> Heap<ArenaSource> {
    Heap::init(ArenaSource::new(capacity)).expect("arena large enough for directory + padding")
  }

  /// S1: allocate(8) lands in the first user block, block size 16, HE
  /// advances by 16, and no free blocks other than sentinels exist.
  #[test]
  fn s1_first_allocation_is_exactly_one_block() {
    let mut h = heap(1 << 16);
    let he_before = h.heap_end();
    let p = h.allocate(8).expect("fresh heap has room");
    let block_addr = block::header_from_payload(p.as_ptr() as usize);
    assert_eq!(unsafe { block::size_of_block(block_addr) }, 16);
    assert_eq!(h.heap_end(), he_before + 16);
    assert_eq!(unsafe { placement::find_free_block(16, h.h0) }, None);
  }

  /// S2: a = allocate(100); b = allocate(100); free(a) leaves a's
  /// 112-byte block FREE on list index 6, with b still USED and no
  /// coalescing (b sits to a's right).
  #[test]
  fn s2_free_with_used_neighbor_does_not_coalesce() {
    let mut h = heap(1 << 16);
    let a = h.allocate(100).unwrap();
    let b = h.allocate(100).unwrap();
    let a_block = block::header_from_payload(a.as_ptr() as usize);
    let b_block = block::header_from_payload(b.as_ptr() as usize);
    assert_eq!(unsafe { block::size_of_block(a_block) }, 112);

    h.free(Some(a));
    assert!(unsafe { block::is_free(a_block) });
    assert!(unsafe { block::is_used(b_block) });

    let head = list::head_addr(h.h0, crate::classifier::list_for(112));
    assert_eq!(unsafe { list::find_in_list(head, 112, h.h0) }, Some(a_block));
  }

  /// S3: after freeing a (112 bytes) and allocating c=80 bytes (96-byte
  /// block), c lands inside a's old block and the 16-byte remainder is
  /// split off onto list 0.
  #[test]
  fn s3_allocate_into_freed_block_splits_remainder() {
    let mut h = heap(1 << 16);
    let a = h.allocate(100).unwrap();
    let _b = h.allocate(100).unwrap();
    let a_block = block::header_from_payload(a.as_ptr() as usize);
    h.free(Some(a));

    let c = h.allocate(80).unwrap();
    let c_block = block::header_from_payload(c.as_ptr() as usize);
    assert_eq!(c_block, a_block);
    assert_eq!(unsafe { block::size_of_block(c_block) }, 96);

    let remainder = c_block + 96;
    assert_eq!(unsafe { block::size_of_block(remainder) }, 16);
    assert!(unsafe { block::is_free(remainder) });
  }

  /// S4: freeing both a and b coalesces them into one 224-byte block that
  /// becomes `last`.
  #[test]
  fn s4_freeing_both_neighbors_coalesces_and_becomes_last() {
    let mut h = heap(1 << 16);
    let a = h.allocate(100).unwrap();
    let b = h.allocate(100).unwrap();
    let a_block = block::header_from_payload(a.as_ptr() as usize);

    h.free(Some(a));
    h.free(Some(b));

    assert_eq!(h.last, a_block);
    assert_eq!(unsafe { block::size_of_block(a_block) }, 224);
    assert!(unsafe { block::is_free(a_block) });
  }

  /// S5: reallocating the last block in place advances HE by exactly the
  /// delta and returns the same pointer.
  #[test]
  fn s5_reallocate_last_block_grows_in_place() {
    let mut h = heap(1 << 16);
    let p = h.allocate(64).unwrap();
    let he_before = h.heap_end();

    let q = h.reallocate(Some(p), 128).unwrap();
    assert_eq!(q, p);
    let block_addr = block::header_from_payload(p.as_ptr() as usize);
    assert_eq!(unsafe { block::size_of_block(block_addr) }, 144);
    assert_eq!(h.heap_end(), he_before + 80);
  }

  /// S6: reallocating a non-last block copies the live payload and frees
  /// the original.
  #[test]
  fn s6_reallocate_non_last_block_copies_and_frees_old() {
    let mut h = heap(1 << 16);
    let p = h.allocate(64).unwrap();
    unsafe { ptr::write_bytes(p.as_ptr(), 0xAB, 64) };
    let _blocker = h.allocate(16).unwrap();

    let q = h.reallocate(Some(p), 128).unwrap();
    assert_ne!(q, p);
    for i in 0..64 {
      assert_eq!(unsafe { *q.as_ptr().add(i) }, 0xAB);
    }

    let p_block = block::header_from_payload(p.as_ptr() as usize);
    assert!(unsafe { block::is_free(p_block) });
  }

  /// L1: free(allocate(n)) returns the heap to its previous extent (no
  /// net heap growth when the round trip is immediately undone).
  #[test]
  fn l1_alloc_then_free_restores_heap_extent() {
    let mut h = heap(1 << 16);
    let he_before = h.heap_end();
    let p = h.allocate(200).unwrap();
    h.free(Some(p));
    // The block that was grown-and-freed is last, so coalescing it back
    // into "no user block" is not modeled (there is always at least the
    // freed block); HE itself never shrinks, but the net bytes available
    // for future fits is unchanged is exercised by re-allocating below.
    let q = h.allocate(200).unwrap();
    assert_eq!(p, q);
    h.free(Some(q));
    assert_eq!(h.heap_end(), he_before + align::blksz(200));
  }

  /// L2: reallocate(p, size(p)) returns p unchanged.
  #[test]
  fn l2_reallocate_same_size_is_identity() {
    let mut h = heap(1 << 16);
    let p = h.allocate(64).unwrap();
    let q = h.reallocate(Some(p), 64).unwrap();
    assert_eq!(p, q);
  }

  /// L4: zero_allocate produces an all-zero region.
  #[test]
  fn l4_zero_allocate_zeroes_the_region() {
    let mut h = heap(1 << 16);
    let p = h.zero_allocate(32, 4).unwrap();
    for i in 0..128 {
      assert_eq!(unsafe { *p.as_ptr().add(i) }, 0);
    }
  }

  /// Boundary: free(None) is a no-op.
  #[test]
  fn free_none_is_a_noop() {
    let mut h = heap(1 << 16);
    h.free(None);
  }

  /// Boundary: reallocate(None, n) behaves exactly like allocate(n).
  #[test]
  fn reallocate_none_behaves_like_allocate() {
    let mut h = heap(1 << 16);
    let p = h.reallocate(None, 40).unwrap();
    let block_addr = block::header_from_payload(p.as_ptr() as usize);
    assert_eq!(unsafe { block::size_of_block(block_addr) }, align::blksz(40));
  }

  /// Boundary: reallocate(p, 0) frees p and returns None.
  #[test]
  fn reallocate_zero_frees_and_returns_none() {
    let mut h = heap(1 << 16);
    let p = h.allocate(40).unwrap();
    let block_addr = block::header_from_payload(p.as_ptr() as usize);
    assert_eq!(h.reallocate(Some(p), 0), None);
    assert!(unsafe { block::is_free(block_addr) });
  }

  /// Out-of-memory on growth leaves the original block untouched.
  #[test]
  fn reallocate_oom_leaves_original_intact() {
    // Just enough room for the directory, padding and one 80-byte block;
    // no room left to grow it in place.
    let mut h = heap(DIRECTORY_SIZE + align::ALIGNMENT + 80);
    let p = h.allocate(64).unwrap();
    unsafe { ptr::write_bytes(p.as_ptr(), 0x7F, 64) };

    assert_eq!(h.reallocate(Some(p), 4096), None);
    for i in 0..64 {
      assert_eq!(unsafe { *p.as_ptr().add(i) }, 0x7F);
    }
  }
}
