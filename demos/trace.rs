//! A small interactive walkthrough of the segregated-fit allocator,
//! adapted from the teacher crate's `examples/bump.rs`: it pauses between
//! steps so you can inspect the process with `pmap`/`gdb` and watch the
//! program break move, plus demonstrates block reuse, splitting,
//! coalescing and the grow-last realloc fast path.
//!
//! Run with: `cargo run --example trace --features sbrk`

use std::io::Read;

use rallocator::Heap;

fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn main() {
  env_logger::init();

  let mut heap = Heap::new().expect("sbrk has room to initialize the directory");

  println!("[0] Heap initialized, H0 = {:#x}, HE = {:#x}", heap.heap_start(), heap.heap_end());
  block_until_enter_pressed();

  // 1) Two 100-byte allocations land in adjacent 112-byte blocks.
  let a = heap.allocate(100).expect("heap has room");
  let b = heap.allocate(100).expect("heap has room");
  println!("\n[1] allocate(100) twice -> a = {:?}, b = {:?}", a, b);
  block_until_enter_pressed();

  // 2) Freeing a alone: no coalescing since b (USED) sits to its right.
  heap.free(Some(a));
  println!("\n[2] free(a): a's block is free, b is untouched, no merge yet");
  block_until_enter_pressed();

  // 3) Allocating something smaller than a's freed block splits it.
  let c = heap.allocate(80).expect("fits inside a's old block");
  println!("\n[3] allocate(80) -> c = {:?} (reuses a's block, splits the remainder)", c);
  println!("    c == a? {}", c == a);
  block_until_enter_pressed();

  // 4) Freeing both of the two original blocks merges them into one.
  heap.free(Some(c));
  heap.free(Some(b));
  println!("\n[4] free(c); free(b): adjacent free blocks coalesce into one");
  block_until_enter_pressed();

  // 5) Reallocating the heap's last block grows it in place, no copy.
  let p = heap.allocate(64).expect("heap has room");
  let he_before = heap.heap_end();
  let q = heap.reallocate(Some(p), 128).expect("sbrk has room to grow");
  println!(
    "\n[5] reallocate(p, 128) on the last block: q == p? {} (HE advanced by {} bytes)",
    q == p,
    heap.heap_end() - he_before
  );
  block_until_enter_pressed();

  // 6) Reallocating a non-last block copies into a fresh allocation.
  let _blocker = heap.allocate(16).expect("heap has room");
  let r = heap.reallocate(Some(q), 256).expect("sbrk has room");
  println!("\n[6] reallocate(q, 256), now not last: r == q? {}", r == q);

  println!("\n[7] End of demo. HE = {:#x}", heap.heap_end());
}
