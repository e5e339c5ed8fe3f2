//! # rallocator - a segregated-fit heap allocator
//!
//! A general-purpose dynamic memory allocator managing a single contiguous,
//! monotonically-growable heap region supplied by a "more-core" primitive
//! (the moral equivalent of `sbrk`). The four classical operations
//! ([`Heap::allocate`], [`Heap::free`], [`Heap::reallocate`],
//! [`Heap::zero_allocate`]) are built on top of an on-heap block format
//! with boundary tags, an 11-list segregated free-list directory guarded
//! by sentinel blocks, first-fit placement, split-on-allocate, and
//! coalesce-on-free.
//!
//! ## Overview
//!
//! ```text
//!   Heap layout (growing rightward, never shrinking):
//!
//!   ┌───────┬──────────────────────┬───────────────┬───┬───────────────┐
//!   │padding│  11 sentinel pairs   │  user block   │...│  user block   │
//!   │       │  (free-list guards)  │ (header/data/ │   │    (last)     │
//!   │       │                      │    footer)    │   │               │
//!   └───────┴──────────────────────┴───────────────┴───┴───────────────┘
//!   H0 starts at the first sentinel pair.           HE = last + size(last)
//! ```
//!
//! Every address of interest is 16-byte aligned; free-list links are
//! 32-bit offsets from `H0` rather than absolute addresses (see
//! [`offset::Link`]), which halves link overhead at the cost of capping
//! heaps at 2^32 bytes.
//!
//! ## Crate structure
//!
//! ```text
//!   rallocator
//!   ├── align      - alignment constants and rounding helpers
//!   ├── offset     - free-list links as tagged H0-relative offsets
//!   ├── block      - boundary-tag primitives over one block's address
//!   ├── classifier - list_for(size): request -> directory index
//!   ├── list       - the sentinel-guarded segregated free-list directory
//!   ├── placement  - first-fit-within-class, ascending-class fallback
//!   ├── engine     - split-on-allocate, coalesce-on-free
//!   ├── growth     - the MoreCore collaborator and heap-growth controller
//!   ├── heap       - Heap<S>: allocate / free / reallocate / zero_allocate
//!   ├── error      - ConsistencyError, the debug checker's typed failures
//!   └── checker    - the opt-in invariant checker (spec P1-P7)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use rallocator::Heap;
//!
//! let mut heap = Heap::new().expect("sbrk has room to initialize");
//! unsafe {
//!     let p = heap.allocate(100).expect("heap has room");
//!     p.as_ptr().write_bytes(0xAB, 100);
//!     heap.free(Some(p));
//! }
//! ```
//!
//! ## Non-goals
//!
//! Thread safety, releasing memory back to the OS, alignment stricter
//! than 16 bytes, heaps larger than 2^32 bytes, best-fit or
//! address-ordered placement policies. See `SPEC_FULL.md` for the full
//! rationale.

pub mod align;
mod block;
pub mod checker;
pub mod classifier;
mod engine;
pub mod error;
pub mod growth;
mod heap;
mod list;
pub mod offset;
mod placement;

pub use heap::Heap;
