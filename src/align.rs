//! Alignment constants and helpers.
//!
//! Every address of interest in the heap is aligned to [`ALIGNMENT`] bytes;
//! every block size is a multiple of it. The teacher crate's `align!` macro
//! rounded a raw byte count up to the machine word (`mem::size_of::<usize>()`);
//! this allocator needs a fixed 16-byte alignment regardless of pointer
//! width, so the same rounding idea is kept as a plain `const fn` over a
//! pinned constant instead of a macro over the pointer width.

/// Required alignment for every payload pointer and block size, in bytes.
pub const ALIGNMENT: usize = 16;

/// Minimum block size: header (4) + prev-link (4) + next-link (4) + footer (4).
pub const MIN_BLOCK_SIZE: usize = 16;

/// Number of free lists in the directory: 8 constant-size lists plus 3
/// segmented lists.
pub const CONST_LISTS: usize = 8;
pub const SEGMENT_LISTS: usize = 3;
pub const FREE_LISTS: usize = CONST_LISTS + SEGMENT_LISTS;

/// Rounds `value` up to the nearest multiple of [`ALIGNMENT`].
///
/// # Examples
///
/// ```
/// use rallocator::align::align_up;
/// assert_eq!(align_up(13), 16);
/// assert_eq!(align_up(16), 16);
/// assert_eq!(align_up(17), 32);
/// ```
#[inline]
pub const fn align_up(value: usize) -> usize {
  (value + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// Computes the on-heap block size for a `requested_bytes` payload request:
/// header + footer overhead (8 bytes) plus the payload, rounded up to
/// [`ALIGNMENT`].
#[inline]
pub const fn blksz(requested_bytes: usize) -> usize {
  align_up(requested_bytes + 2 * TAG_SIZE)
}

/// Size in bytes of a single boundary tag (header or footer word).
pub const TAG_SIZE: usize = 4;
