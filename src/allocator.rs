//! The allocation contract shared by every strategy.

use std::ptr::{self, NonNull};

use crate::error::Result;

/// A source of raw memory.
///
/// Implemented by [`Heap`](crate::Heap), [`Arena`](crate::Arena) and
/// [`ScratchArena`](crate::ScratchArena). Consumers take an `&A` (or an
/// `&dyn Allocator`) and never assume a concrete strategy.
///
/// Every pointer returned is aligned to [`DEFAULT_ALIGN`](crate::align::DEFAULT_ALIGN)
/// and the region is zero-initialised. The allocator must outlive every
/// pointer it hands out that the caller still uses.
pub trait Allocator {
  /// Returns a zeroed region of at least `size` bytes.
  fn allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>>;

  /// Returns a region of at least `new_size` bytes holding the first
  /// `min(old_size, new_size)` bytes of `old`. Bytes past `old_size` are zeroed.
  ///
  /// Passing `None` is the same as calling [`Allocator::allocate`]. The old
  /// pointer must not be used after a successful call.
  ///
  /// # Safety
  ///
  /// `old` must have been returned by this allocator and still be live, and
  /// `old_size` must not exceed the size it was last requested with.
  unsafe fn reallocate(
    &self,
    old: Option<NonNull<u8>>,
    old_size: usize,
    new_size: usize,
  ) -> Result<NonNull<u8>>;

  /// Hands a region back. Arenas ignore this; memory returns in bulk.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by this allocator and not released since.
  unsafe fn release(
    &self,
    ptr: NonNull<u8>,
  );
}

/// Reallocation for strategies that cannot grow a region in place:
/// allocate a fresh region and copy the preserved prefix across.
///
/// # Safety
///
/// Same contract as [`Allocator::reallocate`].
pub(crate) unsafe fn reallocate_by_copy<A: Allocator + ?Sized>(
  allocator: &A,
  old: Option<NonNull<u8>>,
  old_size: usize,
  new_size: usize,
) -> Result<NonNull<u8>> {
  let new = allocator.allocate(new_size)?;

  if let Some(old) = old {
    let preserved = old_size.min(new_size);
    // Fresh regions never overlap live ones.
    unsafe { ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), preserved) };
  }

  Ok(new)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Arena, Heap, ScratchArena, align::DEFAULT_ALIGN};

  fn fill_and_check(allocator: &dyn Allocator) {
    let ptr = allocator.allocate(32).unwrap();
    assert_eq!(ptr.as_ptr() as usize % DEFAULT_ALIGN, 0);

    unsafe {
      let bytes = std::slice::from_raw_parts_mut(ptr.as_ptr(), 32);
      assert!(bytes.iter().all(|&b| b == 0));
      bytes.fill(0x5A);
      assert!(bytes.iter().all(|&b| b == 0x5A));
      allocator.release(ptr);
    }
  }

  #[test]
  fn every_strategy_works_behind_dyn() {
    let heap = Heap;
    let arena = Arena::new(256).unwrap();
    let scratch = ScratchArena::new(256).unwrap();

    let strategies: [&dyn Allocator; 3] = [&heap, &arena, &scratch];
    for allocator in strategies {
      fill_and_check(allocator);
    }
  }

  #[test]
  fn reallocate_by_copy_preserves_prefix() {
    let arena = Arena::new(256).unwrap();
    let old = arena.allocate(8).unwrap();
    unsafe {
      old.as_ptr().copy_from_nonoverlapping([1u8, 2, 3, 4, 5, 6, 7, 8].as_ptr(), 8);

      let new = reallocate_by_copy(&arena, Some(old), 8, 4).unwrap();
      assert_ne!(new, old);
      assert_eq!(std::slice::from_raw_parts(new.as_ptr(), 4), &[1, 2, 3, 4]);
    }
  }
}
