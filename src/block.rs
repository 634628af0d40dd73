use std::ptr::{self, NonNull};

use crate::{
  align::padding_for,
  allocator::Allocator,
  error::Result,
  heap::Heap,
};

/// One fixed-capacity buffer inside an [`Arena`](crate::Arena).
///
/// The buffer comes from [`Heap`] and is never resized or moved, so every
/// pointer bumped out of it stays put until the block is dropped.
#[derive(Debug)]
pub(crate) struct Block {
  data: NonNull<u8>,
  capacity: usize,
  head: usize,
}

impl Block {
  pub fn new(capacity: usize) -> Result<Self> {
    Ok(Self {
      data: Heap.allocate(capacity)?,
      capacity,
      head: 0,
    })
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn head(&self) -> usize {
    self.head
  }

  fn base(&self) -> usize {
    self.data.as_ptr() as usize
  }

  fn padding(
    &self,
    align: usize,
  ) -> usize {
    padding_for(self.base() + self.head, align)
  }

  /// Whether `size` bytes fit after aligning the head to `align`.
  pub fn fits(
    &self,
    size: usize,
    align: usize,
  ) -> bool {
    self
      .padding(align)
      .checked_add(size)
      .is_some_and(|needed| needed <= self.capacity - self.head)
  }

  /// Reserves `size` zeroed bytes aligned to `align`.
  pub fn bump(
    &mut self,
    size: usize,
    align: usize,
  ) -> Option<NonNull<u8>> {
    if !self.fits(size, align) {
      return None;
    }

    let offset = self.head + self.padding(align);
    self.head = offset + size;

    unsafe {
      let ptr = self.data.add(offset);
      ptr::write_bytes(ptr.as_ptr(), 0, size);
      Some(ptr)
    }
  }

  /// Block-relative offset of `ptr`, if it points into this block.
  pub fn offset_of(
    &self,
    ptr: NonNull<u8>,
  ) -> Option<usize> {
    let addr = ptr.as_ptr() as usize;
    let base = self.base();

    (addr >= base && addr <= base + self.capacity).then(|| addr - base)
  }

  /// Whether the region `[ptr, ptr + size)` is the last one reserved here.
  pub fn is_tail(
    &self,
    ptr: NonNull<u8>,
    size: usize,
  ) -> bool {
    self
      .offset_of(ptr)
      .is_some_and(|offset| offset + size == self.head)
  }

  /// Grows or shrinks the tail region in place. Fails if `ptr` is not the
  /// tail or the block has no room left.
  pub fn resize_tail(
    &mut self,
    ptr: NonNull<u8>,
    old_size: usize,
    new_size: usize,
  ) -> bool {
    if !self.is_tail(ptr, old_size) {
      return false;
    }

    let offset = self.head - old_size;
    if new_size > self.capacity - offset {
      return false;
    }

    if new_size > old_size {
      unsafe { ptr::write_bytes(ptr.as_ptr().add(old_size), 0, new_size - old_size) };
    }
    self.head = offset + new_size;

    true
  }

  /// Sets the head to a recorded position. The tail may have been resized
  /// in place since it was recorded, so `head` can lie on either side.
  pub fn rollback(
    &mut self,
    head: usize,
  ) {
    self.head = head.min(self.capacity);
  }

  pub fn reset(&mut self) {
    self.head = 0;
  }
}

// SAFETY: the buffer is owned exclusively by the block and only reached
// through it, so moving the block to another thread moves sole ownership.
unsafe impl Send for Block {}

impl Drop for Block {
  fn drop(&mut self) {
    unsafe { Heap.release(self.data) };
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::align::DEFAULT_ALIGN;

  #[test]
  fn bump_pads_to_alignment() {
    let mut block = Block::new(64).unwrap();

    let first = block.bump(3, DEFAULT_ALIGN).unwrap();
    assert_eq!(block.offset_of(first), Some(0));
    assert_eq!(block.head(), 3);

    let second = block.bump(8, DEFAULT_ALIGN).unwrap();
    assert_eq!(block.offset_of(second), Some(DEFAULT_ALIGN));
    assert_eq!(block.head(), DEFAULT_ALIGN + 8);
  }

  #[test]
  fn bump_refuses_when_full() {
    let mut block = Block::new(16).unwrap();

    assert!(block.bump(16, DEFAULT_ALIGN).is_some());
    assert!(!block.fits(1, DEFAULT_ALIGN));
    assert!(block.bump(1, DEFAULT_ALIGN).is_none());
    assert!(block.fits(0, DEFAULT_ALIGN));
  }

  #[test]
  fn padding_counts_against_capacity() {
    let mut block = Block::new(16).unwrap();

    block.bump(1, DEFAULT_ALIGN).unwrap();
    assert!(block.fits(16 - DEFAULT_ALIGN, DEFAULT_ALIGN));
    assert!(!block.fits(16 - DEFAULT_ALIGN + 1, DEFAULT_ALIGN));
  }

  #[test]
  fn tail_resizes_in_place() {
    let mut block = Block::new(64).unwrap();

    let first = block.bump(8, DEFAULT_ALIGN).unwrap();
    let second = block.bump(8, DEFAULT_ALIGN).unwrap();

    assert!(!block.resize_tail(first, 8, 16));
    assert!(block.resize_tail(second, 8, 32));
    assert_eq!(block.head(), 8 + 32);

    assert!(!block.resize_tail(second, 32, 64));
    assert!(block.resize_tail(second, 32, 4));
    assert_eq!(block.head(), 8 + 4);
  }

  #[test]
  fn rollback_sets_head_either_way() {
    let mut block = Block::new(64).unwrap();
    let ptr = block.bump(8, DEFAULT_ALIGN).unwrap();

    assert!(block.resize_tail(ptr, 8, 4));
    block.rollback(8);
    assert_eq!(block.head(), 8);

    assert!(block.resize_tail(ptr, 8, 40));
    block.rollback(8);
    assert_eq!(block.head(), 8);
  }

  #[test]
  fn reset_keeps_the_buffer() {
    let mut block = Block::new(32).unwrap();

    let before = block.bump(32, DEFAULT_ALIGN).unwrap();
    block.reset();
    assert_eq!(block.head(), 0);

    let after = block.bump(32, DEFAULT_ALIGN).unwrap();
    assert_eq!(before, after);
  }
}
