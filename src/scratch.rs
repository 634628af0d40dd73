//! Fixed-capacity scratch arena for bounded units of work.
//!
//! A [`ScratchArena`] is sized up front for a frame, a request or a
//! parsing pass, bumped through, then [`reset`](ScratchArena::reset)
//! before the next one. It never grows: running out of room means the
//! caller sized it wrong, so overflow panics instead of returning an
//! error.

use std::{cell::Cell, ptr::NonNull};

use tracing::error;

use crate::{
  align,
  align::DEFAULT_ALIGN,
  allocator::Allocator,
  error::{AllocError, Result},
  heap::Heap,
};

/// Single-buffer bump allocator.
#[derive(Debug)]
pub struct ScratchArena {
  data: NonNull<u8>,
  capacity: usize,
  head: Cell<usize>,
}

impl ScratchArena {
  pub fn new(capacity: usize) -> Result<Self> {
    let data = Heap.allocate(capacity)?;
    // Offsets are word-aligned with `align!`, which only works on an aligned base.
    debug_assert_eq!(data.as_ptr() as usize % DEFAULT_ALIGN, 0);

    Ok(Self {
      data,
      capacity,
      head: Cell::new(0),
    })
  }

  /// Bumps out `size` zeroed bytes.
  ///
  /// # Panics
  ///
  /// Panics, before touching memory, if the request does not fit in the
  /// remaining capacity. Under the default `panic = "unwind"` profile the
  /// panic can be caught and the arena is left as it was; build with
  /// `panic = "abort"` to have overflow terminate the process.
  pub fn allocate(
    &self,
    size: usize,
  ) -> NonNull<u8> {
    let head = self.head.get();
    let start = align!(head);

    let Some(end) = start.checked_add(size).filter(|&end| end <= self.capacity) else {
      error!(
        requested = size,
        used = head,
        capacity = self.capacity,
        "scratch arena overflow"
      );
      panic!(
        "scratch arena overflow: {size} bytes requested, {} of {} bytes free",
        self.capacity - head,
        self.capacity
      );
    };

    self.head.set(end);

    unsafe {
      let ptr = self.data.add(start);
      ptr.as_ptr().write_bytes(0, size);
      ptr
    }
  }

  /// Makes the whole buffer available again.
  pub fn reset(&mut self) {
    self.head.set(0);
  }

  pub fn used(&self) -> usize {
    self.head.get()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn remaining(&self) -> usize {
    self.capacity - self.head.get()
  }
}

impl Allocator for ScratchArena {
  fn allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    Ok(ScratchArena::allocate(self, size))
  }

  unsafe fn reallocate(
    &self,
    old: Option<NonNull<u8>>,
    _old_size: usize,
    new_size: usize,
  ) -> Result<NonNull<u8>> {
    if old.is_none() {
      return Ok(ScratchArena::allocate(self, new_size));
    }

    error!(requested = new_size, "scratch arena cannot reallocate");
    Err(AllocError::Unsupported {
      strategy: "scratch",
      operation: "reallocate",
    })
  }

  unsafe fn release(
    &self,
    _ptr: NonNull<u8>,
  ) {
  }
}

// SAFETY: the buffer is owned exclusively by the arena and only reached
// through it, so moving the arena to another thread moves sole ownership.
unsafe impl Send for ScratchArena {}

impl Drop for ScratchArena {
  fn drop(&mut self) {
    unsafe { Heap.release(self.data) };
  }
}
