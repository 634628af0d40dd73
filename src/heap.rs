//! Passthrough to the process-wide C allocator.

use std::ptr::{self, NonNull};

use libc::{c_void, calloc, free, realloc};
use tracing::error;

use crate::{
  allocator::Allocator,
  error::{AllocError, Result},
};

/// Stateless adapter over `calloc`/`realloc`/`free`.
///
/// Use it for long-lived objects that are released one by one, where the
/// bulk lifetime of an arena does not fit. The alignment is whatever
/// `malloc` guarantees, which covers the native pointer width on every
/// supported platform.
#[derive(Clone, Copy, Debug, Default)]
pub struct Heap;

impl Allocator for Heap {
  fn allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    // calloc(0) may legitimately return null; ask for a byte instead.
    let raw = unsafe { calloc(1, size.max(1)) } as *mut u8;

    NonNull::new(raw).ok_or_else(|| out_of_memory(size))
  }

  unsafe fn reallocate(
    &self,
    old: Option<NonNull<u8>>,
    old_size: usize,
    new_size: usize,
  ) -> Result<NonNull<u8>> {
    let Some(old) = old else {
      return self.allocate(new_size);
    };

    let raw = unsafe { realloc(old.as_ptr() as *mut c_void, new_size.max(1)) } as *mut u8;
    let new = NonNull::new(raw).ok_or_else(|| out_of_memory(new_size))?;

    if new_size > old_size {
      unsafe { ptr::write_bytes(new.as_ptr().add(old_size), 0, new_size - old_size) };
    }

    Ok(new)
  }

  unsafe fn release(
    &self,
    ptr: NonNull<u8>,
  ) {
    unsafe { free(ptr.as_ptr() as *mut c_void) };
  }
}

fn out_of_memory(requested: usize) -> AllocError {
  error!(requested, "heap allocation failed");
  AllocError::OutOfMemory { requested }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::align::DEFAULT_ALIGN;

  #[test]
  fn allocate_returns_zeroed_aligned_memory() {
    let heap = Heap;

    unsafe {
      let ptr = heap.allocate(100).unwrap();
      assert_eq!(ptr.as_ptr() as usize % DEFAULT_ALIGN, 0);

      let bytes = std::slice::from_raw_parts(ptr.as_ptr(), 100);
      assert!(bytes.iter().all(|&b| b == 0));

      heap.release(ptr);
    }
  }

  #[test]
  fn zero_sized_requests_get_distinct_pointers() {
    let heap = Heap;

    let first = heap.allocate(0).unwrap();
    let second = heap.allocate(0).unwrap();
    assert_ne!(first, second);

    unsafe {
      heap.release(first);
      heap.release(second);
    }
  }

  #[test]
  fn reallocate_preserves_and_zeroes_tail() {
    let heap = Heap;

    unsafe {
      let ptr = heap.allocate(4).unwrap();
      ptr.as_ptr().copy_from_nonoverlapping([9u8, 8, 7, 6].as_ptr(), 4);

      let grown = heap.reallocate(Some(ptr), 4, 4096).unwrap();
      let bytes = std::slice::from_raw_parts(grown.as_ptr(), 4096);
      assert_eq!(&bytes[..4], &[9, 8, 7, 6]);
      assert!(bytes[4..].iter().all(|&b| b == 0));

      let shrunk = heap.reallocate(Some(grown), 4096, 2).unwrap();
      assert_eq!(std::slice::from_raw_parts(shrunk.as_ptr(), 2), &[9, 8]);

      heap.release(shrunk);
    }
  }

  #[test]
  fn reallocate_without_old_pointer_allocates() {
    let heap = Heap;

    unsafe {
      let ptr = heap.reallocate(None, 0, 16).unwrap();
      let bytes = std::slice::from_raw_parts(ptr.as_ptr(), 16);
      assert!(bytes.iter().all(|&b| b == 0));
      heap.release(ptr);
    }
  }

  #[test]
  fn impossible_request_reports_out_of_memory() {
    let heap = Heap;

    assert_eq!(
      heap.allocate(usize::MAX),
      Err(AllocError::OutOfMemory {
        requested: usize::MAX
      })
    );
  }
}
