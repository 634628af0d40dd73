//! Growable array over any [`Allocator`].

use std::{
  fmt,
  marker::PhantomData,
  mem,
  ops::{Deref, DerefMut},
  ptr::{self, NonNull},
  slice,
};

use crate::{
  align::DEFAULT_ALIGN,
  allocator::Allocator,
  error::{AllocError, Result},
};

/// Contiguous, growable sequence of `T` whose buffer comes from `A`.
///
/// Capacity doubles on overflow. Growth goes through
/// [`Allocator::reallocate`], so the buffer may move: element references
/// cannot be held across a push, which the borrow checker enforces.
///
/// The array borrows its allocator, so an arena cannot be reset while an
/// array built on it is alive. Dropping the array releases its buffer
/// (a no-op for arenas).
pub struct Array<'a, T: Copy, A: Allocator + ?Sized> {
  items: NonNull<T>,
  len: usize,
  cap: usize,
  allocator: &'a A,
  _marker: PhantomData<T>,
}

impl<'a, T: Copy, A: Allocator + ?Sized> Array<'a, T, A> {
  const ALIGN_OK: () = assert!(
    mem::align_of::<T>() <= DEFAULT_ALIGN,
    "element alignment exceeds what allocators guarantee"
  );

  /// Empty array; no memory is requested until the first push.
  pub fn new_in(allocator: &'a A) -> Self {
    let () = Self::ALIGN_OK;

    Self {
      items: NonNull::dangling(),
      len: 0,
      cap: 0,
      allocator,
      _marker: PhantomData,
    }
  }

  pub fn with_capacity_in(
    capacity: usize,
    allocator: &'a A,
  ) -> Result<Self> {
    let mut array = Self::new_in(allocator);
    array.reserve(capacity)?;
    Ok(array)
  }

  pub fn from_slice_in(
    items: &[T],
    allocator: &'a A,
  ) -> Result<Self> {
    let mut array = Self::with_capacity_in(items.len(), allocator)?;
    array.extend_from_slice(items)?;
    Ok(array)
  }

  fn bytes_for(count: usize) -> Result<usize> {
    count
      .checked_mul(mem::size_of::<T>())
      .ok_or(AllocError::SizeOverflow {
        count,
        element_size: mem::size_of::<T>(),
      })
  }

  /// Grows the buffer to exactly `capacity` elements if it is smaller.
  pub fn reserve(
    &mut self,
    capacity: usize,
  ) -> Result<()> {
    if capacity <= self.cap {
      return Ok(());
    }

    let new_size = Self::bytes_for(capacity)?;
    let buffer = if self.cap == 0 {
      self.allocator.allocate(new_size)?
    } else {
      let old_size = self.cap * mem::size_of::<T>();
      unsafe {
        self
          .allocator
          .reallocate(Some(self.items.cast()), old_size, new_size)?
      }
    };

    self.items = buffer.cast();
    self.cap = capacity;

    Ok(())
  }

  /// Appends `item`, doubling the capacity when full.
  pub fn push(
    &mut self,
    item: T,
  ) -> Result<()> {
    if self.len == self.cap {
      self.reserve(self.cap.saturating_mul(2).max(1))?;
    }

    unsafe { self.items.as_ptr().add(self.len).write(item) };
    self.len += 1;

    Ok(())
  }

  /// Appends every element of `items`.
  pub fn extend_from_slice(
    &mut self,
    items: &[T],
  ) -> Result<()> {
    let required = self
      .len
      .checked_add(items.len())
      .ok_or(AllocError::SizeOverflow {
        count: usize::MAX,
        element_size: mem::size_of::<T>(),
      })?;

    if required > self.cap {
      self.reserve(self.cap.saturating_mul(2).max(required))?;
    }

    unsafe {
      ptr::copy_nonoverlapping(items.as_ptr(), self.items.as_ptr().add(self.len), items.len())
    };
    self.len = required;

    Ok(())
  }

  /// Sets the length to `new_len`, filling new slots with `value`.
  ///
  /// Grows to exactly `new_len` when needed; shrinking keeps the capacity.
  pub fn resize(
    &mut self,
    new_len: usize,
    value: T,
  ) -> Result<()> {
    self.reserve(new_len)?;

    for index in self.len..new_len {
      unsafe { self.items.as_ptr().add(index).write(value) };
    }
    self.len = new_len;

    Ok(())
  }

  pub fn pop(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }

    self.len -= 1;
    Some(unsafe { self.items.as_ptr().add(self.len).read() })
  }

  pub fn last(&self) -> Option<&T> {
    self.as_slice().last()
  }

  pub fn last_mut(&mut self) -> Option<&mut T> {
    self.as_mut_slice().last_mut()
  }

  pub fn clear(&mut self) {
    self.len = 0;
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn capacity(&self) -> usize {
    self.cap
  }

  pub fn allocator(&self) -> &'a A {
    self.allocator
  }

  pub fn as_slice(&self) -> &[T] {
    unsafe { slice::from_raw_parts(self.items.as_ptr(), self.len) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    unsafe { slice::from_raw_parts_mut(self.items.as_ptr(), self.len) }
  }
}

impl<T: Copy, A: Allocator + ?Sized> Deref for Array<'_, T, A> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    self.as_slice()
  }
}

impl<T: Copy, A: Allocator + ?Sized> DerefMut for Array<'_, T, A> {
  fn deref_mut(&mut self) -> &mut [T] {
    self.as_mut_slice()
  }
}

impl<T: Copy + fmt::Debug, A: Allocator + ?Sized> fmt::Debug for Array<'_, T, A> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<T: Copy, A: Allocator + ?Sized> Drop for Array<'_, T, A> {
  fn drop(&mut self) {
    if self.cap > 0 {
      unsafe { self.allocator.release(self.items.cast()) };
    }
  }
}
