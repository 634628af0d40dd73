//! Alignment and size helpers shared by every allocation strategy.

use std::mem;

/// Native pointer width. Every pointer handed out by this crate is aligned to it.
pub const DEFAULT_ALIGN: usize = mem::size_of::<usize>();

const FALLBACK_PAGE_SIZE: usize = 4096;

/// Rounds a size or offset up to the machine word alignment.
///
/// # Examples
///
/// ```rust
/// use rarena::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + $crate::align::DEFAULT_ALIGN - 1) & !($crate::align::DEFAULT_ALIGN - 1)
  };
}

/// Returns `true` if `n` is a power of two. Zero is not.
pub const fn is_power_of_two(n: usize) -> bool {
  n != 0 && (n & (n - 1)) == 0
}

/// Rounds `n` up to the next power of two.
///
/// Powers of two are returned unchanged and zero rounds up to one.
/// Returns `None` when the result does not fit in a `usize`.
pub const fn next_power_of_two(n: usize) -> Option<usize> {
  if n <= 1 {
    return Some(1);
  }
  if is_power_of_two(n) {
    return Some(n);
  }

  let shift = usize::BITS - (n - 1).leading_zeros();
  if shift >= usize::BITS {
    return None;
  }

  Some(1 << shift)
}

/// Moves `addr` forward to the next multiple of `align`.
///
/// # Panics
///
/// Panics if `align` is not a power of two.
pub fn align_forward(
  addr: usize,
  align: usize,
) -> usize {
  assert!(
    is_power_of_two(align),
    "alignment must be a power of two, got {align}"
  );

  let rem = addr & (align - 1);
  if rem == 0 { addr } else { addr + (align - rem) }
}

/// Bytes skipped between `addr` and the next `align` boundary.
pub fn padding_for(
  addr: usize,
  align: usize,
) -> usize {
  align_forward(addr, align) - addr
}

pub const fn kb(n: usize) -> usize {
  n << 10
}

pub const fn mb(n: usize) -> usize {
  n << 20
}

pub const fn gb(n: usize) -> usize {
  n << 30
}

/// Size of a virtual memory page as reported by the OS.
pub fn page_size() -> usize {
  #[cfg(unix)]
  {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
      return size as usize;
    }
  }

  FALLBACK_PAGE_SIZE
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn test_align() {
    let ptr_size = mem::size_of::<usize>();

    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ptr_size * i + 1)..=(ptr_size * (i + 1));

      let expected_alignment = ptr_size * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
      }
    }

    assert_eq!(align!(0), 0);
  }

  #[test]
  fn power_of_two() {
    assert!(!is_power_of_two(0));
    assert!(is_power_of_two(1));
    assert!(is_power_of_two(2));
    assert!(!is_power_of_two(3));
    assert!(is_power_of_two(4096));
    assert!(!is_power_of_two(4097));
    assert!(is_power_of_two(1 << (usize::BITS - 1)));
  }

  #[test]
  fn next_power() {
    assert_eq!(next_power_of_two(0), Some(1));
    assert_eq!(next_power_of_two(1), Some(1));
    assert_eq!(next_power_of_two(3), Some(4));
    assert_eq!(next_power_of_two(8), Some(8));
    assert_eq!(next_power_of_two(9), Some(16));
    assert_eq!(next_power_of_two(1 << (usize::BITS - 1)), Some(1 << (usize::BITS - 1)));
    assert_eq!(next_power_of_two((1 << (usize::BITS - 1)) + 1), None);
  }

  #[test]
  fn align_forward_rounds_up() {
    assert_eq!(align_forward(0, 8), 0);
    assert_eq!(align_forward(1, 8), 8);
    assert_eq!(align_forward(8, 8), 8);
    assert_eq!(align_forward(13, 4), 16);
    assert_eq!(align_forward(0x1001, 0x1000), 0x2000);
    assert_eq!(padding_for(10, 8), 6);
    assert_eq!(padding_for(16, 8), 0);
  }

  #[test]
  #[should_panic(expected = "power of two")]
  fn align_forward_rejects_bad_alignment() {
    align_forward(10, 6);
  }

  #[test]
  fn size_helpers() {
    assert_eq!(kb(1), 1024);
    assert_eq!(kb(64), 65536);
    assert_eq!(mb(1), 1024 * 1024);
    assert_eq!(gb(2), 2 * 1024 * 1024 * 1024);
  }

  #[test]
  fn page_size_is_sane() {
    let size = page_size();
    assert!(is_power_of_two(size));
    assert!(size >= 512);
  }

  proptest! {
    #[test]
    fn aligned_address_is_minimal(
      addr in 0usize..(1 << 40),
      shift in 0u32..16,
    ) {
      let align = 1usize << shift;
      let aligned = align_forward(addr, align);
      prop_assert_eq!(aligned % align, 0);
      prop_assert!(aligned >= addr);
      prop_assert!(aligned - addr < align);
    }

    #[test]
    fn next_power_is_not_below(n in 0usize..(1 << 40)) {
      let p = next_power_of_two(n).unwrap();
      prop_assert!(is_power_of_two(p));
      prop_assert!(p >= n);
      prop_assert!(p / 2 < n.max(1));
    }
  }
}
