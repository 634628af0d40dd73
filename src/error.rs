//! Error types for allocation and checkpoint operations.

/// Result type for allocation operations.
pub type Result<T> = std::result::Result<T, AllocError>;

/// Recoverable allocation failures.
///
/// Fatal conditions (scratch arena overflow, invalid alignment) are not
/// represented here; they panic at the call site.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
  /// The system allocator could not provide the backing memory.
  #[error("out of memory: requested {requested} bytes")]
  OutOfMemory { requested: usize },

  /// The strategy does not implement the operation.
  #[error("{strategy} allocator does not support {operation}")]
  Unsupported {
    strategy: &'static str,
    operation: &'static str,
  },

  /// An element count whose byte size does not fit in a `usize`.
  #[error("size overflow: {count} elements of {element_size} bytes")]
  SizeOverflow { count: usize, element_size: usize },
}

/// Reasons a [`Checkpoint`](crate::Checkpoint) cannot be restored.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CheckpointError {
  #[error("checkpoint belongs to a different arena")]
  ForeignArena,

  #[error("checkpoint was invalidated by a reset or an earlier restore")]
  Stale,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_failure() {
    let err = AllocError::OutOfMemory { requested: 128 };
    assert_eq!(err.to_string(), "out of memory: requested 128 bytes");

    let err = AllocError::Unsupported {
      strategy: "scratch",
      operation: "reallocate",
    };
    assert_eq!(err.to_string(), "scratch allocator does not support reallocate");

    let err = AllocError::SizeOverflow {
      count: usize::MAX,
      element_size: 8,
    };
    assert!(err.to_string().starts_with("size overflow"));
  }
}
