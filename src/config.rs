//! Growable arena configuration.

use crate::align::{kb, page_size};

/// Sizing parameters for an [`Arena`](crate::Arena).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
  /// Capacity in bytes of the block allocated when the arena is created.
  pub initial_capacity: usize,

  /// Minimum capacity in bytes of every block appended on growth.
  ///
  /// A request larger than this gets a block sized to exactly the request.
  /// Default: one OS page.
  pub block_size: usize,
}

impl ArenaConfig {
  /// Initial capacity used by [`ArenaConfig::default`]: 64 KiB.
  pub const DEFAULT_INITIAL_CAPACITY: usize = kb(64);

  pub fn new(initial_capacity: usize) -> Self {
    Self {
      initial_capacity,
      block_size: page_size(),
    }
  }

  pub fn with_block_size(
    mut self,
    block_size: usize,
  ) -> Self {
    self.block_size = block_size;
    self
  }
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self::new(Self::DEFAULT_INITIAL_CAPACITY)
  }
}
