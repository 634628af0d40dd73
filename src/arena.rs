//! Growable block arena.
//!
//! ```text
//!   Arena
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ blocks (arrival order)                                       │
//!   │                                                              │
//!   │  [0] ┌────┬──┬──────┬───────────────┐  initial_capacity      │
//!   │      │ A1 │░░│  A2  │     free      │                        │
//!   │      └────┴──┴──────┴───────────────┘                        │
//!   │                     ▲ head                                   │
//!   │  [1] ┌──────────────────┬───────────┐  max(size, block_size) │
//!   │      │        A3        │   free    │                        │
//!   │      └──────────────────┴───────────┘                        │
//!   │                         ▲ head                               │
//!   └──────────────────────────────────────────────────────────────┘
//!
//!   ░░ = alignment padding
//! ```
//!
//! Requests go to the first block (in arrival order) with room for the
//! aligned request; when none has room a new block is appended. Blocks
//! are never moved or freed before the arena is dropped, so pointers stay
//! valid until [`Arena::reset`], [`Arena::restore`] or drop.

use std::{
  cell::{Cell, RefCell},
  ptr::NonNull,
  sync::atomic::{AtomicUsize, Ordering},
};

use tracing::{debug, error, trace};

use crate::{
  align::DEFAULT_ALIGN,
  allocator::{Allocator, reallocate_by_copy},
  block::Block,
  config::ArenaConfig,
  error::{AllocError, CheckpointError, Result},
};

static NEXT_ARENA_ID: AtomicUsize = AtomicUsize::new(0);

/// Arena position captured by [`Arena::checkpoint`].
///
/// Restoring it discards every allocation made after it was taken. A
/// checkpoint that is dropped without being restored stays registered
/// until an older checkpoint is restored or the arena is reset.
#[derive(Debug)]
pub struct Checkpoint {
  arena: usize,
  seq: u64,
  heads: Vec<usize>,
}

impl Checkpoint {
  /// Bytes in use when the checkpoint was taken.
  pub fn used(&self) -> usize {
    self.heads.iter().sum()
  }
}

/// Growable arena made of a list of fixed-size blocks.
///
/// The arena is `Send` but not `Sync`: hand one to each thread rather
/// than sharing it.
///
/// Allocation takes `&self`; bulk reclamation ([`reset`](Arena::reset),
/// [`restore`](Arena::restore)) takes `&mut self`, so it cannot happen
/// while a borrower such as an [`Array`](crate::Array) is still alive.
///
/// `reallocate` extends the most recent allocation of a block in place
/// when there is room, otherwise it allocates afresh and copies.
/// `release` does nothing.
#[derive(Debug)]
pub struct Arena {
  id: usize,
  config: ArenaConfig,
  blocks: RefCell<Vec<Block>>,
  next_seq: Cell<u64>,
  /// Sequence numbers of checkpoints that can still be restored, oldest first.
  live: RefCell<Vec<u64>>,
}

impl Arena {
  /// Creates an arena whose first block holds `capacity` bytes.
  pub fn new(capacity: usize) -> Result<Self> {
    Self::with_config(ArenaConfig::new(capacity))
  }

  pub fn with_config(config: ArenaConfig) -> Result<Self> {
    let first = Block::new(config.initial_capacity)?;

    Ok(Self {
      id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
      config,
      blocks: RefCell::new(vec![first]),
      next_seq: Cell::new(0),
      live: RefCell::new(Vec::new()),
    })
  }

  pub fn config(&self) -> &ArenaConfig {
    &self.config
  }

  /// Index of the first block able to take `size` bytes, appending a new
  /// block when none can.
  fn block_for(
    &self,
    blocks: &mut Vec<Block>,
    size: usize,
  ) -> Result<usize> {
    if let Some(index) = blocks.iter().position(|b| b.fits(size, DEFAULT_ALIGN)) {
      return Ok(index);
    }

    let capacity = size.max(self.config.block_size);
    let block = Block::new(capacity).inspect_err(|_| {
      error!(requested = size, capacity, "arena failed to grow");
    })?;

    blocks.push(block);
    debug!(capacity, blocks = blocks.len(), "arena appended block");

    Ok(blocks.len() - 1)
  }

  /// Makes sure a following `allocate(size)` will not append a block.
  pub fn ensure_capacity(
    &self,
    size: usize,
  ) -> Result<()> {
    self.block_for(&mut self.blocks.borrow_mut(), size).map(|_| ())
  }

  /// Bytes consumed across all blocks, alignment padding included.
  pub fn query_capacity(&self) -> usize {
    self.blocks.borrow().iter().map(Block::head).sum()
  }

  /// Bytes of backing memory owned across all blocks.
  pub fn total_capacity(&self) -> usize {
    self.blocks.borrow().iter().map(Block::capacity).sum()
  }

  pub fn block_count(&self) -> usize {
    self.blocks.borrow().len()
  }

  /// Block index and block-relative offset of a pointer issued by this arena.
  pub fn locate(
    &self,
    ptr: NonNull<u8>,
  ) -> Option<(usize, usize)> {
    self
      .blocks
      .borrow()
      .iter()
      .enumerate()
      .find_map(|(index, block)| block.offset_of(ptr).map(|offset| (index, offset)))
  }

  /// Rewinds every block to empty. Blocks stay allocated, so the same
  /// sequence of requests yields the same addresses again.
  ///
  /// Every outstanding [`Checkpoint`] becomes stale.
  pub fn reset(&mut self) {
    for block in self.blocks.get_mut().iter_mut() {
      block.reset();
    }
    self.live.get_mut().clear();

    trace!(blocks = self.blocks.get_mut().len(), "arena reset");
  }

  /// Captures the current position of every block.
  pub fn checkpoint(&self) -> Checkpoint {
    let seq = self.next_seq.get();
    self.next_seq.set(seq + 1);
    self.live.borrow_mut().push(seq);

    Checkpoint {
      arena: self.id,
      seq,
      heads: self.blocks.borrow().iter().map(Block::head).collect(),
    }
  }

  /// Rolls the arena back to `checkpoint`.
  ///
  /// Blocks appended since the checkpoint are emptied but kept. The
  /// checkpoint is consumed and checkpoints taken after it become stale;
  /// take a new one to roll back to the same position again.
  pub fn restore(
    &mut self,
    checkpoint: Checkpoint,
  ) -> std::result::Result<(), CheckpointError> {
    if checkpoint.arena != self.id {
      return Err(CheckpointError::ForeignArena);
    }

    let live = self.live.get_mut();
    let Some(position) = live.iter().position(|&seq| seq == checkpoint.seq) else {
      return Err(CheckpointError::Stale);
    };
    live.truncate(position);

    for (index, block) in self.blocks.get_mut().iter_mut().enumerate() {
      block.rollback(checkpoint.heads.get(index).copied().unwrap_or(0));
    }

    trace!(seq = checkpoint.seq, used = checkpoint.used(), "arena restored");

    Ok(())
  }

  fn resize_in_place(
    &self,
    ptr: NonNull<u8>,
    old_size: usize,
    new_size: usize,
  ) -> bool {
    self
      .blocks
      .borrow_mut()
      .iter_mut()
      .find(|block| block.is_tail(ptr, old_size))
      .is_some_and(|block| block.resize_tail(ptr, old_size, new_size))
  }
}

impl Allocator for Arena {
  fn allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>> {
    let mut blocks = self.blocks.borrow_mut();
    let index = self.block_for(&mut blocks, size)?;

    blocks[index].bump(size, DEFAULT_ALIGN).ok_or_else(|| {
      error!(requested = size, "arena out of memory");
      AllocError::OutOfMemory { requested: size }
    })
  }

  unsafe fn reallocate(
    &self,
    old: Option<NonNull<u8>>,
    old_size: usize,
    new_size: usize,
  ) -> Result<NonNull<u8>> {
    if let Some(ptr) = old {
      if self.resize_in_place(ptr, old_size, new_size) {
        return Ok(ptr);
      }
    }

    unsafe { reallocate_by_copy(self, old, old_size, new_size) }
  }

  unsafe fn release(
    &self,
    _ptr: NonNull<u8>,
  ) {
  }
}
