//! # rarena - Pluggable Allocators and Arenas
//!
//! This crate provides a small memory-management core: one [`Allocator`]
//! trait, three strategies implementing it, and a growable [`Array`] that
//! runs on any of them.
//!
//! ## Overview
//!
//! ```text
//!   Allocator Strategies:
//!
//!   ┌────────────────┬──────────────────────────┬─────────────────────────┐
//!   │ Strategy       │ Backing memory           │ Reclaimed               │
//!   ├────────────────┼──────────────────────────┼─────────────────────────┤
//!   │ Heap           │ calloc/realloc/free      │ per pointer (release)   │
//!   │ Arena          │ list of growable blocks  │ reset / restore / drop  │
//!   │ ScratchArena   │ one fixed buffer         │ reset / drop            │
//!   └────────────────┴──────────────────────────┴─────────────────────────┘
//!
//!   Callers hold an `&impl Allocator` (or `&dyn Allocator`) and pass it
//!   explicitly. There is no global default.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rarena
//!   ├── align      - Alignment helpers (align!, align_forward, page_size)
//!   ├── allocator  - The Allocator trait
//!   ├── heap       - Heap passthrough to the C allocator
//!   ├── block      - Arena block (internal)
//!   ├── arena      - Growable Arena with checkpoints
//!   ├── config     - ArenaConfig
//!   ├── scratch    - Fixed-capacity ScratchArena
//!   ├── array      - Array<T, A>
//!   └── error      - AllocError, CheckpointError
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rarena::{Allocator, Arena, Array};
//!
//! let mut arena = Arena::new(4096).unwrap();
//!
//! {
//!     let mut numbers = Array::new_in(&arena);
//!     for i in 0..100u32 {
//!         numbers.push(i).unwrap();
//!     }
//!     assert_eq!(numbers.last(), Some(&99));
//!
//!     let raw = arena.allocate(24).unwrap();
//!     assert_eq!(raw.as_ptr() as usize % rarena::align::DEFAULT_ALIGN, 0);
//! }
//!
//! // Everything handed out above is reclaimed at once.
//! arena.reset();
//! assert_eq!(arena.query_capacity(), 0);
//! ```
//!
//! ## How the Arena Grows
//!
//! ```text
//!   Arena::new(64), then allocate(10), allocate(60):
//!
//!   block 0  ┌──────────┬──────────────────────────────────────┐ 64 bytes
//!            │  10 B    │  54 B free (60 + padding won't fit)  │
//!            └──────────┴──────────────────────────────────────┘
//!   block 1  ┌──────────────────────────────┬──────────────────┐ max(60, page)
//!            │            60 B              │       free       │
//!            └──────────────────────────────┴──────────────────┘
//!
//!   query_capacity() == 70
//! ```
//!
//! Blocks are never moved, so a pointer from an [`Arena`] stays valid until
//! the arena is reset, restored to an earlier [`Checkpoint`], or dropped.
//!
//! ## Failure Policy
//!
//! - [`Heap`] and [`Arena`] report exhaustion as [`AllocError`] and log it
//!   through `tracing`; the caller decides what to do.
//! - [`ScratchArena`] panics on overflow: it is sized up front, so running
//!   out means the caller sized it wrong. The panic unwinds unless the
//!   binary is built with `panic = "abort"`.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: arenas use `Cell`/`RefCell` and are `!Sync`;
//!   they are `Send`, so give each thread its own arena
//! - **No per-object free in arenas**: `release` is a no-op there
//! - **Array elements are `Copy`** with alignment no larger than a pointer

pub mod align;
pub mod allocator;
pub mod arena;
pub mod array;
mod block;
pub mod config;
pub mod error;
pub mod heap;
pub mod scratch;

pub use allocator::Allocator;
pub use arena::{Arena, Checkpoint};
pub use array::Array;
pub use config::ArenaConfig;
pub use error::{AllocError, CheckpointError, Result};
pub use heap::Heap;
pub use scratch::ScratchArena;
