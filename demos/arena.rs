use std::io::Read;

use rarena::{Allocator, Arena, ArenaConfig, Array, ScratchArena, align::kb};
use tracing_subscriber::EnvFilter;

/// Waits until the user presses ENTER, when the demo runs with `--step`.
/// Useful to inspect the process with `pmap` or `gdb` between steps.
fn block_until_enter_pressed(step: bool) {
  if !step {
    return;
  }
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn describe(
  label: &str,
  arena: &Arena,
) {
  println!(
    "[{}] blocks = {}, used = {} bytes, owned = {} bytes",
    label,
    arena.block_count(),
    arena.query_capacity(),
    arena.total_capacity(),
  );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  // RUST_LOG=rarena=debug shows block growth.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let step = std::env::args().any(|arg| arg == "--step");

  // Small first block and small growth so every step is visible.
  let mut arena = Arena::with_config(ArenaConfig::new(64).with_block_size(256))?;
  describe("start", &arena);
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 1) Allocate 10 bytes. Lands at offset 0 of the first block.
  // --------------------------------------------------------------------
  let first = arena.allocate(10)?;
  println!("\n[1] allocate(10) -> {:?} at {:?}", first, arena.locate(first));
  describe("1", &arena);
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 2) Allocate 60 bytes. 6 bytes of padding + 60 won't fit in the 54
  //    left, so the arena appends a second block.
  // --------------------------------------------------------------------
  let second = arena.allocate(60)?;
  println!("\n[2] allocate(60) -> {:?} at {:?}", second, arena.locate(second));
  describe("2", &arena);
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 3) Checkpoint, scribble, restore.
  // --------------------------------------------------------------------
  let checkpoint = arena.checkpoint();
  for _ in 0..8 {
    arena.allocate(48)?;
  }
  describe("3 before restore", &arena);
  arena.restore(checkpoint)?;
  describe("3 after restore", &arena);
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 4) Grow an array on the arena. Growth copies its contents forward.
  // --------------------------------------------------------------------
  {
    let mut squares = Array::new_in(&arena);
    for i in 0..32u64 {
      squares.push(i * i)?;
    }
    println!(
      "\n[4] array len = {}, capacity = {}, last = {:?}",
      squares.len(),
      squares.capacity(),
      squares.last()
    );
    describe("4", &arena);
  }
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 5) Reset. Blocks are kept, the same requests get the same addresses.
  // --------------------------------------------------------------------
  arena.reset();
  let again = arena.allocate(10)?;
  println!("\n[5] after reset, allocate(10) -> {:?} (same as [1]: {})", again, again == first);
  describe("5", &arena);
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 6) Scratch arena for one bounded pass. Overflowing it would panic.
  // --------------------------------------------------------------------
  let mut scratch = ScratchArena::new(kb(1))?;
  for _ in 0..4 {
    scratch.allocate(100);
  }
  println!(
    "\n[6] scratch used = {} of {} bytes",
    scratch.used(),
    scratch.capacity()
  );
  scratch.reset();
  println!("[6] scratch reset, used = {}", scratch.used());

  println!("\n[7] End of example. Dropping the arenas returns every block to the heap.");

  Ok(())
}
