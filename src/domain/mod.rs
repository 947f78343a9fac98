mod cell;
mod world;
pub mod codec;
pub mod neighbors;
pub mod stepper;
pub mod chunk;
mod patterns;

pub use cell::Cell;
pub use world::World;
pub use codec::{CellKey, Coord, PackedKey, StringKey};
pub use neighbors::{NeighborCounts, neighbor_counts};
pub use stepper::{RunOutcome, run, run_cancellable, run_until, step};
pub use chunk::{Chunk, ChunkCodec, ChunkDiff, ChunkId, reconcile};
pub use patterns::{Pattern, presets};
