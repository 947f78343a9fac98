//! Sparse Conway's Game of Life on an unbounded plane.

// Domain layer - pure simulation logic
pub mod domain;

// Application layer - state holders, viewport, persistence
pub mod application;

pub mod config;
pub mod error;

// Re-exports for convenience
pub use domain::{Cell, CellKey, Chunk, ChunkCodec, Coord, PackedKey, Pattern, StringKey, World, presets};
pub use application::{Region, SharedWorld, Simulation, Viewport};
pub use config::SimulationConfig;
pub use error::{Error, Result};
