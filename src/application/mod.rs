pub mod persistence;
pub mod simulation;
pub mod viewport;

pub use persistence::{ChunkRecord, ChunkStore, MemoryChunkStore, SyncReport, WorldMetadata};
pub use simulation::{SharedWorld, Simulation};
pub use viewport::{Region, Viewport, VisibleCell};
