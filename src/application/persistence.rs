//! Persistence records and the storage seam for shared worlds.
//!
//! A storage backend only ever sees [`ChunkRecord`]s and one
//! [`WorldMetadata`]. [`sync_world`] diffs the stored chunks against a fresh
//! encoding of the world and applies just the upserts and deletes.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{Chunk, ChunkCodec, ChunkId, CellKey, World, reconcile};
use crate::error::Result;

/// Wire form of a chunk: `{ chunkX, chunkY, cells }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    pub chunk_x: i64,
    pub chunk_y: i64,
    pub cells: Vec<u32>,
}

impl From<Chunk> for ChunkRecord {
    fn from(chunk: Chunk) -> Self {
        ChunkRecord {
            chunk_x: chunk.id.0,
            chunk_y: chunk.id.1,
            cells: chunk.cells,
        }
    }
}

impl From<ChunkRecord> for Chunk {
    fn from(record: ChunkRecord) -> Self {
        Chunk {
            id: ChunkId(record.chunk_x, record.chunk_y),
            cells: record.cells,
        }
    }
}

/// World-level record: `{ generation, isRunning }`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorldMetadata {
    pub generation: u64,
    pub is_running: bool,
}

/// Durable storage for chunk records. Implementations own indexing and
/// durability; the core only hands them well-formed records.
pub trait ChunkStore {
    fn load_chunks(&self) -> Result<Vec<ChunkRecord>>;

    fn upsert_chunk(&mut self, record: ChunkRecord) -> Result<()>;

    fn delete_chunk(&mut self, chunk_x: i64, chunk_y: i64) -> Result<()>;

    fn load_metadata(&self) -> Result<Option<WorldMetadata>>;

    fn save_metadata(&mut self, metadata: WorldMetadata) -> Result<()>;
}

/// In-process store, ordered by chunk id.
#[derive(Clone, Debug, Default)]
pub struct MemoryChunkStore {
    chunks: BTreeMap<(i64, i64), Vec<u32>>,
    metadata: Option<WorldMetadata>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, chunk_x: i64, chunk_y: i64) -> Option<&[u32]> {
        self.chunks.get(&(chunk_x, chunk_y)).map(Vec::as_slice)
    }
}

impl ChunkStore for MemoryChunkStore {
    fn load_chunks(&self) -> Result<Vec<ChunkRecord>> {
        Ok(self
            .chunks
            .iter()
            .map(|(&(chunk_x, chunk_y), cells)| ChunkRecord {
                chunk_x,
                chunk_y,
                cells: cells.clone(),
            })
            .collect())
    }

    fn upsert_chunk(&mut self, record: ChunkRecord) -> Result<()> {
        if record.cells.is_empty() {
            warn!(
                chunk_x = record.chunk_x,
                chunk_y = record.chunk_y,
                "empty chunk upsert turned into delete"
            );
            return self.delete_chunk(record.chunk_x, record.chunk_y);
        }
        self.chunks
            .insert((record.chunk_x, record.chunk_y), record.cells);
        Ok(())
    }

    fn delete_chunk(&mut self, chunk_x: i64, chunk_y: i64) -> Result<()> {
        self.chunks.remove(&(chunk_x, chunk_y));
        Ok(())
    }

    fn load_metadata(&self) -> Result<Option<WorldMetadata>> {
        Ok(self.metadata)
    }

    fn save_metadata(&mut self, metadata: WorldMetadata) -> Result<()> {
        self.metadata = Some(metadata);
        Ok(())
    }
}

/// Counts of storage operations performed by a sync.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub upserted: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

/// Bring `store` in line with `world`.
pub fn sync_world<K: CellKey, S: ChunkStore + ?Sized>(
    store: &mut S,
    codec: &ChunkCodec,
    world: &World<K>,
) -> Result<SyncReport> {
    let stored: Vec<Chunk> = store
        .load_chunks()?
        .into_iter()
        .map(|record| {
            let mut chunk = Chunk::from(record);
            chunk.normalize();
            chunk
        })
        .collect();
    let fresh = codec.to_chunks(world);
    let diff = reconcile(&stored, &fresh);
    debug!(
        upserts = diff.upserts.len(),
        deletes = diff.deletes.len(),
        unchanged = diff.unchanged,
        "chunk diff computed"
    );

    let report = SyncReport {
        upserted: diff.upserts.len(),
        deleted: diff.deletes.len(),
        unchanged: diff.unchanged,
    };
    for chunk in diff.upserts {
        store.upsert_chunk(chunk.into())?;
    }
    for ChunkId(chunk_x, chunk_y) in diff.deletes {
        store.delete_chunk(chunk_x, chunk_y)?;
    }
    info!(
        upserted = report.upserted,
        deleted = report.deleted,
        population = world.population(),
        "world synced"
    );
    Ok(report)
}

/// Rebuild the world held by `store`.
pub fn load_world<K: CellKey, S: ChunkStore + ?Sized>(
    store: &S,
    codec: &ChunkCodec,
) -> Result<World<K>> {
    let chunks: Vec<Chunk> = store.load_chunks()?.into_iter().map(Chunk::from).collect();
    codec.from_chunks(&chunks)
}
