//! Chunk codec: shard a world into fixed-size square chunks and back.
//!
//! A cell at world `(x, y)` belongs to chunk `(floor(x / size), floor(y / size))`
//! at local `(x mod size, y mod size)` with a non-negative residue. Local
//! coordinates are unsigned end to end and packed as `(lx << 16) | ly`, so the
//! chunk size is limited to `1..=65536`.
//!
//! Chunks without live cells are never produced; during reconciliation an
//! emptied chunk becomes a delete.
use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{trace, warn};

use super::codec::{CellKey, Coord};
use super::World;
use crate::error::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: i64 = 64;
pub const MAX_CHUNK_SIZE: i64 = 1 << 16;

/// Chunk coordinates on the chunk lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub i64, pub i64);

/// Live cells of one chunk as sorted packed local codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    pub cells: Vec<u32>,
}

impl Chunk {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sort and dedup the cell codes into the form `to_chunks` produces.
    pub fn normalize(&mut self) {
        self.cells.sort_unstable();
        self.cells.dedup();
    }
}

#[inline]
pub const fn pack_local(lx: u32, ly: u32) -> u32 {
    (lx << 16) | (ly & 0xFFFF)
}

#[inline]
pub const fn unpack_local(code: u32) -> (u32, u32) {
    (code >> 16, code & 0xFFFF)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkCodec {
    chunk_size: i64,
}

impl Default for ChunkCodec {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkCodec {
    pub fn new(chunk_size: i64) -> Result<Self> {
        if chunk_size <= 0 {
            return Err(Error::InvalidConfig(format!(
                "chunk_size must be > 0, got {chunk_size}"
            )));
        }
        if chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::InvalidConfig(format!(
                "chunk_size must be <= {MAX_CHUNK_SIZE}, got {chunk_size}"
            )));
        }
        Ok(Self { chunk_size })
    }

    pub const fn chunk_size(&self) -> i64 {
        self.chunk_size
    }

    /// Chunk owning the world cell.
    #[inline]
    pub fn chunk_id_for(&self, x: i64, y: i64) -> ChunkId {
        ChunkId(x.div_euclid(self.chunk_size), y.div_euclid(self.chunk_size))
    }

    /// Local position of the world cell inside its chunk.
    #[inline]
    pub fn local_for(&self, x: i64, y: i64) -> (u32, u32) {
        (
            x.rem_euclid(self.chunk_size) as u32,
            y.rem_euclid(self.chunk_size) as u32,
        )
    }

    /// World coordinates of the chunk's `(0, 0)` cell, or `None` for a chunk
    /// id no world cell can map to.
    #[inline]
    pub fn chunk_origin(&self, id: ChunkId) -> Option<Coord> {
        Some((
            id.0.checked_mul(self.chunk_size)?,
            id.1.checked_mul(self.chunk_size)?,
        ))
    }

    /// World coordinate of a packed local code, or an error when the code
    /// lies outside the chunk or the cell lies outside the `i64` plane.
    pub fn world_coord(&self, id: ChunkId, code: u32) -> Result<Coord> {
        let invalid = || Error::InvalidChunk {
            chunk_x: id.0,
            chunk_y: id.1,
            code,
        };
        let (lx, ly) = unpack_local(code);
        if lx as i64 >= self.chunk_size || ly as i64 >= self.chunk_size {
            return Err(invalid());
        }
        let (ox, oy) = self.chunk_origin(id).ok_or_else(invalid)?;
        let x = ox.checked_add(lx as i64).ok_or_else(invalid)?;
        let y = oy.checked_add(ly as i64).ok_or_else(invalid)?;
        Ok((x, y))
    }

    /// Partition the world into non-empty chunks, ordered by chunk id.
    pub fn to_chunks<K: CellKey>(&self, world: &World<K>) -> Vec<Chunk> {
        let mut grouped: HashMap<ChunkId, Vec<u32>> = HashMap::new();
        for (x, y) in world.coords() {
            let (lx, ly) = self.local_for(x, y);
            grouped
                .entry(self.chunk_id_for(x, y))
                .or_default()
                .push(pack_local(lx, ly));
        }

        let mut chunks: Vec<Chunk> = grouped
            .into_par_iter()
            .map(|(id, mut cells)| {
                cells.sort_unstable();
                trace!(chunk_x = id.0, chunk_y = id.1, cells = cells.len(), "encoded chunk");
                Chunk { id, cells }
            })
            .collect();
        chunks.sort_unstable_by_key(|chunk| chunk.id);
        chunks
    }

    /// Rebuild a world from chunks. Duplicate cells across records collapse.
    pub fn from_chunks<K: CellKey>(&self, chunks: &[Chunk]) -> Result<World<K>> {
        let mut world = World::new();
        for chunk in chunks {
            for &code in &chunk.cells {
                let (x, y) = self.world_coord(chunk.id, code)?;
                world.insert(x, y)?;
            }
        }
        Ok(world)
    }

    /// Chunks intersecting the inclusive world rectangle `min..=max`.
    pub fn chunks_covering(&self, min: Coord, max: Coord) -> Vec<ChunkId> {
        let ChunkId(cx0, cy0) = self.chunk_id_for(min.0, min.1);
        let ChunkId(cx1, cy1) = self.chunk_id_for(max.0, max.1);
        (cy0..=cy1)
            .flat_map(|cy| (cx0..=cx1).map(move |cx| ChunkId(cx, cy)))
            .collect()
    }
}

/// Storage operations needed to move from one chunk set to another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkDiff {
    /// New or changed chunks.
    pub upserts: Vec<Chunk>,
    /// Chunks that no longer hold live cells.
    pub deletes: Vec<ChunkId>,
    pub unchanged: usize,
}

impl ChunkDiff {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }
}

/// Compare the previously stored chunks against freshly computed ones.
///
/// Every new chunk is visited once to decide insert/update/unchanged and
/// every old chunk once to decide keep/delete. An empty chunk in `new` is
/// treated as absent. Cells are compared as slices, so both sides must be
/// normalized (see [`Chunk::normalize`]).
pub fn reconcile(old: &[Chunk], new: &[Chunk]) -> ChunkDiff {
    let previous: HashMap<ChunkId, &[u32]> = old
        .iter()
        .map(|chunk| (chunk.id, chunk.cells.as_slice()))
        .collect();

    let mut diff = ChunkDiff::default();
    let mut current: HashSet<ChunkId> = HashSet::with_capacity(new.len());
    for chunk in new {
        if chunk.is_empty() {
            warn!(chunk_x = chunk.id.0, chunk_y = chunk.id.1, "empty chunk dropped");
            continue;
        }
        current.insert(chunk.id);
        match previous.get(&chunk.id) {
            Some(cells) if *cells == chunk.cells.as_slice() => diff.unchanged += 1,
            _ => diff.upserts.push(chunk.clone()),
        }
    }

    diff.deletes = old
        .iter()
        .map(|chunk| chunk.id)
        .filter(|id| !current.contains(id))
        .collect();
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::{PackedKey, StringKey};
    use rand::{Rng, SeedableRng};

    #[test]
    fn rejects_non_positive_chunk_size() {
        assert!(matches!(ChunkCodec::new(0), Err(Error::InvalidConfig(_))));
        assert!(matches!(ChunkCodec::new(-64), Err(Error::InvalidConfig(_))));
        assert!(ChunkCodec::new(MAX_CHUNK_SIZE + 1).is_err());
        assert!(ChunkCodec::new(MAX_CHUNK_SIZE).is_ok());
    }

    #[test]
    fn negative_coordinates_floor_into_chunks() {
        let codec = ChunkCodec::default();
        assert_eq!(codec.chunk_id_for(-1, -64), ChunkId(-1, -1));
        assert_eq!(codec.chunk_id_for(-65, 63), ChunkId(-2, 0));
        assert_eq!(codec.local_for(-1, -64), (63, 0));
        assert_eq!(codec.local_for(-65, 64), (63, 0));
    }

    #[test]
    fn world_coord_inverts_chunk_mapping() {
        let codec = ChunkCodec::new(16).unwrap();
        for (x, y) in [(0, 0), (-1, -1), (15, 16), (-17, 33), (1000, -1000)] {
            let id = codec.chunk_id_for(x, y);
            let (lx, ly) = codec.local_for(x, y);
            assert_eq!(codec.world_coord(id, pack_local(lx, ly)).unwrap(), (x, y));
        }
    }

    #[test]
    fn out_of_chunk_code_is_rejected() {
        let codec = ChunkCodec::new(8).unwrap();
        let err = codec.world_coord(ChunkId(1, 2), pack_local(8, 0)).unwrap_err();
        assert!(matches!(err, Error::InvalidChunk { chunk_x: 1, chunk_y: 2, .. }));
    }

    #[test]
    fn chunks_at_plane_edge_round_trip() {
        let codec = ChunkCodec::default();
        let world: World<StringKey> =
            World::from_coords([(i64::MAX, i64::MIN), (i64::MIN, i64::MAX)]).unwrap();
        let chunks = codec.to_chunks(&world);
        assert_eq!(codec.from_chunks::<StringKey>(&chunks).unwrap(), world);
    }

    #[test]
    fn chunk_id_past_the_plane_is_rejected() {
        let codec = ChunkCodec::default();
        assert_eq!(codec.chunk_origin(ChunkId(i64::MAX / 64 + 1, 0)), None);

        let far = [chunk(i64::MAX / 64 + 1, 0, &[0])];
        let err = codec.from_chunks::<StringKey>(&far).unwrap_err();
        assert!(matches!(err, Error::InvalidChunk { chunk_y: 0, code: 0, .. }));

        // With size 3 the last chunk's origin fits but its far column does not.
        let thirds = ChunkCodec::new(3).unwrap();
        let last = i64::MAX / 3;
        assert_eq!(thirds.world_coord(ChunkId(last, 0), pack_local(1, 0)).unwrap(), (i64::MAX, 0));
        let edge = [chunk(last, 0, &[pack_local(2, 0)])];
        assert!(matches!(
            thirds.from_chunks::<Coord>(&edge),
            Err(Error::InvalidChunk { .. })
        ));
    }

    #[test]
    fn normalize_sorts_and_dedups_cells() {
        let mut c = chunk(0, 0, &[7, 3, 7, 1]);
        c.normalize();
        assert_eq!(c.cells, vec![1, 3, 7]);
    }

    #[test]
    fn to_chunks_groups_and_sorts() {
        let codec = ChunkCodec::default();
        let world: World<StringKey> =
            World::from_coords([(0, 0), (63, 63), (64, 0), (-1, 0), (1, 0)]).unwrap();
        let chunks = codec.to_chunks(&world);
        let ids: Vec<ChunkId> = chunks.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![ChunkId(-1, 0), ChunkId(0, 0), ChunkId(1, 0)]);
        assert_eq!(chunks[1].cells, vec![pack_local(0, 0), pack_local(1, 0), pack_local(63, 63)]);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn empty_world_has_no_chunks() {
        let world: World<PackedKey> = World::new();
        assert!(ChunkCodec::default().to_chunks(&world).is_empty());
    }

    #[test]
    fn random_world_round_trips_through_chunks() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0xC0FFEE);
        let coords: Vec<Coord> = (0..2_000)
            .map(|_| (rng.random_range(-500..500), rng.random_range(-500..500)))
            .collect();
        let world: World<PackedKey> = World::from_coords(coords).unwrap();
        for size in [1, 7, 64] {
            let codec = ChunkCodec::new(size).unwrap();
            let chunks = codec.to_chunks(&world);
            assert!(chunks.len() > 1);
            let restored: World<PackedKey> = codec.from_chunks(&chunks).unwrap();
            assert_eq!(restored, world);
        }
    }

    #[test]
    fn chunks_covering_spans_rectangle() {
        let codec = ChunkCodec::new(10).unwrap();
        let ids = codec.chunks_covering((-5, 0), (15, 9));
        assert_eq!(ids, vec![ChunkId(-1, 0), ChunkId(0, 0), ChunkId(1, 0)]);
    }

    fn chunk(x: i64, y: i64, cells: &[u32]) -> Chunk {
        Chunk {
            id: ChunkId(x, y),
            cells: cells.to_vec(),
        }
    }

    #[test]
    fn reconcile_upserts_changes_and_deletes_emptied() {
        let old = vec![chunk(0, 0, &[1, 2]), chunk(1, 0, &[5]), chunk(2, 0, &[9])];
        let new = vec![chunk(0, 0, &[1, 2]), chunk(1, 0, &[5, 6]), chunk(3, 3, &[0])];
        let diff = reconcile(&old, &new);
        assert_eq!(diff.unchanged, 1);
        assert_eq!(diff.upserts, vec![chunk(1, 0, &[5, 6]), chunk(3, 3, &[0])]);
        assert_eq!(diff.deletes, vec![ChunkId(2, 0)]);
    }

    #[test]
    fn reconcile_treats_empty_new_chunk_as_delete() {
        let old = vec![chunk(0, 0, &[1])];
        let new = vec![chunk(0, 0, &[])];
        let diff = reconcile(&old, &new);
        assert!(diff.upserts.is_empty());
        assert_eq!(diff.deletes, vec![ChunkId(0, 0)]);
    }

    #[test]
    fn reconcile_identical_sets_is_empty() {
        let set = vec![chunk(4, -4, &[3, 4])];
        assert!(reconcile(&set, &set).is_empty());
    }
}
