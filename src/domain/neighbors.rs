//! Neighbor engine: live-neighbor counts for every cell next to a live cell.
//!
//! Each live cell increments the counter of its 8 Moore neighbors, so the
//! cost is proportional to the population, not the area. A live cell with no
//! live neighbors gets no entry of its own; a missing entry means zero.
//!
//! Neighbors the key type cannot represent are skipped; such a cell can never
//! be live, so dropping its count does not change the next generation.
use std::collections::HashMap;

use super::codec::CellKey;
use super::World;

/// The 8 offsets of the Moore neighborhood.
pub const MOORE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Counts of live neighbors, keyed like the world. Every value is in `1..=8`.
pub type NeighborCounts<K> = HashMap<K, u8>;

pub fn neighbor_counts<K: CellKey>(world: &World<K>) -> NeighborCounts<K> {
    let mut counts = HashMap::with_capacity(world.population() * 4);
    for key in world.keys() {
        for neighbor in MOORE_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| key.offset(dx, dy))
        {
            *counts.entry(neighbor).or_insert(0u8) += 1;
        }
    }
    counts
}
