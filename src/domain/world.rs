use std::collections::HashSet;

use rand::Rng;

use super::codec::{CellKey, Coord};
use crate::error::{Error, Result};

/// World is the set of live cells on an unbounded plane.
/// A key is present iff its cell is alive; dead cells are never stored.
///
/// Mutating operations have two flavours: pure ones (`toggle`, `union`,
/// `translate`) that return a new world, and `insert`/`remove` for building a
/// world in place before it is shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World<K: CellKey> {
    cells: HashSet<K>,
}

impl<K: CellKey> Default for World<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: CellKey> World<K> {
    /// Create an empty world
    pub fn new() -> Self {
        Self {
            cells: HashSet::new(),
        }
    }

    pub(crate) fn from_keys(cells: HashSet<K>) -> Self {
        Self { cells }
    }

    /// Build a world from absolute coordinates.
    pub fn from_coords<I>(coords: I) -> Result<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let cells = coords
            .into_iter()
            .map(|(x, y)| K::encode(x, y))
            .collect::<Result<HashSet<_>>>()?;
        Ok(Self { cells })
    }

    /// Random initial world: each cell of the `width` x `height` rectangle at
    /// `origin` is alive with probability `density`.
    pub fn random_soup<R: Rng>(
        rng: &mut R,
        origin: Coord,
        width: u32,
        height: u32,
        density: f64,
    ) -> Result<Self> {
        let mut world = Self::new();
        for dy in 0..height as i64 {
            for dx in 0..width as i64 {
                if rng.random::<f64>() < density {
                    let (x, y) = shifted(origin, dx, dy)?;
                    world.insert(x, y)?;
                }
            }
        }
        Ok(world)
    }

    /// Membership test. Coordinates the key type cannot represent are dead.
    pub fn has(&self, x: i64, y: i64) -> bool {
        K::encode(x, y).is_ok_and(|key| self.cells.contains(&key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.cells.contains(key)
    }

    /// Returns a new world with the cell at `(x, y)` flipped.
    pub fn toggle(&self, x: i64, y: i64) -> Result<Self> {
        let key = K::encode(x, y)?;
        let mut next = self.clone();
        if !next.cells.remove(&key) {
            next.cells.insert(key);
        }
        Ok(next)
    }

    /// Returns a copy with every given cell alive. Existing cells are kept.
    pub fn union<I>(&self, coords: I) -> Result<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut next = self.clone();
        for (x, y) in coords {
            next.insert(x, y)?;
        }
        Ok(next)
    }

    /// Marks a cell alive in place. Returns whether it was newly added.
    pub fn insert(&mut self, x: i64, y: i64) -> Result<bool> {
        Ok(self.cells.insert(K::encode(x, y)?))
    }

    /// Marks a cell dead in place. Returns whether it was alive.
    pub fn remove(&mut self, x: i64, y: i64) -> bool {
        K::encode(x, y).is_ok_and(|key| self.cells.remove(&key))
    }

    pub fn population(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.cells.iter()
    }

    /// Live coordinates in arbitrary order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(CellKey::decode)
    }

    /// Live coordinates ordered by row, then column.
    pub fn sorted_coords(&self) -> Vec<Coord> {
        let mut coords: Vec<Coord> = self.coords().collect();
        coords.sort_unstable_by_key(|&(x, y)| (y, x));
        coords
    }

    /// Inclusive `(min, max)` corners of the live cells, `None` when empty.
    pub fn bounding_box(&self) -> Option<(Coord, Coord)> {
        self.coords().fold(None, |acc, (x, y)| match acc {
            None => Some(((x, y), (x, y))),
            Some(((min_x, min_y), (max_x, max_y))) => Some((
                (min_x.min(x), min_y.min(y)),
                (max_x.max(x), max_y.max(y)),
            )),
        })
    }

    /// Returns the same pattern of cells shifted by `(dx, dy)`.
    pub fn translate(&self, dx: i64, dy: i64) -> Result<Self> {
        let moved = self
            .coords()
            .map(|cell| shifted(cell, dx, dy))
            .collect::<Result<Vec<_>>>()?;
        Self::from_coords(moved)
    }

    /// Re-keys the world under another encoding.
    pub fn reencode<K2: CellKey>(&self) -> Result<World<K2>> {
        World::from_coords(self.coords())
    }

    /// Compares live sets across encodings.
    pub fn same_cells<K2: CellKey>(&self, other: &World<K2>) -> bool {
        self.population() == other.population()
            && self.coords().all(|(x, y)| other.has(x, y))
    }
}

fn shifted((x, y): Coord, dx: i64, dy: i64) -> Result<Coord> {
    match (x.checked_add(dx), y.checked_add(dy)) {
        (Some(nx), Some(ny)) => Ok((nx, ny)),
        _ => Err(Error::OutOfRange { x, y }),
    }
}
