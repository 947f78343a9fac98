/// Liveness of one position on the plane.
///
/// Worlds store only live keys, so a `Cell` is built on the fly from a
/// membership test and exists to apply the rule in one place.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Dead,
    Alive,
}

impl Cell {
    pub const fn from_alive(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Dead }
    }

    pub const fn is_alive(self) -> bool {
        matches!(self, Cell::Alive)
    }

    /// B3/S23: born on exactly 3 live neighbors, survives on 2 or 3.
    pub const fn evolve(self, neighbors: u8) -> Self {
        match (self, neighbors) {
            (Cell::Alive, 2 | 3) | (Cell::Dead, 3) => Cell::Alive,
            _ => Cell::Dead,
        }
    }
}
