use super::World;
use super::codec::{CellKey, Coord};
use crate::error::{Error, Result};

/// Represents a pattern that can be stamped onto a world
#[derive(Clone, Debug)]
pub struct Pattern {
    pub name: &'static str,
    pub description: &'static str,
    pub width: i64,
    pub height: i64,
    pub cells: Vec<Coord>, // Relative coordinates of alive cells
}

impl Pattern {
    /// Create a new pattern from alive cell coordinates
    pub fn new(name: &'static str, description: &'static str, cells: Vec<Coord>) -> Self {
        let width = cells.iter().map(|(x, _)| *x).max().unwrap_or(0) + 1;
        let height = cells.iter().map(|(_, y)| *y).max().unwrap_or(0) + 1;
        Self { name, description, width, height, cells }
    }

    /// Bounding-box center, rounded towards negative infinity.
    pub fn center(&self) -> Coord {
        ((self.width - 1).div_euclid(2), (self.height - 1).div_euclid(2))
    }

    /// Absolute cells when the pattern's center lands on `anchor`.
    /// Fails when part of the pattern would fall off the `i64` plane.
    pub fn cells_at(&self, anchor: Coord) -> Result<Vec<Coord>> {
        let off_plane = || Error::OutOfRange { x: anchor.0, y: anchor.1 };
        let (cx, cy) = self.center();
        let ox = anchor.0.checked_sub(cx).ok_or_else(off_plane)?;
        let oy = anchor.1.checked_sub(cy).ok_or_else(off_plane)?;
        self.cells
            .iter()
            .map(|&(dx, dy)| {
                Ok((
                    ox.checked_add(dx).ok_or_else(off_plane)?,
                    oy.checked_add(dy).ok_or_else(off_plane)?,
                ))
            })
            .collect()
    }

    /// Returns `world` with the pattern added around `anchor`.
    /// Cells already alive stay alive.
    pub fn place_on<K: CellKey>(&self, world: &World<K>, anchor: Coord) -> Result<World<K>> {
        world.union(self.cells_at(anchor)?)
    }
}

/// Classic Game of Life patterns library
pub mod presets {
    use super::*;

    /// Glider - simplest spaceship, moves diagonally
    pub fn glider() -> Pattern {
        Pattern::new(
            "Glider",
            "Moves diagonally (period 4)",
            vec![
                (1, 0),
                (2, 1),
                (0, 2), (1, 2), (2, 2),
            ],
        )
    }

    /// Blinker - period 2 oscillator
    pub fn blinker() -> Pattern {
        Pattern::new(
            "Blinker",
            "Oscillator (period 2)",
            vec![(0, 0), (1, 0), (2, 0)],
        )
    }

    /// Toad - period 2 oscillator
    pub fn toad() -> Pattern {
        Pattern::new(
            "Toad",
            "Oscillator (period 2)",
            vec![
                (1, 0), (2, 0), (3, 0),
                (0, 1), (1, 1), (2, 1),
            ],
        )
    }

    /// Beacon - period 2 oscillator
    pub fn beacon() -> Pattern {
        Pattern::new(
            "Beacon",
            "Oscillator (period 2)",
            vec![
                (0, 0), (1, 0),
                (0, 1),
                (3, 2),
                (2, 3), (3, 3),
            ],
        )
    }

    /// Pulsar - period 3 oscillator
    pub fn pulsar() -> Pattern {
        let quarter = [
            (2, 0), (3, 0), (4, 0),
            (0, 2), (0, 3), (0, 4),
            (5, 2), (5, 3), (5, 4),
            (2, 5), (3, 5), (4, 5),
        ];
        // Mirror one quadrant across both axes of the 13x13 box.
        let cells = quarter
            .iter()
            .flat_map(|&(x, y)| [(x, y), (12 - x, y), (x, 12 - y), (12 - x, 12 - y)])
            .collect();
        Pattern::new("Pulsar", "Oscillator (period 3)", cells)
    }

    /// Lightweight Spaceship (LWSS)
    pub fn lwss() -> Pattern {
        Pattern::new(
            "Lightweight spaceship",
            "Moves horizontally (period 4)",
            vec![
                (1, 0), (4, 0),
                (0, 1),
                (0, 2), (4, 2),
                (0, 3), (1, 3), (2, 3), (3, 3),
            ],
        )
    }

    /// Gosper Glider Gun - produces gliders indefinitely
    pub fn glider_gun() -> Pattern {
        Pattern::new(
            "Gosper glider gun",
            "Produces gliders (period 30)",
            vec![
                (0, 4), (0, 5), (1, 4), (1, 5),
                (10, 4), (10, 5), (10, 6),
                (11, 3), (11, 7),
                (12, 2), (12, 8),
                (13, 2), (13, 8),
                (14, 5),
                (15, 3), (15, 7),
                (16, 4), (16, 5), (16, 6),
                (17, 5),
                (20, 2), (20, 3), (20, 4),
                (21, 2), (21, 3), (21, 4),
                (22, 1), (22, 5),
                (24, 0), (24, 1), (24, 5), (24, 6),
                (34, 2), (34, 3), (35, 2), (35, 3),
            ],
        )
    }

    /// R-pentomino - methuselah, stabilizes after 1103 generations
    pub fn r_pentomino() -> Pattern {
        Pattern::new(
            "R-pentomino",
            "Methuselah - stabilizes at gen 1103",
            vec![
                (1, 0), (2, 0),
                (0, 1), (1, 1),
                (1, 2),
            ],
        )
    }

    /// Acorn - methuselah, stabilizes after 5206 generations
    pub fn acorn() -> Pattern {
        Pattern::new(
            "Acorn",
            "Methuselah - stabilizes at gen 5206",
            vec![
                (1, 0),
                (3, 1),
                (0, 2), (1, 2), (4, 2), (5, 2), (6, 2),
            ],
        )
    }

    /// Block - simple still life
    pub fn block() -> Pattern {
        Pattern::new(
            "Block",
            "Still life",
            vec![
                (0, 0), (1, 0),
                (0, 1), (1, 1),
            ],
        )
    }

    /// Get all available patterns
    pub fn all_patterns() -> Vec<Pattern> {
        vec![
            glider(),
            blinker(),
            toad(),
            beacon(),
            pulsar(),
            lwss(),
            glider_gun(),
            r_pentomino(),
            acorn(),
            block(),
        ]
    }

    /// Case-insensitive lookup by display name.
    pub fn by_name(name: &str) -> Result<Pattern> {
        all_patterns()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownPattern(name.to_owned()))
    }
}
