use crate::config::ViewportConfig;
use crate::domain::{CellKey, Coord, World};

const LIVE: char = '@';
const EMPTY: char = '.';
const PAD: char = ' ';

/// A rectangle of world cells: `origin` is the top-left cell, `zoom` scales
/// the screen-relative offsets reported for cells inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub origin: Coord,
    pub width: u32,
    pub height: u32,
    pub zoom: f32,
}

impl Region {
    pub fn new(origin: Coord, width: u32, height: u32) -> Self {
        Self { origin, width, height, zoom: 1.0 }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, (x, y): Coord) -> bool {
        let (ox, oy) = self.origin;
        x >= ox
            && y >= oy
            && x.abs_diff(ox) < self.width as u64
            && y.abs_diff(oy) < self.height as u64
    }

    /// Columns of the region, clipped at the edge of the `i64` plane.
    pub fn xs(&self) -> impl Iterator<Item = i64> {
        span(self.origin.0, self.width)
    }

    /// Rows of the region, clipped like [`Region::xs`].
    pub fn ys(&self) -> impl Iterator<Item = i64> {
        span(self.origin.1, self.height)
    }

    /// Every coordinate in the region, row by row.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.ys().flat_map(move |y| self.xs().map(move |x| (x, y)))
    }
}

fn span(start: i64, len: u32) -> impl Iterator<Item = i64> {
    (0..len as i64).map_while(move |d| start.checked_add(d))
}

/// A live cell inside a queried region.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleCell<K> {
    pub key: K,
    pub coord: Coord,
    /// Position relative to the region origin, scaled by the region zoom.
    pub offset: (f32, f32),
}

/// Live cells of `world` inside `region`, row-major.
///
/// Scans whichever is smaller: the region area or the live population.
pub fn query<K: CellKey>(world: &World<K>, region: &Region) -> Vec<VisibleCell<K>> {
    let mut hits: Vec<(Coord, K)> = if region.area() <= world.population() as u64 {
        region
            .coords()
            .filter_map(|(x, y)| {
                K::encode(x, y)
                    .ok()
                    .filter(|key| world.contains_key(key))
                    .map(|key| ((x, y), key))
            })
            .collect()
    } else {
        world
            .keys()
            .filter_map(|key| {
                let coord = key.decode();
                region.contains(coord).then(|| (coord, key.clone()))
            })
            .collect()
    };
    hits.sort_unstable_by_key(|&((x, y), _)| (y, x));

    let (ox, oy) = region.origin;
    hits.into_iter()
        .map(|(coord, key)| VisibleCell {
            offset: (
                (coord.0 - ox) as f32 * region.zoom,
                (coord.1 - oy) as f32 * region.zoom,
            ),
            key,
            coord,
        })
        .collect()
}

/// Text picture of a region: one line per row, `@` live, `.` dead.
pub fn picture<K: CellKey>(world: &World<K>, region: &Region) -> String {
    let ox = region.origin.0;
    region
        .ys()
        .map(|y| {
            let mut row = String::with_capacity(region.width as usize * 2);
            for x in region.xs() {
                if x > ox {
                    row.push(PAD);
                }
                row.push(if world.has(x, y) { LIVE } else { EMPTY });
            }
            row
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Viewport manages pan and zoom over the infinite plane
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub offset_x: f32,
    pub offset_y: f32,
    pub zoom: f32, // 1.0 = normal, 2.0 = 2x zoomed in
    cell_size: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Viewport {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0_f32.clamp(config.min_zoom, config.max_zoom),
            cell_size: config.cell_size,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }

    /// Zoom in by factor
    pub fn zoom_in(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom out by factor
    pub fn zoom_out(&mut self, factor: f32) {
        self.zoom = (self.zoom / factor).clamp(self.min_zoom, self.max_zoom);
    }

    /// Pan by a screen-space delta
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    fn scaled_cell(&self) -> f32 {
        self.cell_size * self.zoom
    }

    /// Convert screen coordinates to the world cell under them
    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> Coord {
        let x = ((screen_x - self.offset_x) / self.scaled_cell()).floor() as i64;
        let y = ((screen_y - self.offset_y) / self.scaled_cell()).floor() as i64;
        (x, y)
    }

    /// Convert a world cell to the screen position of its top-left corner
    pub fn world_to_screen(&self, x: i64, y: i64) -> (f32, f32) {
        (
            x as f32 * self.scaled_cell() + self.offset_x,
            y as f32 * self.scaled_cell() + self.offset_y,
        )
    }

    /// World region covered by a screen of the given size, including
    /// partially visible cells at the edges.
    pub fn visible_region(&self, screen_width: f32, screen_height: f32) -> Region {
        let (min_x, min_y) = self.screen_to_world(0.0, 0.0);
        let (max_x, max_y) = self.screen_to_world(screen_width, screen_height);
        Region {
            origin: (min_x, min_y),
            width: (max_x - min_x + 1).max(0) as u32,
            height: (max_y - min_y + 1).max(0) as u32,
            zoom: self.scaled_cell(),
        }
    }

    /// Live cells on screen with their pixel positions.
    pub fn visible_cells<K: CellKey>(
        &self,
        world: &World<K>,
        screen_width: f32,
        screen_height: f32,
    ) -> Vec<(VisibleCell<K>, (f32, f32))> {
        let region = self.visible_region(screen_width, screen_height);
        query(world, &region)
            .into_iter()
            .map(|cell| {
                let pos = self.world_to_screen(cell.coord.0, cell.coord.1);
                (cell, pos)
            })
            .collect()
    }

    /// Reset pan and zoom
    pub fn reset(&mut self) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.zoom = 1.0_f32.clamp(self.min_zoom, self.max_zoom);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&ViewportConfig {
            cell_size: 10.0,
            min_zoom: 0.5,
            max_zoom: 10.0,
        })
    }
}
