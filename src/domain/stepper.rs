//! Generation stepper: applies B3/S23 to a whole world at once.
//!
//! `step` is a pure function from world to world. The input is never edited;
//! callers swap in the returned world as a single replacement.
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::codec::CellKey;
use super::neighbors::neighbor_counts;
use super::{Cell, World};

/// Advance one generation.
pub fn step<K: CellKey>(world: &World<K>) -> World<K> {
    let next: HashSet<K> = neighbor_counts(world)
        .into_iter()
        .filter(|(key, count)| {
            Cell::from_alive(world.contains_key(key))
                .evolve(*count)
                .is_alive()
        })
        .map(|(key, _)| key)
        .collect();
    World::from_keys(next)
}

/// Apply `step` `generations` times.
pub fn run<K: CellKey>(world: &World<K>, generations: u64) -> World<K> {
    let mut current = world.clone();
    for generation in 1..=generations {
        current = step(&current);
        debug!(generation, population = current.population(), "stepped");
    }
    current
}

/// Outcome of a run that may stop early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome<K: CellKey> {
    pub world: World<K>,
    /// Generations actually computed.
    pub completed: u64,
    pub cancelled: bool,
}

/// Like [`run`], but asks `stop` before every generation.
///
/// `stop` receives the number of generations completed so far. When it
/// returns `true` the last fully computed world is returned.
pub fn run_until<K, F>(world: &World<K>, generations: u64, mut stop: F) -> RunOutcome<K>
where
    K: CellKey,
    F: FnMut(u64) -> bool,
{
    let mut current = world.clone();
    for completed in 0..generations {
        if stop(completed) {
            debug!(completed, requested = generations, "run cancelled");
            return RunOutcome {
                world: current,
                completed,
                cancelled: true,
            };
        }
        current = step(&current);
    }
    RunOutcome {
        world: current,
        completed: generations,
        cancelled: false,
    }
}

/// [`run_until`] driven by a shared cancellation flag.
pub fn run_cancellable<K: CellKey>(
    world: &World<K>,
    generations: u64,
    cancel: &AtomicBool,
) -> RunOutcome<K> {
    run_until(world, generations, |_| cancel.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::{Coord, PackedKey, StringKey};

    fn world<K: CellKey>(cells: &[Coord]) -> World<K> {
        World::from_coords(cells.iter().copied()).unwrap()
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let start: World<Coord> = world(&[(0, 0), (1, 0), (2, 0)]);
        let vertical = step(&start);
        assert_eq!(vertical, world(&[(1, -1), (1, 0), (1, 1)]));
        assert_eq!(step(&vertical), start);
        assert_eq!(run(&start, 2), start);
    }

    #[test]
    fn block_is_still_life() {
        let block: World<StringKey> = world(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(step(&block), block);
    }

    #[test]
    fn glider_translates_after_four_generations() {
        let glider: World<PackedKey> = world(&[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
        let moved = run(&glider, 4);
        assert_eq!(moved, glider.translate(1, 1).unwrap());
    }

    #[test]
    fn isolated_cell_dies() {
        let lonely: World<Coord> = world(&[(5, 5)]);
        assert!(step(&lonely).is_empty());
    }

    #[test]
    fn crowded_cell_dies() {
        // Center has 4 live neighbors.
        let plus: World<Coord> = world(&[(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]);
        assert!(!step(&plus).has(0, 0));
    }

    #[test]
    fn birth_needs_exactly_three() {
        let three: World<Coord> = world(&[(-1, -1), (1, -1), (0, 1)]);
        assert!(step(&three).has(0, 0));

        let two: World<Coord> = world(&[(-1, -1), (1, -1)]);
        assert!(!step(&two).has(0, 0));

        let four: World<Coord> = world(&[(-1, -1), (1, -1), (-1, 1), (1, 1)]);
        assert!(!step(&four).has(0, 0));
    }

    #[test]
    fn step_is_deterministic_across_instances() {
        let cells = [(0, 0), (1, 0), (2, 0), (2, -1), (1, -2)];
        let a: World<StringKey> = world(&cells);
        let mut reversed = cells;
        reversed.reverse();
        let b: World<StringKey> = world(&reversed);
        assert_eq!(step(&a), step(&b));
    }

    #[test]
    fn run_zero_generations_is_identity() {
        let start: World<Coord> = world(&[(3, 3), (4, 3)]);
        assert_eq!(run(&start, 0), start);
    }

    #[test]
    fn cancelled_run_stops_before_first_step() {
        let start: World<Coord> = world(&[(0, 0), (1, 0), (2, 0)]);
        let cancel = AtomicBool::new(true);
        let outcome = run_cancellable(&start, 1_000, &cancel);
        assert!(outcome.cancelled);
        assert_eq!(outcome.completed, 0);
        assert_eq!(outcome.world, start);
    }

    #[test]
    fn uncancelled_run_matches_run() {
        let start: World<Coord> = world(&[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
        let cancel = AtomicBool::new(false);
        let outcome = run_cancellable(&start, 8, &cancel);
        assert!(!outcome.cancelled);
        assert_eq!(outcome.completed, 8);
        assert_eq!(outcome.world, run(&start, 8));
    }

    #[test]
    fn flag_raised_mid_run_keeps_last_complete_generation() {
        let start: World<Coord> = world(&[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
        let cancel = AtomicBool::new(false);
        let outcome = run_until(&start, 100, |completed| {
            if completed == 3 {
                cancel.store(true, Ordering::Relaxed);
            }
            cancel.load(Ordering::Relaxed)
        });
        assert!(outcome.cancelled);
        assert_eq!(outcome.completed, 3);
        assert_eq!(outcome.world, run(&start, 3));
    }

    #[test]
    fn cells_at_plane_edge_step_without_overflow() {
        let lonely: World<StringKey> = world(&[(i64::MAX, 0)]);
        assert!(step(&lonely).is_empty());

        // The birth past i64::MAX has nowhere to go.
        let edge = [(i64::MAX, -1), (i64::MAX, 0), (i64::MAX, 1)];
        let expected = [(i64::MAX - 1, 0), (i64::MAX, 0)];
        let tuple: World<Coord> = world(&edge);
        assert_eq!(step(&tuple), world(&expected));
        let strings: World<StringKey> = world(&edge);
        assert_eq!(step(&strings), world(&expected));

        let corner: World<Coord> = world(&[(i64::MIN, i64::MIN), (i64::MIN + 1, i64::MIN)]);
        assert!(step(&corner).is_empty());
    }

    #[test]
    fn packed_world_wraps_like_a_torus_at_the_edge() {
        let across = [(PackedKey::MAX - 1, 0), (PackedKey::MAX, 0), (PackedKey::MIN, 0)];
        let packed: World<PackedKey> = world(&across);
        let next = step(&packed);
        assert_eq!(
            next,
            world(&[(PackedKey::MAX, -1), (PackedKey::MAX, 0), (PackedKey::MAX, 1)])
        );

        // The unbounded encoding sees three unrelated cells instead.
        let tuple: World<Coord> = world(&across);
        assert!(step(&tuple).is_empty());
    }
}
