use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rand::Rng;
use tracing::{debug, warn};

use super::persistence::{ChunkStore, SyncReport, WorldMetadata, load_world, sync_world};
use super::viewport::Region;
use crate::config::SimulationConfig;
use crate::domain::{CellKey, ChunkCodec, Coord, Pattern, World, step};
use crate::error::Result;

/// Simulation holds the current world and the run state around it.
/// The domain layer stays stateless; this is the caller-owned state.
///
/// Every generation replaces the world `Arc` wholesale, so a snapshot handed
/// out earlier keeps observing the generation it was taken at.
#[derive(Clone, Debug)]
pub struct Simulation<K: CellKey> {
    world: Arc<World<K>>,
    pub is_running: bool,
    pub generation: u64,
    pub update_timer: f32,
    pub updates_per_second: f32,
    pub random_density: f64,
}

impl<K: CellKey> Simulation<K> {
    /// Create an empty, paused simulation
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            world: Arc::new(World::new()),
            is_running: false,
            generation: 0,
            update_timer: 0.0,
            updates_per_second: config.timing.updates_per_second,
            random_density: config.world.random_density,
        }
    }

    pub fn with_world(mut self, world: World<K>) -> Self {
        self.world = Arc::new(world);
        self
    }

    pub fn world(&self) -> &World<K> {
        &self.world
    }

    /// Cheap handle on the current generation for readers.
    pub fn snapshot(&self) -> Arc<World<K>> {
        Arc::clone(&self.world)
    }

    /// Set running state (builder pattern)
    pub fn with_running(mut self, running: bool) -> Self {
        self.is_running = running;
        self
    }

    /// Toggle play/pause state
    pub fn toggle_running(mut self) -> Self {
        self.is_running = !self.is_running;
        self
    }

    /// Clear the world and reset generation counter
    pub fn clear(mut self) -> Self {
        self.world = Arc::new(World::new());
        self.generation = 0;
        self.is_running = false;
        self
    }

    /// Fill `region` with a random soup and reset generation counter
    pub fn randomize<R: Rng>(mut self, rng: &mut R, region: &Region) -> Result<Self> {
        let soup = World::random_soup(
            rng,
            region.origin,
            region.width,
            region.height,
            self.random_density,
        )?;
        self.world = Arc::new(soup);
        self.generation = 0;
        self.is_running = false;
        Ok(self)
    }

    /// Adjust simulation speed
    pub fn adjust_speed(mut self, delta: f32) -> Self {
        self.updates_per_second = (self.updates_per_second + delta).clamp(1.0, 60.0);
        self
    }

    pub fn toggle_cell(&mut self, x: i64, y: i64) -> Result<()> {
        self.world = Arc::new(self.world.toggle(x, y)?);
        Ok(())
    }

    pub fn place_pattern(&mut self, pattern: &Pattern, anchor: Coord) -> Result<()> {
        self.world = Arc::new(pattern.place_on(self.world.as_ref(), anchor)?);
        debug!(pattern = pattern.name, x = anchor.0, y = anchor.1, "pattern placed");
        Ok(())
    }

    /// Advance exactly one generation, regardless of running state.
    pub fn step_once(&mut self) {
        self.world = Arc::new(step(self.world.as_ref()));
        self.generation += 1;
    }

    /// Advance the fixed-interval clock by `delta_time` seconds.
    /// At most one generation is computed per call.
    pub fn tick(mut self, delta_time: f32) -> Self {
        if !self.is_running {
            return self;
        }

        self.update_timer += delta_time;
        let update_interval = 1.0 / self.updates_per_second;

        if self.update_timer >= update_interval {
            self.step_once();
            self.update_timer = 0.0;
        }

        self
    }

    pub fn metadata(&self) -> WorldMetadata {
        WorldMetadata {
            generation: self.generation,
            is_running: self.is_running,
        }
    }

    /// Persist the world and its metadata.
    pub fn save<S: ChunkStore + ?Sized>(
        &self,
        store: &mut S,
        codec: &ChunkCodec,
    ) -> Result<SyncReport> {
        let report = sync_world(store, codec, self.world.as_ref())?;
        store.save_metadata(self.metadata())?;
        Ok(report)
    }

    /// Rebuild a simulation from a store. Missing metadata means a fresh,
    /// paused world at generation zero.
    pub fn load<S: ChunkStore + ?Sized>(
        store: &S,
        codec: &ChunkCodec,
        config: &SimulationConfig,
    ) -> Result<Self> {
        let world = load_world(store, codec)?;
        let metadata = store.load_metadata()?.unwrap_or_default();
        let mut simulation = Self::new(config).with_world(world);
        simulation.generation = metadata.generation;
        simulation.is_running = metadata.is_running;
        Ok(simulation)
    }
}

/// A world shared between one ticking driver and any number of readers.
///
/// Readers take snapshots; the driver computes the next generation outside
/// the lock and publishes it with a single pointer swap. Overlapping ticks
/// are skipped, not queued.
#[derive(Debug)]
pub struct SharedWorld<K: CellKey> {
    current: RwLock<Arc<World<K>>>,
    generation: AtomicU64,
    in_flight: AtomicBool,
}

impl<K: CellKey> SharedWorld<K> {
    pub fn new(world: World<K>) -> Self {
        Self {
            current: RwLock::new(Arc::new(world)),
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> Arc<World<K>> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Compute and publish one generation. Returns `false` when another
    /// tick is still running.
    pub fn try_tick(&self) -> bool {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            warn!("tick skipped: previous generation still in flight");
            return false;
        }
        let current = self.snapshot();
        let next = Arc::new(step(current.as_ref()));
        {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *guard = next;
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.in_flight.store(false, Ordering::Release);
        true
    }

    /// Replace the world outright, e.g. after an edit.
    pub fn publish(&self, world: World<K>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::persistence::MemoryChunkStore;
    use crate::domain::{PackedKey, StringKey, presets};
    use rand::SeedableRng;

    fn blinker<K: CellKey>() -> World<K> {
        World::from_coords([(0, 0), (1, 0), (2, 0)]).unwrap()
    }

    #[test]
    fn paused_tick_does_nothing() {
        let sim = Simulation::<Coord>::new(&SimulationConfig::default())
            .with_world(blinker())
            .tick(10.0);
        assert_eq!(sim.generation, 0);
    }

    #[test]
    fn tick_steps_once_per_interval() {
        let mut sim = Simulation::<Coord>::new(&SimulationConfig::default())
            .with_world(blinker())
            .with_running(true);
        sim = sim.tick(0.05);
        assert_eq!(sim.generation, 0);
        sim = sim.tick(0.06);
        assert_eq!(sim.generation, 1);
        assert!(sim.world().has(1, -1));
        // A long frame still advances a single generation.
        sim = sim.tick(5.0);
        assert_eq!(sim.generation, 2);
        assert_eq!(sim.world(), &blinker());
    }

    #[test]
    fn snapshots_are_unaffected_by_later_steps() {
        let mut sim = Simulation::<StringKey>::new(&SimulationConfig::default())
            .with_world(blinker());
        let before = sim.snapshot();
        sim.step_once();
        assert!(before.has(0, 0));
        assert!(!sim.world().has(0, 0));
    }

    #[test]
    fn clear_and_speed_controls() {
        let sim = Simulation::<Coord>::new(&SimulationConfig::default())
            .with_world(blinker())
            .with_running(true)
            .adjust_speed(100.0);
        assert_eq!(sim.updates_per_second, 60.0);
        let sim = sim.clear();
        assert!(sim.world().is_empty());
        assert!(!sim.is_running);
        assert!(sim.toggle_running().is_running);
    }

    #[test]
    fn edits_go_through_world_replacement() {
        let mut sim = Simulation::<PackedKey>::new(&SimulationConfig::default());
        sim.place_pattern(&presets::glider(), (0, 0)).unwrap();
        assert_eq!(sim.world().population(), 5);
        sim.toggle_cell(50, 50).unwrap();
        assert!(sim.world().has(50, 50));
        assert!(sim.toggle_cell(99_999, 0).is_err());
    }

    #[test]
    fn randomize_resets_generation() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut sim = Simulation::<Coord>::new(&SimulationConfig::default());
        sim.step_once();
        let sim = sim.randomize(&mut rng, &Region::new((0, 0), 20, 20)).unwrap();
        assert_eq!(sim.generation, 0);
        assert!(!sim.world().is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let config = SimulationConfig::default();
        let codec = config.chunk_codec().unwrap();
        let mut store = MemoryChunkStore::new();

        let mut sim = Simulation::<Coord>::new(&config)
            .with_world(presets::glider().place_on(&World::new(), (-70, 70)).unwrap())
            .with_running(true);
        sim.step_once();
        sim.save(&mut store, &codec).unwrap();

        let loaded = Simulation::<Coord>::load(&store, &codec, &config).unwrap();
        assert_eq!(loaded.generation, 1);
        assert!(loaded.is_running);
        assert_eq!(loaded.world(), sim.world());
    }

    #[test]
    fn shared_world_publishes_whole_generations() {
        let shared = SharedWorld::<Coord>::new(blinker());
        let reader = shared.snapshot();
        assert!(shared.try_tick());
        assert_eq!(shared.generation(), 1);
        assert_eq!(*reader, blinker());
        assert!(shared.snapshot().has(1, 1));

        shared.publish(World::new());
        assert!(shared.snapshot().is_empty());
    }

    #[test]
    fn shared_world_skips_overlapping_tick() {
        let shared = SharedWorld::<Coord>::new(blinker());
        shared.in_flight.store(true, Ordering::Release);
        assert!(!shared.try_tick());
        assert_eq!(shared.generation(), 0);
    }
}
