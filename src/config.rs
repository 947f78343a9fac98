//! Simulation configuration loader.
//!
//! Reads a TOML document; every key is optional and falls back to a default.
//! A missing file yields the defaults, a malformed one is an error.

use serde::Deserialize;
use std::path::Path;

use crate::domain::chunk::{ChunkCodec, DEFAULT_CHUNK_SIZE};
use crate::error::{Error, Result};

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub timing: TimingConfig,
    pub viewport: ViewportConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    pub chunk_size: i64,
    pub random_density: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub updates_per_second: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewportConfig {
    pub cell_size: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    viewport: TomlViewport,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_chunk_size")]
    chunk_size: i64,
    #[serde(default = "default_random_density")]
    random_density: f64,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_updates_per_second")]
    updates_per_second: f32,
}

#[derive(Deserialize, Debug)]
struct TomlViewport {
    #[serde(default = "default_cell_size")]
    cell_size: f32,
    #[serde(default = "default_min_zoom")]
    min_zoom: f32,
    #[serde(default = "default_max_zoom")]
    max_zoom: f32,
}

// ── Defaults ──

fn default_chunk_size() -> i64 { DEFAULT_CHUNK_SIZE }
fn default_random_density() -> f64 { 0.3 }
fn default_updates_per_second() -> f32 { 10.0 }
fn default_cell_size() -> f32 { 10.0 }
fn default_min_zoom() -> f32 { 0.5 }
fn default_max_zoom() -> f32 { 10.0 }

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld {
            chunk_size: default_chunk_size(),
            random_density: default_random_density(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            updates_per_second: default_updates_per_second(),
        }
    }
}

impl Default for TomlViewport {
    fn default() -> Self {
        TomlViewport {
            cell_size: default_cell_size(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl From<TomlConfig> for SimulationConfig {
    fn from(raw: TomlConfig) -> Self {
        SimulationConfig {
            world: WorldConfig {
                chunk_size: raw.world.chunk_size,
                random_density: raw.world.random_density,
            },
            timing: TimingConfig {
                updates_per_second: raw.timing.updates_per_second,
            },
            viewport: ViewportConfig {
                cell_size: raw.viewport.cell_size,
                min_zoom: raw.viewport.min_zoom,
                max_zoom: raw.viewport.max_zoom,
            },
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl SimulationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: TomlConfig = toml::from_str(text)?;
        let config = SimulationConfig::from(raw);
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.chunk_codec()?;
        if !(0.0..=1.0).contains(&self.world.random_density) {
            return Err(Error::InvalidConfig(
                "world.random_density must be within [0, 1]".into(),
            ));
        }
        if !(self.timing.updates_per_second > 0.0) {
            return Err(Error::InvalidConfig(
                "timing.updates_per_second must be > 0".into(),
            ));
        }
        if !(self.viewport.cell_size > 0.0) {
            return Err(Error::InvalidConfig("viewport.cell_size must be > 0".into()));
        }
        if !(self.viewport.min_zoom > 0.0 && self.viewport.min_zoom <= self.viewport.max_zoom) {
            return Err(Error::InvalidConfig(
                "viewport zoom range must satisfy 0 < min_zoom <= max_zoom".into(),
            ));
        }
        Ok(())
    }

    pub fn chunk_codec(&self) -> Result<ChunkCodec> {
        ChunkCodec::new(self.world.chunk_size)
    }
}
