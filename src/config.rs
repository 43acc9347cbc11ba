//! # World Configuration
//!
//! Tunables for the streaming world, fixed at construction. The only value
//! that may change at runtime is the max view distance, and that is routed
//! through `World::set_max_view_distance` so the clamp always applies.
//!
//! Configuration can be built in code (`WorldConfig::default()` plus field
//! overrides) or loaded from JSON. Missing JSON fields fall back to defaults.
//!
//! ```json
//! { "chunk_size": 16, "height": 64, "max_view_distance": 300.0 }
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::engine_state::voxels::chunk::chunk_index::ChunkKey;
use crate::error::WorldError;

/// Smallest allowed max view distance, in world units.
pub const MIN_VIEW_DISTANCE: f32 = 20.0;
/// Largest allowed max view distance, in world units.
pub const MAX_VIEW_DISTANCE: f32 = 1000.0;
/// Largest allowed chunk edge length. A chunk of this size holds 2^30 voxels.
pub const MAX_CHUNK_SIZE: i32 = 1024;

/// One layer of the terrain height noise stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayerConfig {
    /// Scale applied to world x/z before sampling the noise function.
    pub frequency: f64,
    /// Contribution of this layer to the summed elevation.
    pub weight: f64,
}

impl NoiseLayerConfig {
    /// Creates a new noise layer description.
    pub fn new(frequency: f64, weight: f64) -> Self {
        NoiseLayerConfig { frequency, weight }
    }
}

/// Complete configuration of a streaming world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of a chunk, in voxels.
    pub chunk_size: i32,
    /// World extent along X, in voxels. Chunks exist for x in `0..width`.
    pub width: i32,
    /// World extent along Y, in voxels. Also scales the terrain height.
    pub height: i32,
    /// World extent along Z, in voxels.
    pub depth: i32,
    /// Initial max view distance. Clamped to `[MIN_VIEW_DISTANCE, MAX_VIEW_DISTANCE]`.
    pub max_view_distance: f32,
    /// Terrain noise layers as (frequency, weight) pairs.
    pub noise_layers: Vec<NoiseLayerConfig>,
    /// Seed for the terrain noise functions.
    pub seed: u32,
    /// Ticks between eviction sweeps.
    pub eviction_interval_ticks: u64,
    /// Ticks between camera snapshot publications to the background updater.
    pub snapshot_interval_ticks: u64,
    /// Pause between background updater passes, in milliseconds.
    pub updater_interval_ms: u64,
    /// Whether `World::update` starts the background updater thread.
    pub background_updates: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            chunk_size: 16,
            width: 2048,
            height: 64,
            depth: 2048,
            max_view_distance: 200.0,
            noise_layers: vec![
                NoiseLayerConfig::new(0.003, 1.0),
                NoiseLayerConfig::new(0.01, 0.2),
                NoiseLayerConfig::new(0.03, 0.1),
            ],
            seed: 0,
            eviction_interval_ticks: 30,
            snapshot_interval_ticks: 5,
            updater_interval_ms: 50,
            background_updates: true,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, WorldError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!("Loaded world configuration from {}", path.display());
        Ok(config)
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.chunk_size < 1 {
            return Err(WorldError::InvalidConfig(format!(
                "chunk_size must be at least 1, got {}",
                self.chunk_size
            )));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(WorldError::InvalidConfig(format!(
                "chunk_size must be at most {MAX_CHUNK_SIZE}, got {}",
                self.chunk_size
            )));
        }
        for (name, extent) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
        ] {
            if extent < 1 {
                return Err(WorldError::InvalidConfig(format!(
                    "{name} must be at least 1, got {extent}"
                )));
            }
        }
        if !self.max_view_distance.is_finite() {
            return Err(WorldError::InvalidConfig(
                "max_view_distance must be finite".to_string(),
            ));
        }
        if self.noise_layers.is_empty() {
            return Err(WorldError::InvalidConfig(
                "at least one noise layer is required".to_string(),
            ));
        }
        if self
            .noise_layers
            .iter()
            .any(|layer| !layer.frequency.is_finite() || !layer.weight.is_finite() || layer.weight < 0.0)
        {
            return Err(WorldError::InvalidConfig(
                "noise layers need finite frequencies and non-negative finite weights".to_string(),
            ));
        }
        if self.total_noise_weight() <= 0.0 {
            return Err(WorldError::InvalidConfig(
                "noise layer weights must sum to a positive value".to_string(),
            ));
        }
        if self.eviction_interval_ticks == 0 || self.snapshot_interval_ticks == 0 {
            return Err(WorldError::InvalidConfig(
                "tick intervals must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sum of all noise layer weights.
    pub fn total_noise_weight(&self) -> f64 {
        self.noise_layers.iter().map(|layer| layer.weight).sum()
    }

    /// Pause between background updater passes.
    pub fn updater_interval(&self) -> Duration {
        Duration::from_millis(self.updater_interval_ms)
    }

    /// Whether the chunk with this key lies inside the world extent.
    pub fn contains_chunk(&self, key: &ChunkKey) -> bool {
        (0..self.width).contains(&key.x)
            && (0..self.height).contains(&key.y)
            && (0..self.depth).contains(&key.z)
    }
}

/// Clamps a view distance into the supported range.
pub fn clamp_view_distance(distance: f32) -> f32 {
    distance.clamp(MIN_VIEW_DISTANCE, MAX_VIEW_DISTANCE)
}
