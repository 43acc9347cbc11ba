//! # Terrain Module
//!
//! Deterministic height-map terrain. A fixed stack of Perlin noise layers,
//! each with its own frequency and weight, is sampled once per (x, z) column
//! of a grid. The weighted sum, normalized to `[0, 1]` and scaled by the world
//! height, gives the surface height of that column.
//!
//! Generation is a pure function of the grid origin, the world height and the
//! layer configuration: an evicted chunk regenerates to exactly the same
//! voxels when it is admitted again.

use noise::{NoiseFn, Perlin};

use crate::config::{NoiseLayerConfig, WorldConfig};
use crate::engine_state::voxels::block::block_type::VoxelType;
use crate::engine_state::voxels::chunk::voxel_grid::VoxelGrid;

/// A single layer of the terrain noise stack.
pub struct NoiseLayer {
    noise: Perlin,
    frequency: f64,
    weight: f64,
}

impl NoiseLayer {
    /// Creates a layer sampling its own Perlin function.
    pub fn new(seed: u32, frequency: f64, weight: f64) -> Self {
        NoiseLayer {
            noise: Perlin::new(seed),
            frequency,
            weight,
        }
    }

    /// Noise at a world column, mapped from `[-1, 1]` into `[0, 1]`.
    pub fn sample(&self, x: i32, z: i32) -> f64 {
        let value = self
            .noise
            .get([x as f64 * self.frequency, z as f64 * self.frequency]);
        ((value + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

/// Assigns voxel types to freshly created grids.
pub struct TerrainGenerator {
    layers: Vec<NoiseLayer>,
    total_weight: f64,
    world_height: i32,
}

impl TerrainGenerator {
    /// Builds the layer stack. Layer `i` is seeded with `seed + i` so layers
    /// sharing a frequency still differ.
    pub fn new(layers: &[NoiseLayerConfig], seed: u32, world_height: i32) -> Self {
        let layers: Vec<NoiseLayer> = layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                NoiseLayer::new(seed.wrapping_add(i as u32), layer.frequency, layer.weight)
            })
            .collect();
        let total_weight = layers.iter().map(|layer| layer.weight).sum();
        TerrainGenerator {
            layers,
            total_weight,
            world_height,
        }
    }

    /// Builds the generator described by a world configuration.
    pub fn from_config(config: &WorldConfig) -> Self {
        TerrainGenerator::new(&config.noise_layers, config.seed, config.height)
    }

    /// Weighted layer sum at a world column, normalized to `[0, 1]`.
    pub fn elevation_fraction(&self, x: i32, z: i32) -> f64 {
        let sum: f64 = self
            .layers
            .iter()
            .map(|layer| layer.sample(x, z) * layer.weight)
            .sum();
        (sum / self.total_weight).clamp(0.0, 1.0)
    }

    /// Surface height of a world column, in voxels.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        (self.elevation_fraction(x, z) * self.world_height as f64).floor() as i32
    }

    /// Fills `grid` with terrain.
    ///
    /// Voxels above the column's surface height become `VOID`, the voxel at
    /// the surface height becomes `GRASS`, and everything below is `DIRT`.
    pub fn apply(&self, grid: &mut VoxelGrid) {
        let size = grid.size();
        let origin = grid.origin();

        let mut surface = Vec::with_capacity((size * size) as usize);
        for lz in 0..size {
            for lx in 0..size {
                surface.push(self.surface_height(origin.x + lx, origin.z + lz));
            }
        }

        for voxel in grid.iter_mut() {
            let target = surface[(i32::from(voxel.x) + size * i32::from(voxel.z)) as usize];
            let y = origin.y + i32::from(voxel.y);
            voxel.voxel_type = if y > target {
                VoxelType::VOID
            } else if y == target {
                VoxelType::GRASS
            } else {
                VoxelType::DIRT
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;

    fn generator() -> TerrainGenerator {
        TerrainGenerator::from_config(&WorldConfig::default())
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = {
            let mut grid = VoxelGrid::create(16, Point3::new(160, 16, -48));
            generator().apply(&mut grid);
            grid
        };
        // a recycled grid that held other terrain before
        let mut second = VoxelGrid::create(16, Point3::new(0, 0, 0));
        generator().apply(&mut second);
        second.init(Point3::new(160, 16, -48));
        generator().apply(&mut second);

        let first_types: Vec<VoxelType> = first.iter().map(|v| v.voxel_type).collect();
        let second_types: Vec<VoxelType> = second.iter().map(|v| v.voxel_type).collect();
        assert_eq!(first_types, second_types);
    }

    #[test]
    fn test_columns_have_void_grass_dirt_layering() {
        let generator = generator();
        let mut grid = VoxelGrid::create(8, Point3::new(32, 24, 8));
        generator.apply(&mut grid);

        for voxel in grid.iter() {
            let position = grid.world_position(voxel);
            let surface = generator.surface_height(position.x, position.z);
            let expected = match position.y.cmp(&surface) {
                std::cmp::Ordering::Greater => VoxelType::VOID,
                std::cmp::Ordering::Equal => VoxelType::GRASS,
                std::cmp::Ordering::Less => VoxelType::DIRT,
            };
            assert_eq!(voxel.voxel_type, expected);
        }
    }

    #[test]
    fn test_surface_stays_within_world_height() {
        let generator = generator();
        for x in (0..2048).step_by(97) {
            for z in (0..2048).step_by(89) {
                let fraction = generator.elevation_fraction(x, z);
                assert!((0.0..=1.0).contains(&fraction));
                let height = generator.surface_height(x, z);
                assert!((0..=64).contains(&height));
            }
        }
    }

    #[test]
    fn test_single_flat_layer() {
        // frequency 0 samples the lattice origin everywhere, where Perlin is 0
        let generator = TerrainGenerator::new(&[NoiseLayerConfig::new(0.0, 2.0)], 3, 32);
        assert_eq!(generator.elevation_fraction(123, -77), 0.5);
        assert_eq!(generator.surface_height(5, 5), 16);

        let mut grid = VoxelGrid::create(16, Point3::new(0, 16, 0));
        generator.apply(&mut grid);
        assert_eq!(grid.get_elevation(3.0, 3.0), 16);
        assert_eq!(grid.get_cube_at(3.0, 16.0, 3.0).voxel_type, VoxelType::GRASS);
        assert_eq!(grid.get_cube_at(3.0, 17.0, 3.0).voxel_type, VoxelType::VOID);
    }
}
