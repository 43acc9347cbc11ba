//! # Engine State Module
//!
//! The core engine module that manages the state of a streamed voxel world.
//!
//! ## Key Components
//!
//! * `EngineState` - Headless driver owning the world and its observer
//! * `camera_state` - Camera, projection, frustum and the snapshot the world publishes
//! * `rendering` - CPU-side chunk meshing
//! * `voxels` - Voxel data, chunks, terrain, the world and its background updater
//!
//! ## Architecture
//!
//! `EngineState` plays the part of the render loop: every call to `advance`
//! moves the camera, hands its pose to the world and ticks the world once.
//! The world does all streaming work; the engine only observes it.

use cgmath::{Deg, Point3};
use log::info;

use camera_state::camera::{Camera, Projection};
use voxels::world::World;

use crate::config::{WorldConfig, MAX_VIEW_DISTANCE};
use crate::error::WorldError;

pub mod camera_state;
pub mod rendering;
pub mod voxels;

/// Height of the camera above the ground while walking.
pub const FACE_HEIGHT: f32 = 3.0;

/// Vertical speed when climbing onto higher ground, per tick.
const CLIMB_STEP: f32 = 0.2;

/// Added to the fall speed on every airborne tick.
const GRAVITY_STEP: f32 = 0.01;

/// Height differences below this snap the camera onto the ground.
const GROUND_SNAP: f32 = 0.1;

/// Horizontal footprint of the walking camera.
const FOOTPRINT: f32 = 1.0;

/// Far clip plane of the observer. Kept past `MAX_VIEW_DISTANCE` so the view
/// distance, not the frustum, limits how far the world streams.
const CAMERA_FAR: f32 = 1500.0;

/// Headless stand-in for the render loop.
///
/// # Examples
///
/// ```
/// use voxel_streaming::config::WorldConfig;
/// use voxel_streaming::engine_state::EngineState;
///
/// let config = WorldConfig {
///     background_updates: false,
///     ..WorldConfig::default()
/// };
/// let mut engine = EngineState::new(config).unwrap();
/// engine.advance(0.016).unwrap();
/// assert_eq!(engine.world().tick(), 1);
/// ```
pub struct EngineState {
    world: World,
    camera: Camera,
    projection: Projection,
    /// Whether the camera follows the terrain
    pub walking_enabled: bool,
    /// Horizontal camera speed in units per second
    pub flight_speed: f32,
    /// Yaw change in degrees per second
    pub turn_rate: f32,
    fall_speed: f32,
}

impl EngineState {
    /// Creates a world from `config` and places the camera above its middle.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        let start = Point3::new(
            config.width as f32 / 2.0,
            config.height as f32 + FACE_HEIGHT,
            config.depth as f32 / 2.0,
        );
        let world = World::new(config)?;
        let camera = Camera::new(start, Deg(0.0), Deg(-20.0));
        let projection = Projection::new(1280, 720, Deg(67.0), 0.1, CAMERA_FAR);
        Ok(EngineState {
            world,
            camera,
            projection,
            walking_enabled: true,
            flight_speed: 8.0,
            turn_rate: 3.0,
            fall_speed: 0.0,
        })
    }

    /// The streamed world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the streamed world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The observer.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the observer.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Moves the camera, publishes its pose to the world and ticks the world.
    ///
    /// # Arguments
    /// * `dt` - Seconds since the previous call
    pub fn advance(&mut self, dt: f32) -> Result<(), WorldError> {
        self.camera.rotate(Deg(self.turn_rate * dt), Deg(0.0));
        self.camera.advance_horizontally(self.flight_speed * dt);
        self.simulate_walking();
        self.world.set_camera(&self.camera, &self.projection);
        self.world.update(dt)
    }

    /// Quick ground following: climb toward the highest ground under the
    /// camera's footprint, fall with growing speed when above it.
    ///
    /// Does nothing while no loaded chunk has ground under the camera.
    pub fn simulate_walking(&mut self) {
        if !self.walking_enabled {
            return;
        }
        let position = self.camera.position;
        let ground = self.world.get_bounding_box_elevation(
            position.x - FOOTPRINT / 2.0,
            position.z - FOOTPRINT / 2.0,
            FOOTPRINT,
            FOOTPRINT,
        );
        if ground < 0 {
            return;
        }
        let target = ground as f32 + FACE_HEIGHT;
        let difference = target - position.y;
        if difference.abs() <= GROUND_SNAP {
            self.camera.position.y = target;
            self.fall_speed = 0.0;
        } else if difference > 0.0 {
            self.camera.position.y += CLIMB_STEP;
        } else {
            self.fall_speed += GRAVITY_STEP;
            self.camera.position.y -= self.fall_speed;
        }
    }

    /// Logs the world's counters.
    pub fn log_stats(&self) {
        let stats = self.world.stats();
        let pool = self.world.pool_stats();
        let frustum = self.camera.frustum(&self.projection);
        info!(
            "tick {} ({:.1}s): {} chunks ({} in view), backlog {}, created {}, removed {}, pool {}/{} free, {} vertices",
            self.world.tick(),
            self.world.elapsed(),
            stats.chunks,
            self.world.chunks_in_frustum(&frustum),
            stats.backlog,
            stats.created,
            stats.removed,
            pool.free,
            pool.created,
            self.world.vertex_count(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::camera_state::CameraSnapshot;
    use crate::engine_state::voxels::block::block_type::VoxelType;
    use crate::engine_state::voxels::tasks::world_updater::for_each_desired_chunk;

    fn flat_engine() -> EngineState {
        let config = WorldConfig {
            width: 32,
            height: 32,
            depth: 32,
            background_updates: false,
            ..WorldConfig::default()
        };
        let mut engine = EngineState::new(config).unwrap();
        engine.flight_speed = 0.0;
        engine.world().create_all_chunks();
        // clear everything above y = 4
        for x in 0..32 {
            for z in 0..32 {
                for y in 5..32 {
                    engine.world().set_cube_type(x, y, z, VoxelType::VOID);
                }
            }
        }
        engine
    }

    #[test]
    fn test_walking_falls_then_lands() {
        let mut engine = flat_engine();
        engine.camera_mut().position = Point3::new(10.0, 7.5, 10.0);
        engine.simulate_walking();
        assert!((engine.camera().position.y - 7.49).abs() < 1e-5);
        engine.simulate_walking();
        assert!((engine.camera().position.y - 7.47).abs() < 1e-5);

        engine.camera_mut().position.y = 7.05;
        engine.simulate_walking();
        assert_eq!(engine.camera().position.y, 4.0 + FACE_HEIGHT);
    }

    #[test]
    fn test_walking_climbs() {
        let mut engine = flat_engine();
        engine.camera_mut().position = Point3::new(10.0, 5.0, 10.0);
        engine.simulate_walking();
        assert!((engine.camera().position.y - 5.2).abs() < 1e-5);
    }

    /// Wanted chunks whose center is farther than `beyond` from the camera.
    fn wanted_beyond(engine: &EngineState, beyond: f32) -> usize {
        let position = engine.camera().position;
        let snapshot = CameraSnapshot::new(
            position,
            engine.camera().frustum(&engine.projection),
            engine.world().max_view_distance(),
        );
        let size = engine.world().config().chunk_size;
        let mut count = 0;
        for_each_desired_chunk(&snapshot, engine.world().config(), |key| {
            if key.center_distance2(size, position) > beyond * beyond {
                count += 1;
            }
        });
        count
    }

    #[test]
    fn test_raised_view_distance_reaches_new_chunks() {
        let mut engine = EngineState::new(WorldConfig {
            background_updates: false,
            ..WorldConfig::default()
        })
        .unwrap();
        let initial = engine.world().max_view_distance();
        assert_eq!(wanted_beyond(&engine, initial + 50.0), 0);

        engine.world_mut().set_max_view_distance(600.0);
        assert!(wanted_beyond(&engine, initial + 50.0) > 1000);

        engine.world_mut().set_max_view_distance(MAX_VIEW_DISTANCE);
        assert!(wanted_beyond(&engine, 900.0) > 0);
    }

    #[test]
    fn test_advance_turns_the_camera() {
        let mut engine = flat_engine();
        engine.walking_enabled = false;
        engine.turn_rate = 90.0;
        let yaw = engine.camera().yaw;
        engine.advance(1.0).unwrap();
        assert!((engine.camera().yaw.0 - yaw.0 - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(engine.world().elapsed(), 1.0);
    }

    #[test]
    fn test_walking_disabled_keeps_height() {
        let mut engine = flat_engine();
        engine.walking_enabled = false;
        engine.camera_mut().position = Point3::new(10.0, 20.0, 10.0);
        engine.simulate_walking();
        assert_eq!(engine.camera().position.y, 20.0);
    }
}
