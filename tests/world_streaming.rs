use std::thread;
use std::time::Duration;

use cgmath::Point3;
use voxel_streaming::config::WorldConfig;
use voxel_streaming::engine_state::rendering::ChunkMesh;
use voxel_streaming::engine_state::voxels::block::block_side::BlockSide;
use voxel_streaming::engine_state::voxels::block::block_type::VoxelType;
use voxel_streaming::engine_state::voxels::chunk::voxel_grid::VoxelGrid;
use voxel_streaming::{World, WorldError};

/// Counts mesh rebuilds instead of producing geometry.
#[derive(Default)]
struct CountingMesh {
    resets: usize,
    builds: usize,
}

impl ChunkMesh for CountingMesh {
    fn reset(&mut self, _grid: &VoxelGrid) {
        self.resets += 1;
    }

    fn build_mesh(&mut self) {
        self.builds += 1;
    }

    fn vertex_count(&self) -> usize {
        0
    }
}

fn config(chunk_size: i32, width: i32, height: i32, depth: i32) -> WorldConfig {
    WorldConfig {
        chunk_size,
        width,
        height,
        depth,
        background_updates: false,
        ..WorldConfig::default()
    }
}

#[test]
fn test_admitted_chunk_covers_its_volume() {
    let mut world: World = World::new(config(16, 256, 64, 256)).unwrap();
    assert!(world.enqueue(Point3::new(20, 40, 36)));
    world.update(0.016).unwrap();

    for (x, y, z) in [
        (16.0, 32.0, 32.0),
        (31.99, 47.99, 47.99),
        (24.5, 40.0, 33.0),
    ] {
        assert!(world.has_chunk_at(x, y, z));
        assert!(world.has_cube_at(x, y, z));
        assert!(world.get_cube_at(x, y, z).is_some());
    }
    assert!(!world.has_chunk_at(32.0, 32.0, 32.0));
    assert!(!world.has_cube_at(15.99, 32.0, 32.0));
    assert_eq!(world.get_cube_at(15.99, 32.0, 32.0), None);
}

#[test]
fn test_admission_is_nearest_first() {
    let mut world: World = World::new(config(1, 64, 64, 64)).unwrap();
    world.set_camera_position(Point3::new(0.5, 0.5, 0.5));
    // squared distances 9, 4 and 25
    assert!(world.enqueue(Point3::new(3, 0, 0)));
    assert!(world.enqueue(Point3::new(2, 0, 0)));
    assert!(world.enqueue(Point3::new(5, 0, 0)));

    world.update(0.016).unwrap();
    assert!(world.has_chunk_at(2.5, 0.5, 0.5));
    assert_eq!(world.chunk_count(), 1);

    world.update(0.016).unwrap();
    assert!(world.has_chunk_at(3.5, 0.5, 0.5));
    assert!(!world.has_chunk_at(5.5, 0.5, 0.5));

    world.update(0.016).unwrap();
    assert!(world.has_chunk_at(5.5, 0.5, 0.5));
    assert_eq!(world.backlog_size(), 0);
}

#[test]
fn test_budget_scales_with_backlog() {
    let mut world: World = World::new(config(16, 2048, 64, 2048)).unwrap();
    for i in 0..37 {
        assert!(world.enqueue(Point3::new(i * 16, 0, 0)));
    }
    world.update(0.016).unwrap();

    let stats = world.stats();
    assert_eq!(stats.chunks, 4);
    assert_eq!(stats.backlog, 33);
    assert_eq!(stats.created, 4);
}

#[test]
fn test_eviction_boundary_is_strict() {
    let mut world: World = World::new(WorldConfig {
        eviction_interval_ticks: 1,
        ..config(16, 256, 64, 256)
    })
    .unwrap();
    world.set_max_view_distance(40.0);

    // chunk center (8, 8, 8) is exactly 40 away
    world.set_camera_position(Point3::new(8.0, 8.0, 48.0));
    assert!(world.enqueue(Point3::new(0, 0, 0)));
    world.update(0.016).unwrap();
    world.update(0.016).unwrap();
    assert!(world.has_chunk_at(8.0, 8.0, 8.0));
    assert_eq!(world.pool_stats().free, 0);

    world.set_camera_position(Point3::new(8.0, 8.0, 49.0));
    world.update(0.016).unwrap();
    assert!(!world.has_chunk_at(8.0, 8.0, 8.0));
    assert_eq!(world.pool_stats().free, 1);
    assert_eq!(world.chunks_removed(), 1);
    assert_eq!(world.chunk_count(), 0);
}

#[test]
fn test_mesh_rebuild_happens_once_per_change() {
    let mut world = World::<CountingMesh>::new(config(16, 256, 64, 256)).unwrap();
    assert!(world.enqueue(Point3::new(0, 0, 0)));
    world.update(0.016).unwrap();

    let builds = |world: &World<CountingMesh>| {
        world
            .with_chunk_at(1.0, 1.0, 1.0, |chunk| {
                assert!(!chunk.is_dirty());
                (chunk.mesh().resets, chunk.mesh().builds)
            })
            .unwrap()
    };
    assert_eq!(builds(&world), (1, 1));

    world.update(0.016).unwrap();
    assert_eq!(builds(&world), (1, 1));

    assert!(world.set_cube_type(3, 3, 3, VoxelType::DIRT));
    world.update(0.016).unwrap();
    assert_eq!(builds(&world), (2, 2));
}

#[test]
fn test_column_elevation_across_stacked_chunks() {
    let world: World = World::new(config(4, 4, 12, 4)).unwrap();
    world.create_all_chunks();
    assert_eq!(world.chunk_count(), 3);
    assert_eq!(world.get_elevation(1.5, 2.5), 11);

    for x in 0..4 {
        for z in 0..4 {
            for y in 2..12 {
                assert!(world.set_cube_type(x, y, z, VoxelType::VOID));
            }
        }
    }
    // only the bottom chunk holds solid voxels
    assert_eq!(world.get_elevation(1.5, 2.5), 1);

    world.set_cube_type(1, 1, 2, VoxelType::VOID);
    world.set_cube_type(1, 0, 2, VoxelType::VOID);
    assert_eq!(world.get_elevation(1.5, 2.5), -1);
    assert_eq!(world.get_bounding_box_elevation(1.0, 2.0, 1.0, 1.0), 1);
    assert_eq!(world.get_elevation(100.0, 100.0), -1);
}

#[test]
fn test_hidden_faces_span_chunk_boundaries() {
    let mut world: World = World::new(config(4, 8, 4, 4)).unwrap();
    world.create_all_chunks();
    world.update(0.016).unwrap();

    let inner = world.get_cube_at(3.5, 1.5, 1.5).unwrap();
    assert!(inner.is_face_hidden(BlockSide::RIGHT));
    assert!(inner.is_face_hidden(BlockSide::LEFT));

    let outer = world.get_cube_at(7.5, 1.5, 1.5).unwrap();
    assert!(!outer.is_face_hidden(BlockSide::RIGHT));
    assert!(outer.is_face_hidden(BlockSide::LEFT));

    world.set_cube_type(4, 1, 1, VoxelType::VOID);
    world.update(0.016).unwrap();
    let inner = world.get_cube_at(3.5, 1.5, 1.5).unwrap();
    assert!(!inner.is_face_hidden(BlockSide::RIGHT));
}

#[test]
fn test_calculate_hidden_faces_without_tick() {
    let world: World = World::new(config(4, 8, 4, 4)).unwrap();
    world.create_all_chunks();
    world.calculate_hidden_faces();
    let voxel = world.get_cube_at(4.0, 1.0, 1.0).unwrap();
    assert!(voxel.is_face_hidden(BlockSide::LEFT));
    assert_eq!(voxel.hidden_face_count(), 6);
}

#[test]
fn test_updater_waits_for_snapshot_and_deduplicates() {
    let world: World = World::new(WorldConfig {
        max_view_distance: 1000.0,
        ..config(16, 64, 32, 64)
    })
    .unwrap();
    let mut updater = world.detached_updater();
    assert_eq!(updater.step(), 0);
    assert_eq!(world.backlog_size(), 0);

    world.publish_snapshot();
    assert_eq!(updater.step(), 32);
    assert_eq!(world.backlog_size(), 32);
    assert_eq!(updater.step(), 0);
    assert_eq!(world.backlog_size(), 32);
}

#[test]
fn test_updater_skips_queued_chunks() {
    let world: World = World::new(WorldConfig {
        max_view_distance: 1000.0,
        ..config(16, 64, 32, 64)
    })
    .unwrap();
    assert!(world.enqueue(Point3::new(0, 0, 0)));
    let mut updater = world.detached_updater();
    world.publish_snapshot();
    assert_eq!(updater.step(), 31);
}

#[test]
fn test_regenerated_terrain_is_identical() {
    let mut world: World = World::new(WorldConfig {
        eviction_interval_ticks: 1,
        ..config(16, 2048, 64, 2048)
    })
    .unwrap();
    let types = |world: &World| {
        world
            .with_chunk_at(200.0, 20.0, 300.0, |chunk| {
                chunk
                    .grid()
                    .iter()
                    .map(|voxel| voxel.voxel_type)
                    .collect::<Vec<VoxelType>>()
            })
            .unwrap()
    };

    world.set_camera_position(Point3::new(200.0, 20.0, 300.0));
    assert!(world.enqueue(Point3::new(200, 20, 300)));
    world.update(0.016).unwrap();
    let first = types(&world);

    world.set_camera_position(Point3::new(1500.0, 20.0, 1500.0));
    world.update(0.016).unwrap();
    assert!(!world.has_chunk_at(200.0, 20.0, 300.0));

    world.set_camera_position(Point3::new(200.0, 20.0, 300.0));
    assert!(world.enqueue(Point3::new(200, 20, 300)));
    world.update(0.016).unwrap();
    assert_eq!(types(&world), first);
    assert_eq!(world.pool_stats().created, 1);
    assert_eq!(world.pool_stats().obtained, 2);
}

#[test]
fn test_background_updater_streams_chunks() {
    let mut world: World = World::new(WorldConfig {
        chunk_size: 16,
        width: 128,
        height: 32,
        depth: 128,
        updater_interval_ms: 5,
        ..WorldConfig::default()
    })
    .unwrap();
    world.set_camera_position(Point3::new(64.0, 16.0, 64.0));

    for _ in 0..400 {
        world.update(0.016).unwrap();
        if world.chunk_count() > 0 {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    assert!(world.is_updater_running());
    assert!(world.chunk_count() > 0);
    assert!(world.stats().created > 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = World::<CountingMesh>::new(config(0, 16, 16, 16));
    assert!(matches!(result, Err(WorldError::InvalidConfig(_))));
}
