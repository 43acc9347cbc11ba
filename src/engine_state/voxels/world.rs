//! # World Module
//!
//! This module provides the `World` struct which streams chunks around a
//! moving observer. It serves as the central coordinator for chunk admission,
//! eviction, mesh refresh and world-space queries.
//!
//! ## Architecture
//!
//! Everything shared with the background updater lives in one `WorldState`
//! behind a single lock: the spatial index, the chunk arena, the creation
//! backlog, the latest camera snapshot and the running counters. The updater
//! only ever reads the snapshot and merges proposed keys into the backlog;
//! chunks themselves are created, refreshed and evicted on the ticking thread.
//!
//! ## Tick
//!
//! Each call to `World::update`:
//! 1. starts the background updater on first use, or reports that it died
//! 2. republishes the camera snapshot every `snapshot_interval_ticks` ticks
//! 3. admits `1 + backlog / 10` chunks, nearest to the camera first
//! 4. every `eviction_interval_ticks` ticks, evicts chunks whose center is
//!    farther than the max view distance
//! 5. refreshes hidden faces and meshes of dirty chunks
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map keyed by the chunk origin
//! - Admission rescans the whole backlog for the nearest entry
//! - Evicted chunks keep their buffers and are recycled by the arena

use std::collections::HashSet;

use cgmath::Point3;
use log::{debug, info, trace};

use crate::config::{clamp_view_distance, WorldConfig};
use crate::core::MtResource;
use crate::engine_state::camera_state::{
    camera::{Camera, Projection},
    frustum::Frustum,
    CameraSnapshot,
};
use crate::engine_state::rendering::{ChunkMesh, FaceMesh};
use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::VoxelType, Voxel};
use crate::engine_state::voxels::chunk::{
    chunk_arena::{ChunkArena, PoolStats},
    chunk_index::{self, ChunkKey, SpatialIndex},
    voxel_grid::NeighborLookup,
    Chunk,
};
use crate::engine_state::voxels::tasks::world_updater::{WorldUpdater, WorldUpdaterHandle};
use crate::engine_state::voxels::terrain::TerrainGenerator;
use crate::error::WorldError;

/// Diagnostic counters of a world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Live chunks
    pub chunks: usize,
    /// Keys waiting for admission
    pub backlog: usize,
    /// Chunks admitted since the world was created
    pub created: u64,
    /// Chunks evicted since the world was created
    pub removed: u64,
}

/// Live chunks: the spatial index and the arena owning the chunks it points to.
pub struct ChunkStore<M: ChunkMesh> {
    chunk_size: i32,
    index: SpatialIndex,
    arena: ChunkArena<M>,
}

impl<M: ChunkMesh> ChunkStore<M> {
    fn new(chunk_size: i32) -> Self {
        ChunkStore {
            chunk_size,
            index: SpatialIndex::new(),
            arena: ChunkArena::new(chunk_size),
        }
    }

    /// Whether a chunk with this key is live.
    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.index.contains(key)
    }

    /// The live chunk with this key.
    pub fn chunk(&self, key: &ChunkKey) -> Option<&Chunk<M>> {
        self.index.get(key).and_then(|slot| self.arena.get(slot))
    }

    fn chunk_mut(&mut self, key: &ChunkKey) -> Option<&mut Chunk<M>> {
        let slot = self.index.get(key)?;
        self.arena.get_mut(slot)
    }

    /// Live chunks in admission order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk<M>> + '_ {
        self.index.iter().filter_map(|(_, slot)| self.arena.get(slot))
    }

    /// Number of live chunks.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no chunk is live.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Obtains a chunk for `key`, lets `fill` populate its grid and indexes it.
    fn insert(&mut self, key: ChunkKey, fill: impl FnOnce(&mut Chunk<M>)) {
        let slot = self.arena.obtain(key);
        if let Some(chunk) = self.arena.get_mut(slot) {
            fill(chunk);
        }
        self.index.insert(key, slot);
        self.mark_neighbors_dirty(key);
    }

    /// Chunks sharing a face with `key` see a different neighbor now.
    fn mark_neighbors_dirty(&mut self, key: ChunkKey) {
        for side in BlockSide::all() {
            let step = side.offset() * self.chunk_size;
            let neighbor = ChunkKey::new(key.x + step.x, key.y + step.y, key.z + step.z);
            if let Some(chunk) = self.chunk_mut(&neighbor) {
                chunk.mark_dirty();
            }
        }
    }

    /// Removes every chunk whose center is strictly farther than
    /// `max_view_distance` from `position`, then returns their slots to the
    /// arena.
    ///
    /// # Returns
    /// The number of evicted chunks.
    fn evict_beyond(&mut self, position: Point3<f32>, max_view_distance: f32) -> usize {
        let size = self.chunk_size;
        let max2 = max_view_distance * max_view_distance;
        let removed = self
            .index
            .sweep(|key, _| key.center_distance2(size, position) > max2);
        for &(_, slot) in &removed {
            self.arena.free(slot);
        }
        for &(key, _) in &removed {
            self.mark_neighbors_dirty(key);
        }
        removed.len()
    }

    /// Refreshes every dirty chunk.
    ///
    /// # Returns
    /// The number of meshes rebuilt.
    fn update_dirty(&mut self) -> usize {
        let dirty: Vec<usize> = self
            .index
            .iter()
            .filter(|&(_, slot)| self.arena.get(slot).is_some_and(Chunk::is_dirty))
            .map(|(_, slot)| slot)
            .collect();
        let mut rebuilt = 0;
        for slot in dirty {
            let mut chunk = self.arena.check_out(slot);
            if chunk.update(&*self) {
                rebuilt += 1;
            }
            self.arena.check_in(slot, chunk);
        }
        rebuilt
    }

    /// Recomputes the hidden-face masks of every live chunk and marks them
    /// dirty.
    fn recalculate_hidden_faces(&mut self) {
        let slots: Vec<usize> = self.index.iter().map(|(_, slot)| slot).collect();
        for slot in slots {
            let mut chunk = self.arena.check_out(slot);
            chunk.grid_mut().calculate_hidden_faces(&*self);
            chunk.mark_dirty();
            self.arena.check_in(slot, chunk);
        }
    }
}

impl<M: ChunkMesh> NeighborLookup for ChunkStore<M> {
    fn solid_at(&self, x: i32, y: i32, z: i32) -> Option<bool> {
        let key = ChunkKey::containing_voxel(x, y, z, self.chunk_size);
        self.chunk(&key)?.grid().solid_at(x, y, z)
    }
}

/// Everything the ticking thread shares with the background updater.
pub struct WorldState<M: ChunkMesh> {
    store: ChunkStore<M>,
    /// Keys waiting for admission. A key is never both here and in the index.
    backlog: HashSet<ChunkKey>,
    snapshot: Option<CameraSnapshot>,
    chunks_created: u64,
    chunks_removed: u64,
}

impl<M: ChunkMesh> WorldState<M> {
    fn new(chunk_size: i32) -> Self {
        WorldState {
            store: ChunkStore::new(chunk_size),
            backlog: HashSet::new(),
            snapshot: None,
            chunks_created: 0,
            chunks_removed: 0,
        }
    }

    /// The live chunks.
    pub fn store(&self) -> &ChunkStore<M> {
        &self.store
    }

    /// The most recently published camera snapshot.
    pub fn snapshot(&self) -> Option<CameraSnapshot> {
        self.snapshot
    }

    /// Whether `key` is live or already waiting for admission.
    pub fn is_known(&self, key: &ChunkKey) -> bool {
        self.store.contains(key) || self.backlog.contains(key)
    }

    /// Adds proposed keys to the backlog, skipping known ones.
    ///
    /// # Returns
    /// How many keys were new.
    pub fn merge_proposals(&mut self, keys: impl IntoIterator<Item = ChunkKey>) -> usize {
        let mut added = 0;
        for key in keys {
            if !self.store.contains(&key) && self.backlog.insert(key) {
                added += 1;
            }
        }
        added
    }

    /// Number of keys waiting for admission.
    pub fn backlog_size(&self) -> usize {
        self.backlog.len()
    }

    /// Admits the backlog entry nearest to `position`.
    ///
    /// Distances are compared squared; ties go to the smaller key so the
    /// order never depends on hash iteration order.
    ///
    /// # Returns
    /// The admitted key, or `None` if the backlog is empty.
    fn process_creation_queue(
        &mut self,
        position: Point3<f32>,
        generator: &TerrainGenerator,
    ) -> Option<ChunkKey> {
        let size = self.store.chunk_size;
        let key = self.backlog.iter().copied().min_by(|a, b| {
            a.center_distance2(size, position)
                .total_cmp(&b.center_distance2(size, position))
                .then_with(|| a.cmp(b))
        })?;
        self.backlog.remove(&key);
        self.store
            .insert(key, |chunk| generator.apply(chunk.grid_mut()));
        self.chunks_created += 1;
        trace!("Admitted chunk {key:?}");
        Some(key)
    }

    fn remove_chunks_out_of_view_range(
        &mut self,
        position: Point3<f32>,
        max_view_distance: f32,
    ) -> usize {
        let removed = self.store.evict_beyond(position, max_view_distance);
        self.chunks_removed += removed as u64;
        removed
    }

    fn stats(&self) -> WorldStats {
        WorldStats {
            chunks: self.store.len(),
            backlog: self.backlog.len(),
            created: self.chunks_created,
            removed: self.chunks_removed,
        }
    }
}

/// Represents a streamed voxel world composed of cubic chunks.
///
/// `M` is the mesh kept per chunk. The default `FaceMesh` builds face-culled
/// vertex data.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_streaming::config::WorldConfig;
/// use voxel_streaming::engine_state::voxels::world::World;
///
/// let config = WorldConfig {
///     background_updates: false,
///     ..WorldConfig::default()
/// };
/// let mut world: World = World::new(config).unwrap();
///
/// // Queue the chunk containing (40, 10, 40) and admit it
/// assert!(world.enqueue(Point3::new(40, 10, 40)));
/// world.update(0.016).unwrap();
/// assert!(world.has_chunk_at(40.0, 10.0, 40.0));
/// ```
pub struct World<M: ChunkMesh = FaceMesh> {
    config: WorldConfig,
    state: MtResource<WorldState<M>>,
    generator: TerrainGenerator,
    updater: Option<WorldUpdaterHandle>,
    camera_position: Point3<f32>,
    camera_frustum: Frustum,
    max_view_distance: f32,
    tick: u64,
    elapsed: f32,
}

impl<M: ChunkMesh> World<M> {
    /// Creates a new, empty world.
    ///
    /// The background updater is not started until the first `update`.
    ///
    /// # Errors
    /// Returns `WorldError::InvalidConfig` if the configuration fails validation.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        info!(
            "Creating world {}x{}x{} with chunk size {}",
            config.width, config.height, config.depth, config.chunk_size
        );
        Ok(World {
            state: MtResource::new(WorldState::new(config.chunk_size)),
            generator: TerrainGenerator::from_config(&config),
            updater: None,
            camera_position: Point3::new(0.0, 0.0, 0.0),
            camera_frustum: Frustum::unbounded(),
            max_view_distance: clamp_view_distance(config.max_view_distance),
            tick: 0,
            elapsed: 0.0,
            config,
        })
    }

    /// The configuration the world was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Advances the world by one tick.
    ///
    /// Must not be called concurrently with itself.
    ///
    /// # Arguments
    /// * `dt` - Seconds since the previous tick
    ///
    /// # Errors
    /// Returns `WorldError::UpdaterStalled` once the background updater has
    /// terminated, and `WorldError::UpdaterSpawn` if it could not be started.
    pub fn update(&mut self, dt: f32) -> Result<(), WorldError> {
        self.elapsed += dt;
        self.ensure_updater()?;

        if self.tick % self.config.snapshot_interval_ticks == 0 {
            self.publish_snapshot();
        }

        {
            let mut state = self.state.lock();
            // the bigger the backlog, the harder we work to catch up
            let budget = 1 + state.backlog.len() / 10;
            for _ in 0..budget {
                if state
                    .process_creation_queue(self.camera_position, &self.generator)
                    .is_none()
                {
                    break;
                }
            }
        }

        if self.tick % self.config.eviction_interval_ticks == 0 {
            let removed = self
                .state
                .lock()
                .remove_chunks_out_of_view_range(self.camera_position, self.max_view_distance);
            if removed > 0 {
                debug!(
                    "Evicted {removed} chunks beyond {} units",
                    self.max_view_distance
                );
            }
        }

        self.state.lock().store.update_dirty();
        self.tick += 1;
        Ok(())
    }

    fn ensure_updater(&mut self) -> Result<(), WorldError> {
        if !self.config.background_updates {
            return Ok(());
        }
        match self.updater.as_mut() {
            Some(handle) => handle.check(),
            None => {
                let updater = WorldUpdater::new(self.state.clone(), &self.config);
                self.updater = Some(WorldUpdaterHandle::spawn(
                    updater,
                    self.config.updater_interval(),
                )?);
                Ok(())
            }
        }
    }

    /// Copies the current observer into the shared snapshot.
    pub fn publish_snapshot(&self) {
        let snapshot = CameraSnapshot::new(
            self.camera_position,
            self.camera_frustum,
            self.max_view_distance,
        );
        self.state.lock().snapshot = Some(snapshot);
    }

    /// Whether the background updater thread is running.
    pub fn is_updater_running(&self) -> bool {
        self.updater
            .as_ref()
            .is_some_and(WorldUpdaterHandle::is_alive)
    }

    /// An updater sharing this world's state, for driving passes by hand.
    pub fn detached_updater(&self) -> WorldUpdater<M> {
        WorldUpdater::new(self.state.clone(), &self.config)
    }

    /// Records the observer's position and view frustum.
    pub fn set_camera(&mut self, camera: &Camera, projection: &Projection) {
        self.camera_position = camera.position;
        self.camera_frustum = camera.frustum(projection);
    }

    /// Records the observer's position, keeping the last frustum.
    pub fn set_camera_position(&mut self, position: Point3<f32>) {
        self.camera_position = position;
    }

    /// The observer position used for admission and eviction.
    pub fn camera_position(&self) -> Point3<f32> {
        self.camera_position
    }

    /// The max view distance, always within `[MIN_VIEW_DISTANCE, MAX_VIEW_DISTANCE]`.
    pub fn max_view_distance(&self) -> f32 {
        self.max_view_distance
    }

    /// Sets the max view distance, clamped to the supported range.
    pub fn set_max_view_distance(&mut self, distance: f32) {
        self.max_view_distance = clamp_view_distance(distance);
    }

    /// Changes the max view distance by `delta`, clamped to the supported range.
    pub fn adjust_max_view_distance(&mut self, delta: f32) {
        self.set_max_view_distance(self.max_view_distance + delta);
    }

    /// Ticks performed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seconds accumulated over all ticks.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Snaps a world coordinate to the origin of its chunk.
    pub fn snap_to_chunk_origin(&self, value: f32) -> i32 {
        chunk_index::snap_to_chunk_origin(value, self.config.chunk_size)
    }

    /// Snaps a world coordinate to the center of its chunk.
    pub fn snap_to_chunk_center(&self, value: f32) -> f32 {
        chunk_index::snap_to_chunk_center(value, self.config.chunk_size)
    }

    fn key_at(&self, x: f32, y: f32, z: f32) -> ChunkKey {
        ChunkKey::containing(x, y, z, self.config.chunk_size)
    }

    /// Queues the chunk containing `position` for admission.
    ///
    /// # Returns
    /// `false` if that chunk lies outside the world, is live, or is already
    /// queued.
    pub fn enqueue(&self, position: Point3<i32>) -> bool {
        let key = ChunkKey::containing_voxel(
            position.x,
            position.y,
            position.z,
            self.config.chunk_size,
        );
        if !self.config.contains_chunk(&key) {
            return false;
        }
        self.state.lock().merge_proposals([key]) == 1
    }

    /// Whether a live chunk covers the world point.
    pub fn has_chunk_at(&self, x: f32, y: f32, z: f32) -> bool {
        let key = self.key_at(x, y, z);
        self.state.lock().store.contains(&key)
    }

    /// Runs `f` on the live chunk covering the world point.
    ///
    /// The world lock is held while `f` runs. Calling back into this world
    /// from `f`, including through the updater, deadlocks. Copy what is
    /// needed out of the chunk and act on it after this returns.
    ///
    /// # Returns
    /// `None` if no live chunk covers the point.
    pub fn with_chunk_at<R>(&self, x: f32, y: f32, z: f32, f: impl FnOnce(&Chunk<M>) -> R) -> Option<R> {
        let key = self.key_at(x, y, z);
        let state = self.state.lock();
        state.store.chunk(&key).map(f)
    }

    /// Whether a voxel exists at the world point.
    ///
    /// # Panics
    /// Panics if the index holds a chunk for the point whose grid does not
    /// cover it.
    pub fn has_cube_at(&self, x: f32, y: f32, z: f32) -> bool {
        let key = self.key_at(x, y, z);
        let state = self.state.lock();
        match state.store.chunk(&key) {
            None => false,
            Some(chunk) if chunk.grid().has_cube_at(x, y, z) => true,
            Some(chunk) => panic!(
                "world has chunk {key:?} for ({x}, {y}, {z}) but its grid at {:?} does not",
                chunk.grid().origin()
            ),
        }
    }

    /// A copy of the voxel at the world point.
    ///
    /// # Returns
    /// `None` if no live chunk covers the point.
    pub fn get_cube_at(&self, x: f32, y: f32, z: f32) -> Option<Voxel> {
        self.with_chunk_at(x, y, z, |chunk| *chunk.grid().get_cube_at(x, y, z))
    }

    /// Changes the type of the voxel at an integer world position and marks
    /// every chunk whose mesh may depend on it dirty.
    ///
    /// # Returns
    /// `false` if no live chunk covers the position.
    pub fn set_cube_type(&self, x: i32, y: i32, z: i32, voxel_type: VoxelType) -> bool {
        let size = self.config.chunk_size;
        let mut state = self.state.lock();
        let key = ChunkKey::containing_voxel(x, y, z, size);
        let Some(chunk) = state.store.chunk_mut(&key) else {
            return false;
        };
        chunk.grid_mut().voxel_at_mut(x, y, z).voxel_type = voxel_type;
        chunk.mark_dirty();

        for side in BlockSide::all() {
            let step = side.offset();
            let neighbor = ChunkKey::containing_voxel(x + step.x, y + step.y, z + step.z, size);
            if neighbor != key {
                if let Some(chunk) = state.store.chunk_mut(&neighbor) {
                    chunk.mark_dirty();
                }
            }
        }
        true
    }

    /// World-space Y of the topmost solid voxel in the column at (x, z).
    ///
    /// Chunks of the column are visited top-down in chunk-height steps from
    /// the top of the world.
    ///
    /// # Returns
    /// `-1` if no live chunk of the column holds a solid voxel there.
    pub fn get_elevation(&self, x: f32, z: f32) -> i32 {
        let size = self.config.chunk_size;
        let state = self.state.lock();
        let mut key = ChunkKey::containing(x, (self.config.height - 1) as f32, z, size);
        while key.y >= 0 {
            if let Some(chunk) = state.store.chunk(&key) {
                let elevation = chunk.grid().get_elevation(x, z);
                if elevation > -1 {
                    return elevation;
                }
            }
            key.y -= size;
        }
        -1
    }

    /// Highest elevation among the four corners of an axis-aligned footprint.
    pub fn get_bounding_box_elevation(&self, x: f32, z: f32, width: f32, depth: f32) -> i32 {
        [
            self.get_elevation(x, z),
            self.get_elevation(x + width, z),
            self.get_elevation(x + width, z + depth),
            self.get_elevation(x, z + depth),
        ]
        .into_iter()
        .max()
        .unwrap_or(-1)
    }

    /// Fills the whole world extent with all-grass chunks. Keys that are
    /// already live are left alone.
    pub fn create_all_chunks(&self) {
        let size = self.config.chunk_size;
        let mut state = self.state.lock();
        let mut created = 0;
        for y in (0..self.config.height).step_by(size as usize) {
            for x in (0..self.config.width).step_by(size as usize) {
                for z in (0..self.config.depth).step_by(size as usize) {
                    let key = ChunkKey::new(x, y, z);
                    if state.store.contains(&key) {
                        continue;
                    }
                    state.backlog.remove(&key);
                    state.store.insert(key, |chunk| {
                        for voxel in chunk.grid_mut().iter_mut() {
                            voxel.voxel_type = VoxelType::GRASS;
                        }
                    });
                    created += 1;
                }
            }
        }
        state.chunks_created += created;
        info!("Created {created} chunks covering the whole world");
    }

    /// Recomputes hidden-face masks of every live chunk.
    pub fn calculate_hidden_faces(&self) {
        self.state.lock().store.recalculate_hidden_faces();
    }

    /// Number of live chunks whose box touches `frustum`.
    pub fn chunks_in_frustum(&self, frustum: &Frustum) -> usize {
        let state = self.state.lock();
        state
            .store
            .chunks()
            .filter(|chunk| chunk.in_frustum(frustum))
            .count()
    }

    /// Total vertices across all chunk meshes.
    pub fn vertex_count(&self) -> usize {
        let state = self.state.lock();
        state
            .store
            .chunks()
            .map(|chunk| chunk.mesh().vertex_count())
            .sum()
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> WorldStats {
        self.state.lock().stats()
    }

    /// Number of live chunks.
    pub fn chunk_count(&self) -> usize {
        self.state.lock().store.len()
    }

    /// Number of keys waiting for admission.
    pub fn backlog_size(&self) -> usize {
        self.state.lock().backlog.len()
    }

    /// Chunks admitted since the world was created.
    pub fn chunks_created(&self) -> u64 {
        self.state.lock().chunks_created
    }

    /// Chunks evicted since the world was created.
    pub fn chunks_removed(&self) -> u64 {
        self.state.lock().chunks_removed
    }

    /// Chunk arena counters.
    pub fn pool_stats(&self) -> PoolStats {
        self.state.lock().store.arena.stats()
    }
}
