//! # Chunk Module
//!
//! This module provides the `Chunk` struct: one voxel grid, the mesh built from
//! it and a dirty flag tying the two together.
//!
//! ## Lifecycle
//!
//! A chunk is handed out by the `ChunkArena` for a key taken off the world's
//! backlog. It enters the spatial index dirty. The next world tick refreshes
//! its hidden faces and rebuilds the mesh, after which it is clean until a
//! voxel change marks it dirty again. Eviction removes it from the index first
//! and only then returns its slot to the arena.

use crate::engine_state::camera_state::frustum::Frustum;
use crate::engine_state::rendering::ChunkMesh;

use chunk_index::ChunkKey;
use voxel_grid::{NeighborLookup, VoxelGrid};

pub mod chunk_arena;
pub mod chunk_index;
pub mod voxel_grid;

/// A cubic region of the world and its mesh.
pub struct Chunk<M: ChunkMesh> {
    /// Fixed for as long as the chunk is live.
    key: ChunkKey,
    grid: VoxelGrid,
    mesh: M,
    /// True until the mesh reflects the current grid.
    dirty: bool,
}

impl<M: ChunkMesh> Chunk<M> {
    /// Allocates a dirty, empty chunk at `key`.
    pub fn new(key: ChunkKey, chunk_size: i32) -> Self {
        Chunk {
            key,
            grid: VoxelGrid::create(chunk_size, key.origin()),
            mesh: M::default(),
            dirty: true,
        }
    }

    /// Repositions a recycled chunk at `key`, clearing its grid. The mesh is
    /// kept and rebuilt on the next update.
    pub(crate) fn reinit(&mut self, key: ChunkKey) {
        self.key = key;
        self.grid.init(key.origin());
        self.dirty = true;
    }

    /// Index key of this chunk.
    pub fn key(&self) -> ChunkKey {
        self.key
    }

    /// The chunk's voxels.
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Mutable access to the chunk's voxels.
    ///
    /// Callers changing voxel types must also call `mark_dirty`.
    pub fn grid_mut(&mut self) -> &mut VoxelGrid {
        &mut self.grid
    }

    /// The chunk's mesh.
    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    /// Whether the mesh is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flags the mesh as stale.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Brings the mesh up to date with the grid.
    ///
    /// Does nothing on a clean chunk. Otherwise the grid's hidden faces are
    /// recomputed against `world`, the mesh is rebuilt and the chunk becomes
    /// clean.
    ///
    /// # Returns
    /// Whether a rebuild happened.
    pub fn update(&mut self, world: &impl NeighborLookup) -> bool {
        if !self.dirty {
            return false;
        }
        self.grid.refresh(world);
        self.mesh.reset(&self.grid);
        self.mesh.build_mesh();
        self.dirty = false;
        true
    }

    /// Whether any part of the chunk's box lies inside `frustum`.
    pub fn in_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_aabb(self.grid.center(), self.grid.half_extents())
    }
}
