//! Mesh generation for the voxel engine.
//!
//! The world owns one mesh per live chunk. Meshing is split in two steps so a
//! chunk can be re-meshed without reallocating: `reset` reads the grid and
//! collects what is visible, `build_mesh` turns that into vertex data. Both
//! run on the thread that ticks the world, and only for dirty chunks.

use crate::engine_state::voxels::chunk::voxel_grid::VoxelGrid;

pub mod face_mesh;
mod vertex;

// Re-export commonly used types
pub use face_mesh::{Face, FaceMesh};
pub use vertex::Vertex;

/// Mesh state attached to every chunk.
///
/// Implementations are pooled together with their chunk, so `reset` must
/// discard everything derived from a previous grid.
pub trait ChunkMesh: Default + Send + 'static {
    /// Collects the renderable state of `grid`, replacing any previous state.
    fn reset(&mut self, grid: &VoxelGrid);

    /// Produces vertex data from the state collected by `reset`.
    fn build_mesh(&mut self);

    /// Number of vertices produced by the last `build_mesh`.
    fn vertex_count(&self) -> usize;
}
