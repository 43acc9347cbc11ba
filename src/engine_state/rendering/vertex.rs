//! Vertex data structures for chunk meshes.
//!
//! Meshes are built on the CPU only. The vertex layout is kept `Pod` so a
//! renderer can upload `FaceMesh::vertices` to a GPU buffer without copying.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::VoxelType};

/// A single corner of a visible voxel face.
///
/// # Memory Layout
/// - Position: 3x i32 (12 bytes)
/// - Voxel Type: u32 (4 bytes)
/// - Side: u32 (4 bytes)
///
/// Total size: 20 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// X coordinate in world space
    pub x: i32,
    /// Y coordinate in world space
    pub y: i32,
    /// Z coordinate in world space
    pub z: i32,
    /// The voxel type of the face, as its integer form
    pub voxel_type: u32,
    /// The `BlockSide` of the face, as its integer form
    pub side: u32,
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `pos` - The world-space position of the corner
    /// * `voxel_type` - The type of the voxel owning the face
    /// * `side` - Which side of the voxel the face lies on
    pub fn new(pos: Point3<i32>, voxel_type: VoxelType, side: BlockSide) -> Self {
        Vertex {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            voxel_type: voxel_type as u32,
            side: side as u32,
        }
    }
}
