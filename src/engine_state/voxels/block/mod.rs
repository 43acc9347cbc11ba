//! # Block Module
//!
//! Voxel-level types: the voxel itself, its type, and the face directions
//! used for hidden-face culling.

use block_side::{BlockSide, FaceMask};
use block_type::VoxelType;

pub mod block_side;
pub mod block_type;

/// A single voxel inside a chunk's grid.
///
/// The position is local to the owning grid (`0..chunk_size` on every axis).
/// The hidden-face mask has a bit set for every side whose neighbor, inside
/// this grid or in an adjacent loaded chunk, is solid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Voxel {
    /// Local X coordinate within the grid.
    pub x: u16,
    /// Local Y coordinate within the grid.
    pub y: u16,
    /// Local Z coordinate within the grid.
    pub z: u16,
    /// What occupies this voxel.
    pub voxel_type: VoxelType,
    /// Faces occluded by solid neighbors.
    pub hidden_faces: FaceMask,
}

impl Voxel {
    /// Creates an empty voxel at the given local position.
    pub fn new(x: u16, y: u16, z: u16) -> Self {
        Voxel {
            x,
            y,
            z,
            voxel_type: VoxelType::VOID,
            hidden_faces: FaceMask::empty(),
        }
    }

    /// Whether this voxel occupies space.
    pub fn is_solid(&self) -> bool {
        self.voxel_type.is_solid()
    }

    /// Whether the given face is occluded by a solid neighbor.
    pub fn is_face_hidden(&self, side: BlockSide) -> bool {
        self.hidden_faces.contains(side.mask())
    }

    /// Number of occluded faces, 0 through 6.
    pub fn hidden_face_count(&self) -> u32 {
        self.hidden_faces.bits().count_ones()
    }
}
