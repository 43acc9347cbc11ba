//! # Block Type Module
//!
//! This module defines the different types of voxels in the world.

/// Enumerates all possible voxel types in the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VoxelType {
    /// Empty space. Non-solid and transparent.
    VOID,

    /// The surface layer of generated terrain.
    GRASS,

    /// Everything below the surface layer.
    DIRT,
}

impl Default for VoxelType {
    fn default() -> Self {
        VoxelType::VOID
    }
}

impl VoxelType {
    /// Whether voxels of this type occupy space and hide neighboring faces.
    pub fn is_solid(self) -> bool {
        self != VoxelType::VOID
    }
}
