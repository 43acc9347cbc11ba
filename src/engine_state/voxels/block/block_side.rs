//! # Block Side Module
//!
//! This module defines the six faces/sides of a voxel and the bitmask used to
//! record which of them are hidden by solid neighbors.

use bitflags::bitflags;
use cgmath::Vector3;

/// Represents the six possible faces of a voxel.
///
/// Each variant corresponds to one axis-aligned direction and is assigned a
/// unique integer value, matching the bit position of its `FaceMask` flag.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

bitflags! {
    /// One bit per `BlockSide`. A set bit means the face is hidden.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaceMask: u8 {
        const FRONT = 1 << 0;
        const BACK = 1 << 1;
        const BOTTOM = 1 << 2;
        const TOP = 1 << 3;
        const LEFT = 1 << 4;
        const RIGHT = 1 << 5;
    }
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Unit step from a voxel to its neighbor across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// The `FaceMask` bit for this side.
    pub fn mask(self) -> FaceMask {
        FaceMask::from_bits_truncate(1 << self as u8)
    }
}
