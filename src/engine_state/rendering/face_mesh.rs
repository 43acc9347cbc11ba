//! Face-culled chunk meshes.
//!
//! Every solid voxel contributes one quad per face that is not hidden by a
//! solid neighbor. Quads are emitted as four corner vertices and six indices
//! (two triangles).

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::VoxelType},
    chunk::voxel_grid::VoxelGrid,
};

use super::{ChunkMesh, Vertex};

/// Represents a single quad face of a voxel.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-right, upper-left)
/// in world space, plus the voxel type and side it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face
    pub ll: Point3<i32>,
    /// Lower-right corner of the face
    pub lr: Point3<i32>,
    /// Upper-left corner of the face
    pub ul: Point3<i32>,
    /// Upper-right corner of the face
    pub ur: Point3<i32>,
    /// The type of the voxel owning this face
    pub voxel_type: VoxelType,
    /// Which side of the voxel this face represents
    pub side: BlockSide,
}

impl Face {
    /// Creates the face on `side` of the voxel whose minimum corner is `(i, j, k)`.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The world-space coordinates of the voxel
    /// * `voxel_type` - The type of the voxel
    /// * `side` - Which side of the voxel this face represents
    ///
    /// # Returns
    /// A new `Face` whose corners lie in the plane of that side.
    pub fn new(i: i32, j: i32, k: i32, voxel_type: VoxelType, side: BlockSide) -> Self {
        let (ll, lr, ul, ur) = match side {
            BlockSide::FRONT => (
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
            ),
            BlockSide::BACK => (
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i, j + 1, k),
            ),
            BlockSide::BOTTOM => (
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
            ),
            BlockSide::TOP => (
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i, j + 1, k),
                Point3::new(i + 1, j + 1, k),
            ),
            BlockSide::LEFT => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
            ),
            BlockSide::RIGHT => (
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
            ),
        };
        Face {
            ll,
            lr,
            ul,
            ur,
            voxel_type,
            side,
        }
    }

    /// The corners in vertex order: ll, lr, ul, ur.
    pub fn corners(&self) -> [Point3<i32>; 4] {
        [self.ll, self.lr, self.ul, self.ur]
    }
}

/// Triangle indices for one quad, relative to its first vertex.
const QUAD_INDICES: [u32; 6] = [0, 1, 3, 0, 3, 2];

/// CPU-side mesh of one chunk.
#[derive(Debug, Default)]
pub struct FaceMesh {
    /// Visible faces collected by the last `reset`
    pub faces: Vec<Face>,
    /// Vertex data produced by the last `build_mesh`
    pub vertices: Vec<Vertex>,
    /// Index data produced by the last `build_mesh`
    pub indices: Vec<u32>,
}

impl FaceMesh {
    /// Number of visible faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

impl ChunkMesh for FaceMesh {
    fn reset(&mut self, grid: &VoxelGrid) {
        self.faces.clear();
        self.vertices.clear();
        self.indices.clear();

        for voxel in grid.iter().filter(|voxel| voxel.is_solid()) {
            let position = grid.world_position(voxel);
            for side in BlockSide::all() {
                if !voxel.is_face_hidden(side) {
                    self.faces.push(Face::new(
                        position.x,
                        position.y,
                        position.z,
                        voxel.voxel_type,
                        side,
                    ));
                }
            }
        }
    }

    fn build_mesh(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.vertices.reserve(self.faces.len() * 4);
        self.indices.reserve(self.faces.len() * 6);

        for face in &self.faces {
            let base = self.vertices.len() as u32;
            for corner in face.corners() {
                self.vertices
                    .push(Vertex::new(corner, face.voxel_type, face.side));
            }
            self.indices
                .extend(QUAD_INDICES.iter().map(|offset| base + offset));
        }
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}
