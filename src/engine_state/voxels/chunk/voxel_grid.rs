//! # Voxel Grid Module
//!
//! Dense per-chunk voxel storage. A grid is a `size³` cube of voxels plus the
//! world-space origin it covers. Voxels are laid out in row-major order
//! (x, then y, then z), the same order chunk creation and iteration use.
//!
//! ## Coordinates
//!
//! World-space queries (`has_cube_at`, `get_cube_at`, `get_elevation`)
//! subtract the origin and floor to local indices. `has_cube_at` is the bounds
//! check; the other accessors assume the caller already established that the
//! point lies in this grid and panic otherwise.

use cgmath::{Point3, Vector3};

use crate::config::MAX_CHUNK_SIZE;
use crate::engine_state::voxels::block::{
    block_side::{BlockSide, FaceMask},
    block_type::VoxelType,
    Voxel,
};

/// Answers solidity questions about voxels outside a single grid.
///
/// Implemented by the world's chunk store so that hidden-face computation can
/// look across chunk boundaries.
pub trait NeighborLookup {
    /// Whether the voxel at the given world position is solid.
    ///
    /// # Returns
    /// `None` if no loaded chunk covers the position.
    fn solid_at(&self, x: i32, y: i32, z: i32) -> Option<bool>;
}

/// A lookup that knows of no chunks. Every boundary face stays visible.
pub struct NoNeighbors;

impl NeighborLookup for NoNeighbors {
    fn solid_at(&self, _x: i32, _y: i32, _z: i32) -> Option<bool> {
        None
    }
}

/// The voxels of one chunk and the world-space region they cover.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    /// Edge length in voxels.
    size: i32,
    /// World-space origin, always a multiple of `size` on every axis.
    origin: Point3<i32>,
    /// World-space center, `origin + size / 2`.
    center: Point3<f32>,
    /// `size³` voxels in row-major order.
    voxels: Vec<Voxel>,
}

impl VoxelGrid {
    /// Allocates a zeroed grid of the given edge length at the world origin.
    pub fn new(size: i32) -> Self {
        assert!(
            (1..=MAX_CHUNK_SIZE).contains(&size),
            "grid size must be in 1..={MAX_CHUNK_SIZE}, got {size}"
        );
        let edge = size as u16;
        let mut voxels = Vec::with_capacity((size as usize).pow(3));
        for z in 0..edge {
            for y in 0..edge {
                for x in 0..edge {
                    voxels.push(Voxel::new(x, y, z));
                }
            }
        }
        let mut grid = VoxelGrid {
            size,
            origin: Point3::new(0, 0, 0),
            center: Point3::new(0.0, 0.0, 0.0),
            voxels,
        };
        grid.init(Point3::new(0, 0, 0));
        grid
    }

    /// Allocates a grid and positions it at `origin`.
    pub fn create(size: i32, origin: Point3<i32>) -> Self {
        let mut grid = VoxelGrid::new(size);
        grid.init(origin);
        grid
    }

    /// Repositions the grid at `origin` and clears every voxel.
    ///
    /// # Panics
    /// Panics if `origin` is not a multiple of the grid size on every axis.
    pub fn init(&mut self, origin: Point3<i32>) {
        assert!(
            origin.x % self.size == 0 && origin.y % self.size == 0 && origin.z % self.size == 0,
            "grid origin {origin:?} is not aligned to chunk size {}",
            self.size
        );
        self.origin = origin;
        let half = self.size as f32 / 2.0;
        self.center = Point3::new(
            origin.x as f32 + half,
            origin.y as f32 + half,
            origin.z as f32 + half,
        );
        for voxel in &mut self.voxels {
            voxel.voxel_type = VoxelType::VOID;
            voxel.hidden_faces = FaceMask::empty();
        }
    }

    /// Edge length in voxels.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// World-space origin.
    pub fn origin(&self) -> Point3<i32> {
        self.origin
    }

    /// World-space center.
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Half extents of the grid's bounding box.
    pub fn half_extents(&self) -> Vector3<f32> {
        let half = self.size as f32 / 2.0;
        Vector3::new(half, half, half)
    }

    fn index(&self, lx: i32, ly: i32, lz: i32) -> usize {
        (lx + self.size * (ly + self.size * lz)) as usize
    }

    fn in_local_bounds(&self, lx: i32, ly: i32, lz: i32) -> bool {
        (0..self.size).contains(&lx) && (0..self.size).contains(&ly) && (0..self.size).contains(&lz)
    }

    /// Local indices of a world-space point, if it lies in this grid.
    fn local_of(&self, x: i32, y: i32, z: i32) -> Option<(i32, i32, i32)> {
        let (lx, ly, lz) = (x - self.origin.x, y - self.origin.y, z - self.origin.z);
        self.in_local_bounds(lx, ly, lz).then_some((lx, ly, lz))
    }

    fn expect_local_of(&self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        match self.local_of(x, y, z) {
            Some(local) => local,
            None => panic!(
                "voxel ({x}, {y}, {z}) is outside the grid at {:?} (size {})",
                self.origin, self.size
            ),
        }
    }

    /// Whether the world-space point lies inside this grid.
    pub fn has_cube_at(&self, x: f32, y: f32, z: f32) -> bool {
        self.local_of(x.floor() as i32, y.floor() as i32, z.floor() as i32)
            .is_some()
    }

    /// The voxel containing the world-space point.
    ///
    /// # Panics
    /// Panics if the point is outside this grid.
    pub fn get_cube_at(&self, x: f32, y: f32, z: f32) -> &Voxel {
        let (lx, ly, lz) = self.expect_local_of(x.floor() as i32, y.floor() as i32, z.floor() as i32);
        &self.voxels[self.index(lx, ly, lz)]
    }

    /// Mutable access to the voxel at an integer world position.
    ///
    /// # Panics
    /// Panics if the position is outside this grid.
    pub fn voxel_at_mut(&mut self, x: i32, y: i32, z: i32) -> &mut Voxel {
        let (lx, ly, lz) = self.expect_local_of(x, y, z);
        let index = self.index(lx, ly, lz);
        &mut self.voxels[index]
    }

    /// Solidity of the voxel at an integer world position.
    ///
    /// # Returns
    /// `None` if the position is outside this grid.
    pub fn solid_at(&self, x: i32, y: i32, z: i32) -> Option<bool> {
        self.local_of(x, y, z)
            .map(|(lx, ly, lz)| self.voxels[self.index(lx, ly, lz)].is_solid())
    }

    /// World-space position of a voxel of this grid.
    pub fn world_position(&self, voxel: &Voxel) -> Point3<i32> {
        Point3::new(
            self.origin.x + i32::from(voxel.x),
            self.origin.y + i32::from(voxel.y),
            self.origin.z + i32::from(voxel.z),
        )
    }

    /// All voxels in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Voxel> {
        self.voxels.iter()
    }

    /// All voxels in row-major order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voxel> {
        self.voxels.iter_mut()
    }

    /// Recomputes the hidden-face mask of every voxel.
    ///
    /// Neighbors inside the grid are tested locally. Neighbors across a chunk
    /// boundary are asked of `world`; an absent neighbor chunk leaves the face
    /// visible.
    pub fn calculate_hidden_faces(&mut self, world: &impl NeighborLookup) {
        for lz in 0..self.size {
            for ly in 0..self.size {
                for lx in 0..self.size {
                    let mask = self.hidden_mask(lx, ly, lz, world);
                    let index = self.index(lx, ly, lz);
                    self.voxels[index].hidden_faces = mask;
                }
            }
        }
    }

    fn hidden_mask(&self, lx: i32, ly: i32, lz: i32, world: &impl NeighborLookup) -> FaceMask {
        let mut mask = FaceMask::empty();
        for side in BlockSide::all() {
            let step = side.offset();
            let (nx, ny, nz) = (lx + step.x, ly + step.y, lz + step.z);
            let neighbor_solid = if self.in_local_bounds(nx, ny, nz) {
                self.voxels[self.index(nx, ny, nz)].is_solid()
            } else {
                world
                    .solid_at(self.origin.x + nx, self.origin.y + ny, self.origin.z + nz)
                    .unwrap_or(false)
            };
            mask.set(side.mask(), neighbor_solid);
        }
        mask
    }

    /// Recomputes derived voxel state after voxel types changed.
    pub fn refresh(&mut self, world: &impl NeighborLookup) {
        self.calculate_hidden_faces(world);
    }

    /// World-space Y of the topmost solid voxel in the column at (x, z).
    ///
    /// # Returns
    /// `-1` if the column holds no solid voxel in this grid.
    ///
    /// # Panics
    /// Panics if (x, z) is outside this grid's footprint.
    pub fn get_elevation(&self, x: f32, z: f32) -> i32 {
        let (lx, _, lz) = self.expect_local_of(x.floor() as i32, self.origin.y, z.floor() as i32);
        for ly in (0..self.size).rev() {
            if self.voxels[self.index(lx, ly, lz)].is_solid() {
                return self.origin.y + ly;
            }
        }
        -1
    }

    /// Whether any voxel in the grid is solid.
    pub fn has_solid(&self) -> bool {
        self.voxels.iter().any(Voxel::is_solid)
    }
}
