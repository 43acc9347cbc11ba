//! # Camera State Management
//!
//! This module handles the observer side of world streaming:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Frustum extraction for chunk visibility
//! - The throttled snapshot handed to the background world updater
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `Projection`: Manages the camera's projection matrix
//! - `Frustum`: Clip planes used for box visibility tests
//! - `CameraSnapshot`: A copy of everything the updater needs to pick chunks

use cgmath::Point3;

use crate::engine_state::voxels::chunk::chunk_index::ChunkKey;
use frustum::Frustum;

pub mod camera;
pub mod frustum;

/// Observer state as seen by the background updater.
///
/// Published by the world every few ticks. The updater works from the most
/// recent copy even if the camera has moved since.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    /// Camera position in world space
    pub position: Point3<f32>,
    /// Camera view frustum
    pub frustum: Frustum,
    /// Chunks whose center is farther than this are not wanted
    pub max_view_distance: f32,
}

impl CameraSnapshot {
    /// Creates a new snapshot.
    pub fn new(position: Point3<f32>, frustum: Frustum, max_view_distance: f32) -> Self {
        CameraSnapshot {
            position,
            frustum,
            max_view_distance,
        }
    }

    /// Whether a chunk at `key` should exist: its center is within view
    /// distance and its box touches the frustum.
    pub fn wants_chunk(&self, key: &ChunkKey, chunk_size: i32) -> bool {
        let max2 = self.max_view_distance * self.max_view_distance;
        if key.center_distance2(chunk_size, self.position) > max2 {
            return false;
        }
        let half = chunk_size as f32 / 2.0;
        self.frustum
            .intersects_aabb(key.center(chunk_size), cgmath::Vector3::new(half, half, half))
    }
}
