//! # Camera Implementation
//!
//! This module contains the observer the world streams around:
//! - `Camera`: position and orientation in 3D space
//! - `Projection`: perspective projection settings
//!
//! Nothing is rendered. The view-projection matrix exists so the world can
//! extract a frustum for chunk admission and culling counts.

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

use super::frustum::Frustum;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// Clip-space depth ends up in `[0, 1]`, which is what `Frustum::from_matrix`
/// expects.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,  // Scale Z from [-1,1] to [-0.5,0.5]
    0.0, 0.0, 0.5, 1.0,  // Translate Z from [-0.5,0.5] to [0,1]
);

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Represents a first-person camera in 3D space.
///
/// # Fields
/// - `position`: The camera's position in world space
/// - `yaw`: Horizontal rotation (around Y axis) in radians, 0 faces +X
/// - `pitch`: Vertical rotation (around X axis) in radians
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position of the camera in world space. Can be any type that converts to `Point3<f32>`.
    /// * `yaw` - Initial yaw (horizontal rotation around Y axis). Can be any type that converts to `Rad<f32>`.
    /// * `pitch` - Initial pitch (vertical rotation around X axis). Can be any type that converts to `Rad<f32>`.
    ///
    /// # Example
    /// ```rust
    /// use cgmath::{Deg, Point3};
    /// use voxel_streaming::engine_state::camera_state::camera::Camera;
    ///
    /// let camera = Camera::new(
    ///     Point3::new(0.0, 0.0, 0.0), // Position at origin
    ///     Deg(0.0),                   // Facing along positive X
    ///     Deg(0.0),                   // Level horizon
    /// );
    /// assert!(camera.forward().x > 0.99);
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// Gets the camera's forward direction vector.
    ///
    /// # Returns
    /// A normalized 3D vector representing the camera's forward direction
    pub fn forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Calculates the view matrix for this camera.
    ///
    /// # Returns
    /// A 4x4 matrix transforming world coordinates to view space
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }

    /// Combined view-projection matrix.
    pub fn view_projection(&self, projection: &Projection) -> Matrix4<f32> {
        projection.calc_matrix() * self.calc_matrix()
    }

    /// The camera's view frustum under `projection`.
    pub fn frustum(&self, projection: &Projection) -> Frustum {
        Frustum::from_matrix(self.view_projection(projection))
    }

    /// Turns the camera, keeping pitch short of straight up or down.
    pub fn rotate<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(&mut self, yaw: Y, pitch: P) {
        self.yaw += yaw.into();
        self.pitch += pitch.into();
        self.clamp_pitch();
    }

    /// Moves the camera horizontally along its facing direction.
    pub fn advance_horizontally(&mut self, distance: f32) {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        self.position += Vector3::new(yaw_cos, 0.0, yaw_sin) * distance;
    }

    fn clamp_pitch(&mut self) {
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// It manages the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let aspect = width as f32 / height.max(1) as f32;
        let fovy: Rad<f32> = fovy.into();
        Self {
            aspect,
            fovy,
            znear,
            zfar,
        }
    }

    /// Calculates the projection matrix.
    ///
    /// Combines the perspective projection with the OpenGL to WGPU coordinate system transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        camera.rotate(Deg(0.0), Deg(120.0));
        assert!(camera.pitch.0 < FRAC_PI_2);
        camera.rotate(Deg(0.0), Deg(-400.0));
        assert!(camera.pitch.0 > -FRAC_PI_2);
    }

    #[test]
    fn test_advance_follows_yaw() {
        let mut camera = Camera::new((0.0, 5.0, 0.0), Deg(90.0), Deg(30.0));
        camera.advance_horizontally(10.0);
        assert!(camera.position.x.abs() < 1e-4);
        assert!((camera.position.z - 10.0).abs() < 1e-4);
        assert_eq!(camera.position.y, 5.0);
    }
}
