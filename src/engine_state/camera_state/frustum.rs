//! # Frustum Module
//!
//! Six clip planes extracted from a view-projection matrix, and the box test
//! used to decide whether a chunk is potentially visible.
//!
//! Planes point inward: a point is inside when its signed distance to every
//! plane is non-negative. The matrix is expected to map depth to `[0, 1]`,
//! as `Projection::calc_matrix` does.

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Vector3, Vector4};

/// A view frustum as six normalized inward-facing planes `(a, b, c, d)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vector4<f32>; 6],
}

impl Frustum {
    /// Extracts the frustum of a view-projection matrix.
    pub fn from_matrix(m: Matrix4<f32>) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        let planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near
            r3 - r2, // far
        ]
        .map(normalize_plane);
        Frustum { planes }
    }

    /// A frustum that contains everything.
    pub fn unbounded() -> Self {
        Frustum {
            planes: [Vector4::new(0.0, 0.0, 0.0, 1.0); 6],
        }
    }

    /// Conservative box test. Never rejects a box that overlaps the frustum;
    /// may accept some boxes near the corners that do not.
    ///
    /// # Arguments
    /// * `center` - Center of the axis-aligned box
    /// * `half_extents` - Half the box size along each axis
    pub fn intersects_aabb(&self, center: Point3<f32>, half_extents: Vector3<f32>) -> bool {
        self.planes.iter().all(|plane| {
            let radius = half_extents.x * plane.x.abs()
                + half_extents.y * plane.y.abs()
                + half_extents.z * plane.z.abs();
            signed_distance(plane, center) >= -radius
        })
    }
}

fn normalize_plane(plane: Vector4<f32>) -> Vector4<f32> {
    let length = plane.truncate().magnitude();
    if length > 0.0 {
        plane / length
    } else {
        plane
    }
}

fn signed_distance(plane: &Vector4<f32>, point: Point3<f32>) -> f32 {
    plane.x * point.x + plane.y * point.y + plane.z * point.z + plane.w
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;
    use crate::engine_state::camera_state::camera::{Camera, Projection};

    fn contains(frustum: &Frustum, point: Point3<f32>) -> bool {
        frustum.intersects_aabb(point, Vector3::new(0.0, 0.0, 0.0))
    }

    fn looking_along_x() -> Frustum {
        let camera = Camera::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let projection = Projection::new(800, 600, Deg(60.0), 0.1, 100.0);
        camera.frustum(&projection)
    }

    #[test]
    fn test_points_in_front_are_inside() {
        let frustum = looking_along_x();
        assert!(contains(&frustum, Point3::new(10.0, 0.0, 0.0)));
        assert!(!contains(&frustum, Point3::new(-10.0, 0.0, 0.0)));
        assert!(!contains(&frustum, Point3::new(150.0, 0.0, 0.0)));
        assert!(!contains(&frustum, Point3::new(10.0, 0.0, 50.0)));
    }

    #[test]
    fn test_box_around_camera_intersects() {
        let frustum = looking_along_x();
        let half = Vector3::new(8.0, 8.0, 8.0);
        assert!(frustum.intersects_aabb(Point3::new(0.0, 0.0, 0.0), half));
        assert!(frustum.intersects_aabb(Point3::new(40.0, 0.0, 0.0), half));
        assert!(!frustum.intersects_aabb(Point3::new(-40.0, 0.0, 0.0), half));
    }

    #[test]
    fn test_unbounded_accepts_everything() {
        let frustum = Frustum::unbounded();
        assert!(contains(&frustum, Point3::new(-1e6, 3.0, 1e6)));
        assert!(frustum.intersects_aabb(Point3::new(5.0, 5.0, 5.0), Vector3::new(1.0, 1.0, 1.0)));
    }
}
