//! # View Frustum
//!
//! Frustum planes extracted from a view-projection matrix, used by the world
//! to skip drawing chunks that lie entirely outside the view.

use cgmath::{Matrix4, Point3, Vector4};

/// Transformation matrix to convert from OpenGL's clip space to WGPU's.
///
/// WGPU uses NDC depth in `[0, 1]` instead of `[-1, 1]`. Projections built with
/// `cgmath::perspective` should be premultiplied with this matrix.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,  // Scale Z from [-1,1] to [-0.5,0.5]
    0.0, 0.0, 0.5, 1.0,  // Translate Z from [-0.5,0.5] to [0,1]
);

/// Anything that can decide whether an axis-aligned box may be visible.
pub trait ViewFrustum {
    /// Returns `false` only if the box `[min, max]` is certainly outside.
    fn intersects_aabb(&self, min: Point3<f32>, max: Point3<f32>) -> bool;
}

/// A plane `a*x + b*y + c*z + d = 0` with the normal pointing inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: [f32; 3],
    /// Offset along the normal.
    pub d: f32,
}

impl Plane {
    fn from_row(row: Vector4<f32>) -> Self {
        let len = (row.x * row.x + row.y * row.y + row.z * row.z).sqrt();
        let scale = if len > 0.0 { 1.0 / len } else { 1.0 };
        Self {
            normal: [row.x * scale, row.y * scale, row.z * scale],
            d: row.w * scale,
        }
    }

    /// Signed distance from `point` to the plane; positive is inside.
    #[inline]
    pub fn distance(&self, point: [f32; 3]) -> f32 {
        self.normal[0] * point[0] + self.normal[1] * point[1] + self.normal[2] * point[2] + self.d
    }
}

/// The six clipping planes of a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the planes from a WGPU-convention view-projection matrix
    /// (clip-space depth in `[0, 1]`).
    pub fn from_view_projection(m: &Matrix4<f32>) -> Self {
        // cgmath stores columns; rebuild rows.
        let row = |i: usize| Vector4::new(m.x[i], m.y[i], m.z[i], m.w[i]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 + r1),
                Plane::from_row(r3 - r1),
                Plane::from_row(r2),
                Plane::from_row(r3 - r2),
            ],
        }
    }
}

impl ViewFrustum for Frustum {
    fn intersects_aabb(&self, min: Point3<f32>, max: Point3<f32>) -> bool {
        self.planes.iter().all(|plane| {
            // Corner furthest along the plane normal.
            let positive = [
                if plane.normal[0] >= 0.0 { max.x } else { min.x },
                if plane.normal[1] >= 0.0 { max.y } else { min.y },
                if plane.normal[2] >= 0.0 { max.z } else { min.z },
            ];
            plane.distance(positive) >= 0.0
        })
    }
}
