use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

use crate::EPSILON;

/// A half-line in 3D space. The direction is kept at unit length so that
/// parameters returned by the intersection routines are distances.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Builds the ray that starts at `from` and passes through `to`.
    ///
    /// Returns `None` when the two points coincide or are not finite.
    pub fn through(from: Point3<f32>, to: Point3<f32>) -> Option<Self> {
        let delta = to - from;
        let len2 = delta.magnitude2();
        if !len2.is_finite() || len2 < EPSILON * EPSILON {
            return None;
        }
        Some(Self::new(from, delta))
    }

    pub fn point_at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Maps the ray into another space. The origin goes through the full
    /// affine transform, the direction through its linear part only.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let origin = Point3::from_homogeneous(matrix * self.origin.to_homogeneous());
        let direction = (matrix * self.direction.extend(0.0)).truncate();
        Self::new(origin, direction)
    }

    /// Double-sided Möller-Trumbore test against the triangle `(a, b, c)`.
    ///
    /// On a hit, returns `(t, u, v)` where `t` is the distance along the ray
    /// and `(u, v)` are the barycentric weights of `b` and `c`.
    pub fn intersect_triangle(
        &self,
        a: Point3<f32>,
        b: Point3<f32>,
        c: Point3<f32>,
    ) -> Option<(f32, f32, f32)> {
        let ab = b - a;
        let ac = c - a;

        let p = self.direction.cross(ac);
        let det = ab.dot(p);
        if det.abs() < EPSILON {
            // Parallel to the triangle plane.
            return None;
        }
        let inv_det = 1.0 / det;

        let offset = self.origin - a;
        let u = offset.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = offset.cross(ab);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = ac.dot(q) * inv_det;
        (t > EPSILON).then_some((t, u, v))
    }
}
