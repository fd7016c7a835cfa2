use cgmath::{Matrix4, Point3, Vector3};

use crate::{EPSILON, Ray};

/// Axis-aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| acc.expand(p)))
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Bounds of this box after an arbitrary affine transform.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = self.corners();
        let first = Point3::from_homogeneous(matrix * corners[0].to_homogeneous());
        corners[1..].iter().fold(Self::new(first, first), |acc, corner| {
            acc.expand(Point3::from_homogeneous(matrix * corner.to_homogeneous()))
        })
    }

    pub fn expand(&self, point: Point3<f32>) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(point.x),
                self.min.y.min(point.y),
                self.min.z.min(point.z),
            ),
            max: Point3::new(
                self.max.x.max(point.x),
                self.max.y.max(point.y),
                self.max.z.max(point.z),
            ),
        }
    }

    pub fn merge(&self, other: &Aabb) -> Self {
        self.expand(other.min).expand(other.max)
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Radius of the sphere centered on the box that encloses it.
    pub fn bounding_sphere_radius(&self) -> f32 {
        use cgmath::InnerSpace;
        self.size().magnitude() * 0.5
    }

    pub fn contains_point(&self, p: Point3<f32>) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// Slab test. Returns the entry distance along the ray, `0.0` when the
    /// origin is already inside, or `None` on a miss.
    pub fn intersects_ray(&self, ray: &Ray) -> Option<f32> {
        let slabs = [
            (ray.origin.x, ray.direction.x, self.min.x, self.max.x),
            (ray.origin.y, ray.direction.y, self.min.y, self.max.y),
            (ray.origin.z, ray.direction.z, self.min.z, self.max.z),
        ];

        let mut near = f32::NEG_INFINITY;
        let mut far = f32::INFINITY;
        for (origin, dir, lo, hi) in slabs {
            if dir.abs() < EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let (t0, t1) = {
                let a = (lo - origin) * inv;
                let b = (hi - origin) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };
            near = near.max(t0);
            far = far.min(t1);
            if near > far {
                return None;
            }
        }

        if far < 0.0 {
            None
        } else {
            Some(near.max(0.0))
        }
    }
}
