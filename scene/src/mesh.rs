//! Triangle meshes and the primitive shapes the viewer places in its scenes.
//!
//! Every generator produces an indexed triangle list whose faces wind
//! counter-clockwise when seen from outside. The outline pass relies on this:
//! it culls front faces to draw only the far side of an enlarged shell.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Point3, Vector3};
use thiserror::Error;

use crate::common::{Aabb, Ray};

/// Identifier of a mesh registered with a [`crate::Scene`].
pub type MeshId = u32;

/// Index type of mesh index buffers.
pub type MeshIndex = u16;

/// Upper bound on generator subdivisions, keeps vertex counts inside `MeshIndex`.
const MAX_SEGMENTS: u32 = 128;

/// Vertex layout shared with the shaders: position then normal, 24 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
        }
    }

    pub fn point(&self) -> Point3<f32> {
        Point3::from(self.position)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: MeshIndex, vertex_count: usize },
    #[error("{0} vertices exceed the index range")]
    TooManyVertices(usize),
}

/// A ray hit in the mesh's local space.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshHit {
    pub distance: f32,
    pub hit_point: Point3<f32>,
    /// Index of the triangle, i.e. offset into the index buffer divided by 3.
    pub triangle_index: usize,
    /// `(u, v, w)` with `w = 1 - u - v`.
    pub barycentric: (f32, f32, f32),
}

/// Immutable indexed triangle mesh.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<MeshIndex>,
    bounds: Option<Aabb>,
}

impl Mesh {
    /// Builds a mesh from raw buffers after checking that the indices form
    /// whole triangles referencing existing vertices.
    pub fn from_raw(vertices: Vec<Vertex>, indices: Vec<MeshIndex>) -> Result<Self, MeshError> {
        if vertices.len() > MeshIndex::MAX as usize + 1 {
            return Err(MeshError::TooManyVertices(vertices.len()));
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangles(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }
        Ok(Self::new_unchecked(vertices, indices))
    }

    fn new_unchecked(vertices: Vec<Vertex>, indices: Vec<MeshIndex>) -> Self {
        let bounds = Aabb::from_points(vertices.iter().map(Vertex::point));
        Self {
            vertices,
            indices,
            bounds,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[MeshIndex] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Local-space bounds, `None` for an empty mesh.
    pub fn bounding(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize].point(),
                self.vertices[tri[1] as usize].point(),
                self.vertices[tri[2] as usize].point(),
            ]
        })
    }

    /// All triangle hits along a local-space ray, unsorted.
    pub fn intersect_ray(&self, ray: &Ray) -> Vec<MeshHit> {
        let Some(bounds) = self.bounds else {
            return Vec::new();
        };
        if bounds.intersects_ray(ray).is_none() {
            return Vec::new();
        }

        self.triangles()
            .enumerate()
            .filter_map(|(triangle_index, [a, b, c])| {
                let (t, u, v) = ray.intersect_triangle(a, b, c)?;
                Some(MeshHit {
                    distance: t,
                    hit_point: ray.point_at(t),
                    triangle_index,
                    barycentric: (u, v, 1.0 - u - v),
                })
            })
            .collect()
    }

    // ===== Primitive generators =====

    /// Axis-aligned box centered at the origin with flat-shaded faces.
    pub fn box_mesh(width: f32, height: f32, depth: f32) -> Self {
        let half = Vector3::new(width, height, depth) * 0.5;
        let mut builder = MeshBuilder::default();

        for axis in 0..3 {
            for sign in [1.0_f32, -1.0] {
                let mut normal = Vector3::new(0.0, 0.0, 0.0);
                normal[axis] = sign;
                // Two tangent axes spanning the face.
                let (ua, va) = ((axis + 1) % 3, (axis + 2) % 3);

                let corner = |su: f32, sv: f32| {
                    let mut p = Vector3::new(0.0, 0.0, 0.0);
                    p[axis] = sign * half[axis];
                    p[ua] = su * half[ua];
                    p[va] = sv * half[va];
                    builder_vertex(p, normal)
                };
                let quad = [
                    corner(-1.0, -1.0),
                    corner(1.0, -1.0),
                    corner(1.0, 1.0),
                    corner(-1.0, 1.0),
                ];
                builder.push_quad(quad);
            }
        }
        builder.build()
    }

    /// UV sphere centered at the origin with smooth normals.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let cols = width_segments.clamp(3, MAX_SEGMENTS);
        let rows = height_segments.clamp(2, MAX_SEGMENTS);

        let grid = Grid::new(cols, rows, |col, row| {
            let theta = TAU * col as f32 / cols as f32;
            let phi = PI * row as f32 / rows as f32;
            let normal = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            builder_vertex(normal * radius, normal)
        });
        grid.into_builder().build()
    }

    /// Capped cylinder along Y, centered at the origin.
    pub fn cylinder(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::frustum(radius, radius, height, radial_segments)
    }

    /// Cone along Y with its apex at `+height / 2` and a capped base.
    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::frustum(0.0, radius, height, radial_segments)
    }

    /// Shared body of [`Mesh::cylinder`] and [`Mesh::cone`]. A zero radius
    /// collapses that end to a point and drops its cap.
    fn frustum(top_radius: f32, bottom_radius: f32, height: f32, radial_segments: u32) -> Self {
        let cols = radial_segments.clamp(3, MAX_SEGMENTS);
        let half_height = height * 0.5;
        // Side normals tilt by the slope of the silhouette.
        let slope = (bottom_radius - top_radius) / height;

        let grid = Grid::new(cols, 1, |col, row| {
            let theta = TAU * col as f32 / cols as f32;
            let (sin, cos) = theta.sin_cos();
            let (r, y) = if row == 0 {
                (top_radius, half_height)
            } else {
                (bottom_radius, -half_height)
            };
            let normal = Vector3::new(cos, slope, sin).normalize();
            builder_vertex(Vector3::new(r * cos, y, r * sin), normal)
        });
        let mut builder = grid.into_builder();

        if top_radius > 0.0 {
            builder.push_disc(top_radius, half_height, 1.0, cols);
        }
        if bottom_radius > 0.0 {
            builder.push_disc(bottom_radius, -half_height, -1.0, cols);
        }
        builder.build()
    }

    /// Torus around the Z axis, so its ring lies in the XY plane.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let cols = tubular_segments.clamp(3, MAX_SEGMENTS);
        let rows = radial_segments.clamp(3, MAX_SEGMENTS);

        let grid = Grid::new(cols, rows, |col, row| {
            let around = TAU * col as f32 / cols as f32;
            let tube_angle = TAU * row as f32 / rows as f32;
            let ring_center = Vector3::new(around.cos(), around.sin(), 0.0) * radius;
            let normal = Vector3::new(
                tube_angle.cos() * around.cos(),
                tube_angle.cos() * around.sin(),
                tube_angle.sin(),
            );
            builder_vertex(ring_center + normal * tube, normal)
        });
        grid.into_builder().build()
    }

    /// Flat plane in XZ facing +Y.
    pub fn plane(width: f32, depth: f32) -> Self {
        let (hw, hd) = (width * 0.5, depth * 0.5);
        let up = Vector3::unit_y();
        let mut builder = MeshBuilder::default();
        builder.push_quad([
            builder_vertex(Vector3::new(-hw, 0.0, -hd), up),
            builder_vertex(Vector3::new(hw, 0.0, -hd), up),
            builder_vertex(Vector3::new(hw, 0.0, hd), up),
            builder_vertex(Vector3::new(-hw, 0.0, hd), up),
        ]);
        builder.build()
    }

    /// Regular tetrahedron inscribed in a sphere of `radius`, flat-shaded.
    pub fn tetrahedron(radius: f32) -> Self {
        let corners = [
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-1.0, -1.0, 1.0),
            Vector3::new(-1.0, 1.0, -1.0),
            Vector3::new(1.0, -1.0, -1.0),
        ]
        .map(|c: Vector3<f32>| c.normalize() * radius);

        let mut builder = MeshBuilder::default();
        for skip in 0..4 {
            let face: Vec<Vector3<f32>> = (0..4).filter(|&i| i != skip).map(|i| corners[i]).collect();
            let centroid = (face[0] + face[1] + face[2]) / 3.0;
            let normal = centroid.normalize();
            builder.push_triangle([
                builder_vertex(face[0], normal),
                builder_vertex(face[1], normal),
                builder_vertex(face[2], normal),
            ]);
        }
        builder.build()
    }
}

fn builder_vertex(position: Vector3<f32>, normal: Vector3<f32>) -> Vertex {
    Vertex::new(position, normal)
}

/// Accumulates triangles and orients each one so its winding agrees with the
/// vertex normals.
#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<MeshIndex>,
}

impl MeshBuilder {
    fn push_vertex(&mut self, vertex: Vertex) -> MeshIndex {
        let index = self.vertices.len() as MeshIndex;
        self.vertices.push(vertex);
        index
    }

    /// Appends a triangle between existing vertices. Degenerate triangles
    /// (collapsed poles, cone apex) are dropped.
    fn link(&mut self, a: MeshIndex, b: MeshIndex, c: MeshIndex) {
        let [pa, pb, pc] = [a, b, c].map(|i| Vector3::from(self.vertices[i as usize].position));
        let face_normal = (pb - pa).cross(pc - pa);
        if face_normal.magnitude2() < 1e-12 {
            return;
        }
        let vertex_normal = [a, b, c]
            .iter()
            .map(|&i| Vector3::from(self.vertices[i as usize].normal))
            .fold(Vector3::new(0.0, 0.0, 0.0), |acc, n| acc + n);

        if face_normal.dot(vertex_normal) >= 0.0 {
            self.indices.extend_from_slice(&[a, b, c]);
        } else {
            self.indices.extend_from_slice(&[a, c, b]);
        }
    }

    fn push_triangle(&mut self, corners: [Vertex; 3]) {
        let [a, b, c] = corners.map(|v| self.push_vertex(v));
        self.link(a, b, c);
    }

    fn push_quad(&mut self, corners: [Vertex; 4]) {
        let [a, b, c, d] = corners.map(|v| self.push_vertex(v));
        self.link(a, b, c);
        self.link(a, c, d);
    }

    /// Triangle fan closing one end of a frustum. `facing` is `1.0` for +Y.
    fn push_disc(&mut self, radius: f32, y: f32, facing: f32, segments: u32) {
        let normal = Vector3::new(0.0, facing, 0.0);
        let center = self.push_vertex(builder_vertex(Vector3::new(0.0, y, 0.0), normal));
        let rim: Vec<MeshIndex> = (0..=segments)
            .map(|i| {
                let theta = TAU * i as f32 / segments as f32;
                let p = Vector3::new(radius * theta.cos(), y, radius * theta.sin());
                self.push_vertex(builder_vertex(p, normal))
            })
            .collect();
        for pair in rim.windows(2) {
            self.link(center, pair[0], pair[1]);
        }
    }

    fn build(self) -> Mesh {
        Mesh::new_unchecked(self.vertices, self.indices)
    }
}

/// A `(cols + 1) x (rows + 1)` lattice of vertices, stitched into quads.
/// The seam column is duplicated so normals stay continuous.
struct Grid {
    cols: u32,
    rows: u32,
    builder: MeshBuilder,
}

impl Grid {
    fn new(cols: u32, rows: u32, mut vertex_at: impl FnMut(u32, u32) -> Vertex) -> Self {
        let mut builder = MeshBuilder::default();
        for row in 0..=rows {
            for col in 0..=cols {
                builder.push_vertex(vertex_at(col, row));
            }
        }
        Self { cols, rows, builder }
    }

    fn into_builder(mut self) -> MeshBuilder {
        let stride = self.cols + 1;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let a = (row * stride + col) as MeshIndex;
                let b = a + 1;
                let c = a + stride as MeshIndex + 1;
                let d = a + stride as MeshIndex;
                self.builder.link(a, b, c);
                self.builder.link(a, c, d);
            }
        }
        self.builder
    }
}
