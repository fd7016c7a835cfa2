use cgmath::{Deg, InnerSpace, Matrix4, MetricSpace, Point3, SquareMatrix, Vector3};

use crate::common::Ray;

/// Remaps clip-space depth from the OpenGL range `[-1, 1]` to the `[0, 1]`
/// range wgpu expects.
#[rustfmt::skip]
pub(crate) const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Size of the render target in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or `1.0` for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Maps a pixel position (origin top-left, y down) to normalized device
    /// coordinates (origin center, y up).
    pub fn to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x / self.width as f32 * 2.0 - 1.0,
            -(y / self.height as f32) * 2.0 + 1.0,
        )
    }
}

/// A perspective camera looking from `eye` towards `target`.
///
/// ```
/// use cgmath::{Point3, Vector3};
/// use outline_scene::Camera;
///
/// let camera = Camera {
///     eye: Point3::new(8.0, 8.0, 8.0),
///     target: Point3::new(0.0, 0.0, 0.0),
///     up: Vector3::unit_y(),
///     aspect: 16.0 / 9.0,
///     fovy: 60.0,
///     znear: 0.1,
///     zfar: 100.0,
/// };
/// assert!((camera.length() - 192.0_f32.sqrt()).abs() < 1e-5);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Viewport width divided by height.
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Perspective camera aimed at the origin with a Y-up basis.
    pub fn looking_at_origin(eye: Point3<f32>, fovy: f32, znear: f32, zfar: f32) -> Self {
        Self {
            eye,
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
            aspect: 1.0,
            fovy,
            znear,
            zfar,
        }
    }

    /// World to clip space, with wgpu depth conventions.
    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(self.eye, self.target, self.up);
        let proj = cgmath::perspective(Deg(self.fovy), self.aspect, self.znear, self.zfar);
        OPENGL_TO_WGPU_MATRIX * proj * view
    }

    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.eye).normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.forward().cross(self.up).normalize()
    }

    /// Distance from the eye to the target.
    pub fn length(&self) -> f32 {
        self.eye.distance(self.target)
    }

    pub fn project_point_ndc(&self, world_point: Point3<f32>) -> Point3<f32> {
        let clip = self.build_view_projection_matrix() * world_point.to_homogeneous();
        Point3::from_homogeneous(clip)
    }

    /// Inverse of [`Camera::project_point_ndc`]. `None` when the
    /// view-projection matrix is singular or produces non-finite values.
    pub fn unproject_point_ndc(&self, ndc: Point3<f32>) -> Option<Point3<f32>> {
        let inverse = self.build_view_projection_matrix().invert()?;
        let world = Point3::from_homogeneous(inverse * ndc.to_homogeneous());
        (world.x.is_finite() && world.y.is_finite() && world.z.is_finite()).then_some(world)
    }

    /// Projects a world point to pixel coordinates. The returned `z` is the
    /// NDC depth in `[0, 1]`.
    pub fn project_point_screen(&self, world_point: Point3<f32>, viewport: Viewport) -> Point3<f32> {
        let ndc = self.project_point_ndc(world_point);
        Point3::new(
            (ndc.x + 1.0) * 0.5 * viewport.width as f32,
            (1.0 - ndc.y) * 0.5 * viewport.height as f32,
            ndc.z,
        )
    }

    /// Unprojects a pixel at the given NDC depth (`0.0` near plane, `1.0` far
    /// plane) back into world space.
    pub fn unproject_point_screen(
        &self,
        x: f32,
        y: f32,
        depth: f32,
        viewport: Viewport,
    ) -> Option<Point3<f32>> {
        if viewport.is_empty() {
            return None;
        }
        let (ndc_x, ndc_y) = viewport.to_ndc(x, y);
        self.unproject_point_ndc(Point3::new(ndc_x, ndc_y, depth))
    }

    /// The world-space pick ray through a pixel, running from the near plane
    /// towards the far plane.
    ///
    /// Returns `None` for an empty viewport or a degenerate camera.
    pub fn ray_from_screen(&self, x: f32, y: f32, viewport: Viewport) -> Option<Ray> {
        let near = self.unproject_point_screen(x, y, 0.0, viewport)?;
        let far = self.unproject_point_screen(x, y, 1.0, viewport)?;
        Ray::through(near, far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    const EPSILON: f32 = 1e-5;

    fn create_test_camera() -> Camera {
        Camera {
            eye: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
            aspect: 16.0 / 9.0,
            fovy: 45.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }

    // ===== Basis =====

    #[test]
    fn test_forward_and_right() {
        let camera = create_test_camera();
        let forward = camera.forward();
        let right = camera.right();

        assert!((forward.z + 1.0).abs() < EPSILON);
        assert!((right.x - 1.0).abs() < EPSILON);
        assert!(forward.dot(right).abs() < EPSILON);
    }

    #[test]
    fn test_length() {
        let mut camera = create_test_camera();
        camera.eye = Point3::new(3.0, 4.0, 0.0);
        assert!((camera.length() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_looking_at_origin() {
        let camera = Camera::looking_at_origin(Point3::new(8.0, 8.0, 8.0), 60.0, 0.1, 100.0);
        assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(camera.up, Vector3::unit_y());
        assert_eq!(camera.fovy, 60.0);
    }

    // ===== Matrices =====

    #[test]
    fn test_depth_remap() {
        let near = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert!(near.z.abs() < EPSILON);
        assert!((far.z - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_aspect_changes_projection() {
        let a = create_test_camera();
        let mut b = create_test_camera();
        b.aspect = 1.0;
        assert_ne!(a.build_view_projection_matrix(), b.build_view_projection_matrix());
    }

    // ===== Projection =====

    #[test]
    fn test_target_projects_to_center() {
        let camera = create_test_camera();
        let ndc = camera.project_point_ndc(camera.target);
        assert!(ndc.x.abs() < EPSILON && ndc.y.abs() < EPSILON);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn test_ndc_roundtrip() {
        let camera = create_test_camera();
        let original = Point3::new(1.5, -0.5, -2.0);
        let back = camera
            .unproject_point_ndc(camera.project_point_ndc(original))
            .unwrap();
        assert!(original.distance(back) < 1e-3);
    }

    #[test]
    fn test_screen_center_maps_to_target() {
        let camera = create_test_camera();
        let viewport = Viewport::new(1600, 900);
        let screen = camera.project_point_screen(camera.target, viewport);
        assert!((screen.x - 800.0).abs() < 1e-2);
        assert!((screen.y - 450.0).abs() < 1e-2);
    }

    #[test]
    fn test_screen_y_points_down() {
        let camera = create_test_camera();
        let viewport = Viewport::new(800, 600);
        let above = camera.project_point_screen(Point3::new(0.0, 1.0, 0.0), viewport);
        assert!(above.y < 300.0);
    }

    #[test]
    fn test_viewport_ndc() {
        let viewport = Viewport::new(200, 100);
        assert_eq!(viewport.to_ndc(0.0, 0.0), (-1.0, 1.0));
        assert_eq!(viewport.to_ndc(200.0, 100.0), (1.0, -1.0));
        assert_eq!(viewport.to_ndc(100.0, 50.0), (0.0, 0.0));
        assert_eq!(viewport.aspect(), 2.0);
        assert_eq!(Viewport::new(0, 10).aspect(), 1.0);
    }

    // ===== Rays =====

    #[test]
    fn test_ray_through_center_hits_target_direction() {
        let camera = create_test_camera();
        let viewport = Viewport::new(800, 450);
        let ray = camera.ray_from_screen(400.0, 225.0, viewport).unwrap();

        assert!((ray.direction - camera.forward()).magnitude() < 1e-4);
        assert!((ray.origin.z - (5.0 - camera.znear)).abs() < 1e-3);
    }

    #[test]
    fn test_ray_through_projected_point() {
        let camera = Camera {
            eye: Point3::new(8.0, 8.0, 8.0),
            ..create_test_camera()
        };
        let viewport = Viewport::new(1024, 768);
        let world = Point3::new(-3.0, 0.0, 0.0);
        let screen = camera.project_point_screen(world, viewport);

        let ray = camera.ray_from_screen(screen.x, screen.y, viewport).unwrap();
        let to_world = (world - ray.origin).normalize();
        assert!((to_world - ray.direction).magnitude() < 1e-3);
    }

    #[test]
    fn test_ray_empty_viewport() {
        let camera = create_test_camera();
        assert!(camera.ray_from_screen(0.0, 0.0, Viewport::new(0, 0)).is_none());
    }

    #[test]
    fn test_ray_degenerate_camera() {
        let mut camera = create_test_camera();
        camera.target = camera.eye;
        assert!(camera.ray_from_screen(10.0, 10.0, Viewport::new(100, 100)).is_none());
    }
}
