use std::cell::RefCell;
use std::rc::Rc;

use cgmath::{InnerSpace, MetricSpace};

use crate::event::{CallbackId, Event, EventDispatcher, EventKind};
use crate::input::MouseButton;
use crate::operator::{Operator, OperatorId};
use crate::scene::Camera;
use crate::scene_scale::{NavigationScale, ZOOM_STEP};

/// Radians of orbit per pixel of drag.
const ORBIT_SENSITIVITY: f32 = 0.005;

/// Just under 90 degrees, so the view never flips over a pole.
const MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Spherical coordinates of the eye around the camera target.
#[derive(Debug, Clone, PartialEq)]
struct OrbitState {
    azimuth: f32,
    elevation: f32,
    radius: f32,
}

impl OrbitState {
    fn from_camera(camera: &Camera) -> Self {
        let direction = camera.eye - camera.target;
        let horizontal = (direction.x * direction.x + direction.z * direction.z).sqrt();
        Self {
            azimuth: direction.x.atan2(direction.z),
            elevation: direction.y.atan2(horizontal),
            radius: camera.eye.distance(camera.target),
        }
    }

    /// Moves the eye to the current spherical position and rebuilds an up
    /// vector perpendicular to the view direction.
    fn apply(&self, camera: &mut Camera) {
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        camera.eye = cgmath::point3(
            camera.target.x + self.radius * cos_el * sin_az,
            camera.target.y + self.radius * sin_el,
            camera.target.z + self.radius * cos_el * cos_az,
        );

        let forward = (camera.target - camera.eye).normalize();
        let right = cgmath::Vector3::unit_y().cross(forward).normalize();
        camera.up = forward.cross(right).normalize();
    }

    fn orbit(&mut self, dx: f32, dy: f32, camera: &mut Camera) {
        self.azimuth -= dx * ORBIT_SENSITIVITY;
        self.elevation = (self.elevation + dy * ORBIT_SENSITIVITY).clamp(-MAX_ELEVATION, MAX_ELEVATION);
        self.apply(camera);
    }

    /// Exponential zoom: each wheel line moves a fixed fraction of the
    /// current distance. Positive `lines` zoom in.
    fn zoom(&mut self, lines: f32, camera: &mut Camera, scale: NavigationScale) {
        let factor = if lines > 0.0 { 1.0 - ZOOM_STEP } else { 1.0 + ZOOM_STEP };
        self.radius = (self.radius * factor.powf(lines.abs()))
            .clamp(scale.min_camera_radius(), scale.max_camera_radius());
        self.apply(camera);
    }
}

/// Moves eye and target together in the camera plane.
fn pan(dx: f32, dy: f32, camera: &mut Camera, scale: NavigationScale) {
    let step = scale.pan_per_pixel();
    let offset = camera.right() * (-dx * step) + camera.up * (dy * step);
    camera.eye += offset;
    camera.target += offset;
}

/// Orbit camera controller.
///
/// - Left drag orbits around the target
/// - Right drag pans
/// - Wheel zooms
///
/// Clicks are left alone so picking still sees them.
pub struct NavigationOperator {
    id: OperatorId,
    state: Rc<RefCell<Option<OrbitState>>>,
    callback_ids: Vec<CallbackId>,
}

impl NavigationOperator {
    pub fn new(id: OperatorId) -> Self {
        Self {
            id,
            state: Rc::new(RefCell::new(None)),
            callback_ids: Vec::new(),
        }
    }
}

impl Operator for NavigationOperator {
    fn activate(&mut self, dispatcher: &mut EventDispatcher) {
        let state = self.state.clone();
        let drag_start = dispatcher.register(EventKind::MouseDragStart, move |event, ctx| {
            let Event::MouseDragStart { button, .. } = event else {
                return false;
            };
            match button {
                MouseButton::Left | MouseButton::Right => {
                    *state.borrow_mut() = Some(OrbitState::from_camera(ctx.camera));
                    true
                }
                _ => false,
            }
        });

        let state = self.state.clone();
        let drag = dispatcher.register(EventKind::MouseDrag, move |event, ctx| {
            let Event::MouseDrag { button, delta, .. } = event else {
                return false;
            };
            let scale = NavigationScale::from_bounds(ctx.scene.bounding().as_ref());
            let mut state = state.borrow_mut();
            let orbit = state.get_or_insert_with(|| OrbitState::from_camera(ctx.camera));
            match button {
                MouseButton::Left => {
                    orbit.orbit(delta.0, delta.1, ctx.camera);
                    true
                }
                MouseButton::Right => {
                    pan(delta.0, delta.1, ctx.camera, scale);
                    true
                }
                _ => false,
            }
        });

        let state = self.state.clone();
        let drag_end = dispatcher.register(EventKind::MouseDragEnd, move |event, _ctx| {
            let Event::MouseDragEnd { button, .. } = event else {
                return false;
            };
            match button {
                MouseButton::Left | MouseButton::Right => {
                    state.borrow_mut().take();
                    true
                }
                _ => false,
            }
        });

        let wheel = dispatcher.register(EventKind::MouseWheel, |event, ctx| {
            let Event::MouseWheel { delta } = event else {
                return false;
            };
            let scale = NavigationScale::from_bounds(ctx.scene.bounding().as_ref());
            OrbitState::from_camera(ctx.camera).zoom(delta.lines_y(), ctx.camera, scale);
            true
        });

        self.callback_ids = vec![drag_start, drag, drag_end, wheel];
    }

    fn deactivate(&mut self, dispatcher: &mut EventDispatcher) {
        for id in self.callback_ids.drain(..) {
            dispatcher.unregister(id);
        }
        self.state.borrow_mut().take();
    }

    fn id(&self) -> OperatorId {
        self.id
    }

    fn name(&self) -> &str {
        "Navigation"
    }

    fn callback_ids(&self) -> &[CallbackId] {
        &self.callback_ids
    }

    fn is_active(&self) -> bool {
        !self.callback_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    use crate::event::EventContext;
    use crate::input::{ElementState, MouseScrollDelta};
    use crate::scene::{Scene, ScenePreset, Viewport};
    use crate::selection::SelectionState;

    fn classic_camera() -> Camera {
        Camera::looking_at_origin(Point3::new(8.0, 8.0, 8.0), 60.0, 0.1, 100.0)
    }

    fn unit_scale() -> NavigationScale {
        NavigationScale::from_bounds(None)
    }

    /// A scale whose zoom limits sit far outside `radius` on both sides.
    fn roomy_scale(radius: f32) -> NavigationScale {
        let r = radius * 10.0;
        let bounds = crate::common::Aabb::new(Point3::new(-r, 0.0, 0.0), Point3::new(r, 0.0, 0.0));
        NavigationScale::from_bounds(Some(&bounds))
    }

    #[test]
    fn test_orbit_state_round_trips_camera() {
        let mut camera = classic_camera();
        let before = camera.eye;
        OrbitState::from_camera(&camera).apply(&mut camera);
        assert!(camera.eye.distance(before) < 1e-4);
    }

    #[test]
    fn test_orbit_keeps_distance_and_height() {
        let mut camera = classic_camera();
        let radius = camera.length();
        let mut orbit = OrbitState::from_camera(&camera);

        orbit.orbit(120.0, 0.0, &mut camera);

        assert!((camera.length() - radius).abs() < 1e-4);
        assert!((camera.eye.y - 8.0).abs() < 1e-4);
        assert!(camera.eye.distance(Point3::new(8.0, 8.0, 8.0)) > 0.1);
        assert!(camera.up.dot(camera.forward()).abs() < 1e-5);
    }

    #[test]
    fn test_orbit_elevation_is_clamped() {
        let mut camera = classic_camera();
        let mut orbit = OrbitState::from_camera(&camera);

        orbit.orbit(0.0, 10_000.0, &mut camera);
        assert!((orbit.elevation - MAX_ELEVATION).abs() < 1e-6);
        assert!(camera.eye.y < camera.length());

        orbit.orbit(0.0, -20_000.0, &mut camera);
        assert!((orbit.elevation + MAX_ELEVATION).abs() < 1e-6);
        assert!(camera.eye.x.is_finite() && camera.up.y > 0.0);
    }

    #[test]
    fn test_zoom_in_and_out() {
        let mut camera = classic_camera();
        let radius = camera.length();

        OrbitState::from_camera(&camera).zoom(1.0, &mut camera, roomy_scale(radius));
        assert!((camera.length() - radius * 0.9).abs() < 1e-3);

        let radius = camera.length();
        OrbitState::from_camera(&camera).zoom(-2.0, &mut camera, roomy_scale(radius));
        assert!((camera.length() - radius * 1.21).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped_to_scene_scale() {
        let mut camera = classic_camera();
        let scale = unit_scale();

        OrbitState::from_camera(&camera).zoom(500.0, &mut camera, scale);
        assert!((camera.length() - scale.min_camera_radius()).abs() < 1e-4);
    }

    #[test]
    fn test_pan_moves_eye_and_target_together() {
        let mut camera = classic_camera();
        let offset_before = camera.eye - camera.target;

        pan(40.0, -25.0, &mut camera, unit_scale());

        let offset_after = camera.eye - camera.target;
        assert!((offset_after - offset_before).magnitude() < 1e-5);
        assert!(camera.target.distance(Point3::new(0.0, 0.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_operator_consumes_drag_and_wheel() {
        let mut dispatcher = EventDispatcher::new();
        let mut operator = NavigationOperator::new(0);
        operator.activate(&mut dispatcher);
        assert!(operator.is_active());

        let mut camera = classic_camera();
        let mut scene = ScenePreset::Classic.build().scene;
        let mut selection = SelectionState::new();
        let start = camera;
        {
            let mut ctx = EventContext {
                camera: &mut camera,
                scene: &mut scene,
                selection: &mut selection,
                viewport: Viewport::new(800, 600),
            };
            let left = |state| Event::MouseInput {
                state,
                button: MouseButton::Left,
            };
            dispatcher.dispatch(&Event::CursorMoved { position: (100.0, 100.0) }, &mut ctx);
            dispatcher.dispatch(&left(ElementState::Pressed), &mut ctx);
            dispatcher.dispatch(&Event::CursorMoved { position: (140.0, 100.0) }, &mut ctx);
            dispatcher.dispatch(&Event::CursorMoved { position: (180.0, 110.0) }, &mut ctx);
            dispatcher.dispatch(&left(ElementState::Released), &mut ctx);
        }
        assert!(camera.eye.distance(start.eye) > 0.01);
        assert!((camera.length() - start.length()).abs() < 1e-3);
        assert!(selection.is_empty());

        let orbited = camera.length();
        {
            let mut ctx = EventContext {
                camera: &mut camera,
                scene: &mut scene,
                selection: &mut selection,
                viewport: Viewport::new(800, 600),
            };
            let wheel = Event::MouseWheel {
                delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            };
            assert!(dispatcher.dispatch(&wheel, &mut ctx));
        }
        assert!(camera.length() < orbited);

        operator.deactivate(&mut dispatcher);
        assert!(!operator.is_active());
    }

    #[test]
    fn test_middle_drag_is_ignored() {
        let mut dispatcher = EventDispatcher::new();
        let mut operator = NavigationOperator::new(0);
        operator.activate(&mut dispatcher);

        let mut camera = classic_camera();
        let mut scene = Scene::new();
        let mut selection = SelectionState::new();
        let mut ctx = EventContext {
            camera: &mut camera,
            scene: &mut scene,
            selection: &mut selection,
            viewport: Viewport::new(800, 600),
        };
        let drag = Event::MouseDrag {
            button: MouseButton::Middle,
            start_pos: (0.0, 0.0),
            current_pos: (50.0, 0.0),
            delta: (50.0, 0.0),
        };
        assert!(!dispatcher.dispatch(&drag, &mut ctx));
        assert_eq!(*ctx.camera, classic_camera());
    }
}
