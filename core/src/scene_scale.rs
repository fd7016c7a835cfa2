//! Navigation speeds derived from the size of the scene, so orbit, pan and
//! zoom feel the same whatever the units of the content.

use crate::common::Aabb;

/// Radius assumed for an empty scene.
const DEFAULT_MODEL_RADIUS: f32 = 1.0;
const MIN_MODEL_RADIUS: f32 = 1e-6;
const MAX_MODEL_RADIUS: f32 = 1e9;

/// Fraction of the current distance moved per wheel line.
pub const ZOOM_STEP: f32 = 0.1;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NavigationScale {
    model_radius: f32,
}

impl NavigationScale {
    pub fn from_bounds(bounds: Option<&Aabb>) -> Self {
        let model_radius = bounds
            .map(Aabb::bounding_sphere_radius)
            .filter(|radius| *radius > 0.0 && radius.is_finite())
            .map(|radius| radius.clamp(MIN_MODEL_RADIUS, MAX_MODEL_RADIUS))
            .unwrap_or(DEFAULT_MODEL_RADIUS);
        Self { model_radius }
    }

    pub fn model_radius(&self) -> f32 {
        self.model_radius
    }

    /// Closest the camera may zoom to its target.
    pub fn min_camera_radius(&self) -> f32 {
        self.model_radius * 0.01
    }

    /// Farthest the camera may zoom out from its target.
    pub fn max_camera_radius(&self) -> f32 {
        self.model_radius * 100.0
    }

    /// World units moved per pixel of pan drag.
    pub fn pan_per_pixel(&self) -> f32 {
        self.model_radius * 0.001
    }
}
