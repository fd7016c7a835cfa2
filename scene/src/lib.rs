//! Scene model for the outline viewer: camera, primitive meshes, entities,
//! lights, demo presets and pointer picking.

pub mod camera;
pub mod entity;
pub mod light;
pub mod mesh;
pub mod picking;
pub mod preset;
pub mod scene;

pub use outline_common as common;

pub use camera::{Camera, Viewport};
pub use entity::{Entity, EntityId, Material, Transform};
pub use light::{Light, LightType, LightUniform, LightsArrayUniform, MAX_LIGHTS};
pub use mesh::{Mesh, MeshError, MeshHit, MeshId, MeshIndex, Vertex};
pub use picking::{RayPickResult, pick, pick_all_from_ray, pick_pickable};
pub use preset::{GroundSpec, ObjectSpec, PrimitiveShape, ScenePreset, SceneSetup};
pub use scene::{EntityDescriptor, Scene, SceneError};

#[cfg(test)]
mod scene_tests;
