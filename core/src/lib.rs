mod error;
pub mod event;
pub mod input;
pub mod operator;
mod renderer;
mod scene_scale;
pub mod selection;
mod shaders;
mod viewer;

// `pub use ... as scene` makes crate::scene::* resolve to outline_scene::*
pub use outline_scene as scene;
pub use outline_scene::common;

// Winit support - only available when winit is a dependency
#[cfg(feature = "winit-support")]
pub mod winit_support;

pub use error::RendererError;
pub use outline_scene::{Camera, Scene, ScenePreset, SceneSetup};
pub use renderer::{
    AttachmentLoad, FramePlan, OutlineInstance, OutlineSlot, PassKind, PassSpec, Renderer,
    StencilMode, StencilTracker,
};
pub use scene_scale::NavigationScale;
pub use selection::{SelectionChange, SelectionConfig, SelectionState};
pub use viewer::Viewer;
