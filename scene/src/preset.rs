//! Fixed demo scenes.
//!
//! A preset is a static table of shapes, colors and positions plus the
//! camera, lights and ground that frame them. Building one cannot fail.

use std::fmt;

use cgmath::Point3;

use crate::{
    camera::Camera,
    common::RgbaColor,
    entity::Material,
    light::Light,
    mesh::Mesh,
    scene::{EntityDescriptor, Scene},
};

/// Geometry kinds the presets place.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PrimitiveShape {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32, width_segments: u32, height_segments: u32 },
    Cone { radius: f32, height: f32, radial_segments: u32 },
    Cylinder { radius: f32, height: f32, radial_segments: u32 },
    Torus { radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32 },
    Tetrahedron { radius: f32 },
}

impl PrimitiveShape {
    pub fn build_mesh(&self) -> Mesh {
        match *self {
            PrimitiveShape::Box { width, height, depth } => Mesh::box_mesh(width, height, depth),
            PrimitiveShape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => Mesh::sphere(radius, width_segments, height_segments),
            PrimitiveShape::Cone {
                radius,
                height,
                radial_segments,
            } => Mesh::cone(radius, height, radial_segments),
            PrimitiveShape::Cylinder {
                radius,
                height,
                radial_segments,
            } => Mesh::cylinder(radius, height, radial_segments),
            PrimitiveShape::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => Mesh::torus(radius, tube, radial_segments, tubular_segments),
            PrimitiveShape::Tetrahedron { radius } => Mesh::tetrahedron(radius),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveShape::Box { .. } => "box",
            PrimitiveShape::Sphere { .. } => "sphere",
            PrimitiveShape::Cone { .. } => "cone",
            PrimitiveShape::Cylinder { .. } => "cylinder",
            PrimitiveShape::Torus { .. } => "torus",
            PrimitiveShape::Tetrahedron { .. } => "tetrahedron",
        }
    }
}

/// One entry of a preset's object table.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ObjectSpec {
    pub shape: PrimitiveShape,
    pub color: u32,
    pub position: [f32; 3],
}

/// The ground plane under the objects. Never pickable.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GroundSpec {
    pub size: f32,
    pub height: f32,
    pub color: u32,
}

/// A scene ready to render, with the camera and outline factor that suit it.
#[derive(Debug, Clone)]
pub struct SceneSetup {
    pub scene: Scene,
    pub camera: Camera,
    pub outline_scale: f32,
    pub outline_color: RgbaColor,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ScenePreset {
    /// Five primitives in a ring on a dark ground, viewed from above.
    #[default]
    Classic,
    /// Larger primitives scattered on a light ground, with a white outline.
    Studio,
}

const CLASSIC_OBJECTS: [ObjectSpec; 5] = [
    ObjectSpec {
        shape: PrimitiveShape::Box { width: 1.0, height: 1.0, depth: 1.0 },
        color: 0xff5555,
        position: [-3.0, 0.0, 0.0],
    },
    ObjectSpec {
        shape: PrimitiveShape::Sphere { radius: 0.7, width_segments: 32, height_segments: 32 },
        color: 0x55ff55,
        position: [0.0, 0.0, 0.0],
    },
    ObjectSpec {
        shape: PrimitiveShape::Cone { radius: 0.6, height: 1.5, radial_segments: 32 },
        color: 0x5555ff,
        position: [3.0, 0.0, 0.0],
    },
    ObjectSpec {
        shape: PrimitiveShape::Torus {
            radius: 0.5,
            tube: 0.2,
            radial_segments: 16,
            tubular_segments: 100,
        },
        color: 0xffff55,
        position: [-1.5, 0.0, 2.5],
    },
    ObjectSpec {
        shape: PrimitiveShape::Cylinder { radius: 0.5, height: 1.2, radial_segments: 32 },
        color: 0xff55ff,
        position: [2.0, 0.0, -2.5],
    },
];

const STUDIO_OBJECTS: [ObjectSpec; 5] = [
    ObjectSpec {
        shape: PrimitiveShape::Box { width: 2.0, height: 2.0, depth: 2.0 },
        color: 0xff6b6b,
        position: [-4.0, 0.0, -2.0],
    },
    ObjectSpec {
        shape: PrimitiveShape::Sphere { radius: 1.2, width_segments: 32, height_segments: 32 },
        color: 0x4ecdc4,
        position: [0.0, 0.0, 0.0],
    },
    ObjectSpec {
        shape: PrimitiveShape::Cone { radius: 1.0, height: 2.0, radial_segments: 32 },
        color: 0xffbe0b,
        position: [4.0, 0.0, 2.0],
    },
    ObjectSpec {
        shape: PrimitiveShape::Torus {
            radius: 1.0,
            tube: 0.4,
            radial_segments: 16,
            tubular_segments: 32,
        },
        color: 0x8338ec,
        position: [-2.0, 0.0, 4.0],
    },
    ObjectSpec {
        shape: PrimitiveShape::Tetrahedron { radius: 1.5 },
        color: 0x3a86ff,
        position: [3.0, 0.0, -4.0],
    },
];

impl ScenePreset {
    pub const ALL: [ScenePreset; 2] = [ScenePreset::Classic, ScenePreset::Studio];

    pub fn objects(&self) -> &'static [ObjectSpec] {
        match self {
            ScenePreset::Classic => &CLASSIC_OBJECTS,
            ScenePreset::Studio => &STUDIO_OBJECTS,
        }
    }

    pub fn ground(&self) -> GroundSpec {
        match self {
            ScenePreset::Classic => GroundSpec {
                size: 30.0,
                height: -1.0,
                color: 0x444455,
            },
            ScenePreset::Studio => GroundSpec {
                size: 30.0,
                height: -2.0,
                color: 0xe0e0e0,
            },
        }
    }

    pub fn background(&self) -> RgbaColor {
        match self {
            ScenePreset::Classic => RgbaColor::from_hex(0x222233),
            ScenePreset::Studio => RgbaColor::from_hex(0xf0f0f0),
        }
    }

    pub fn camera(&self) -> Camera {
        match self {
            ScenePreset::Classic => {
                Camera::looking_at_origin(Point3::new(8.0, 8.0, 8.0), 60.0, 0.1, 100.0)
            }
            ScenePreset::Studio => {
                Camera::looking_at_origin(Point3::new(0.0, 5.0, 10.0), 45.0, 0.1, 1000.0)
            }
        }
    }

    pub fn lights(&self) -> Vec<Light> {
        match self {
            ScenePreset::Classic => vec![
                Light::directional_from(Point3::new(5.0, 10.0, 7.0), RgbaColor::WHITE, 1.0),
                Light::ambient(RgbaColor::from_hex(0x404040), 0.7),
            ],
            ScenePreset::Studio => vec![
                Light::ambient(RgbaColor::WHITE, 0.5),
                Light::directional_from(Point3::new(10.0, 10.0, 5.0), RgbaColor::WHITE, 1.0),
                Light::point(Point3::new(-5.0, 5.0, -5.0), RgbaColor::WHITE, 0.5),
            ],
        }
    }

    /// Factor applied to the selected entity's scale for its outline shell.
    pub fn outline_scale(&self) -> f32 {
        match self {
            ScenePreset::Classic => 1.08,
            ScenePreset::Studio => 1.05,
        }
    }

    /// Studio outlines are slightly translucent and blend over what is
    /// behind the rim.
    pub fn outline_color(&self) -> RgbaColor {
        match self {
            ScenePreset::Classic => RgbaColor::CYAN,
            ScenePreset::Studio => RgbaColor::WHITE.with_alpha(0.8),
        }
    }

    /// Roughness of the objects and of the ground.
    fn roughness(&self) -> (f32, f32) {
        match self {
            ScenePreset::Classic => (1.0, 0.8),
            ScenePreset::Studio => (0.7, 1.0),
        }
    }

    /// Builds the scene. Objects get entity ids `1..=n` in table order; the
    /// ground is added last.
    pub fn build(&self) -> SceneSetup {
        let mut scene = Scene::new();
        scene.background = self.background();
        scene.lights = self.lights();
        let (object_roughness, ground_roughness) = self.roughness();

        for (index, spec) in self.objects().iter().enumerate() {
            let mesh = scene.add_mesh(spec.shape.build_mesh());
            let descriptor = EntityDescriptor::new(
                format!("{}-{}", spec.shape.name(), index + 1),
                mesh,
                Material {
                    base_color: RgbaColor::from_hex(spec.color),
                    roughness: object_roughness,
                },
            )
            .at(Point3::from(spec.position))
            .shadows(true, false);
            add_static(&mut scene, descriptor);
        }

        let ground = self.ground();
        let mesh = scene.add_mesh(Mesh::plane(ground.size, ground.size));
        let descriptor = EntityDescriptor::new(
            "ground",
            mesh,
            Material {
                base_color: RgbaColor::from_hex(ground.color),
                roughness: ground_roughness,
            },
        )
        .at(Point3::new(0.0, ground.height, 0.0))
        .pickable(false)
        .shadows(false, true);
        add_static(&mut scene, descriptor);

        log::info!(
            "Built {self} scene with {} entities and {} lights",
            scene.entities().len(),
            scene.lights.len()
        );

        SceneSetup {
            scene,
            camera: self.camera(),
            outline_scale: self.outline_scale(),
            outline_color: self.outline_color(),
        }
    }
}

/// Adds an entity whose mesh was registered just before it.
fn add_static(scene: &mut Scene, descriptor: EntityDescriptor) {
    if let Err(err) = scene.add_entity(descriptor) {
        log::error!("Preset entity rejected: {err}");
    }
}

impl fmt::Display for ScenePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScenePreset::Classic => "classic",
            ScenePreset::Studio => "studio",
        })
    }
}
