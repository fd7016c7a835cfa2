use cgmath::{
    EuclideanSpace, Matrix, Matrix3, Matrix4, One, Point3, Quaternion, SquareMatrix, Vector3,
};

use crate::{common::RgbaColor, mesh::MeshId};

/// Identifier of an entity in a [`crate::Scene`]. Ids start at 1 and are
/// never reused.
pub type EntityId = u32;

/// Translation, rotation and non-uniform scale, applied as T * R * S.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Point3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position.to_vec())
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Same placement, with the scale multiplied uniformly by `factor`.
    pub fn scaled_by(&self, factor: f32) -> Self {
        Self {
            scale: self.scale * factor,
            ..*self
        }
    }

    /// Inverse-transpose of the upper 3x3, for transforming normals.
    /// Falls back to the identity for a singular transform.
    pub fn normal_matrix(&self) -> Matrix3<f32> {
        let m = self.to_matrix();
        let linear = Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
        linear
            .invert()
            .map(|inv| inv.transpose())
            .unwrap_or_else(Matrix3::identity)
    }
}

/// Surface appearance. Shading is a simple diffuse plus specular model.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub base_color: RgbaColor,
    /// `0.0` is mirror-like, `1.0` fully diffuse.
    pub roughness: f32,
}

impl Material {
    pub fn from_color(base_color: RgbaColor) -> Self {
        Self {
            base_color,
            roughness: 0.5,
        }
    }
}

/// A renderable object: one mesh drawn with one material at one transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub mesh: MeshId,
    pub material: Material,
    pub transform: Transform,
    /// Whether pointer picking considers this entity.
    pub pickable: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Entity {
    pub fn world_transform(&self) -> Matrix4<f32> {
        self.transform.to_matrix()
    }
}
