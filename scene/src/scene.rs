use std::collections::HashMap;

use cgmath::Point3;
use thiserror::Error;

use crate::{
    common::{Aabb, RgbaColor},
    entity::{Entity, EntityId, Material, Transform},
    light::Light,
    mesh::{Mesh, MeshId},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("mesh {0} is not registered with the scene")]
    UnknownMesh(MeshId),
}

/// Everything needed to add one entity. Flags default to a pickable object
/// that neither casts nor receives shadows.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub name: String,
    pub mesh: MeshId,
    pub material: Material,
    pub transform: Transform,
    pub pickable: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>, mesh: MeshId, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            transform: Transform::default(),
            pickable: true,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn at(mut self, position: Point3<f32>) -> Self {
        self.transform.position = position;
        self
    }

    pub fn pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }

    pub fn shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}

/// Flat container of meshes, entities and lights.
///
/// Entities keep their insertion order, which is also their draw order.
#[derive(Debug, Clone)]
pub struct Scene {
    meshes: HashMap<MeshId, Mesh>,
    entities: Vec<Entity>,
    pub lights: Vec<Light>,
    pub background: RgbaColor,
    next_mesh_id: MeshId,
    next_entity_id: EntityId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            entities: Vec::new(),
            lights: Vec::new(),
            background: RgbaColor::BLACK,
            next_mesh_id: 1,
            next_entity_id: 1,
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = self.next_mesh_id;
        self.next_mesh_id += 1;
        self.meshes.insert(id, mesh);
        id
    }

    pub fn get_mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().map(|(&id, mesh)| (id, mesh))
    }

    pub fn add_entity(&mut self, descriptor: EntityDescriptor) -> Result<EntityId, SceneError> {
        if !self.meshes.contains_key(&descriptor.mesh) {
            return Err(SceneError::UnknownMesh(descriptor.mesh));
        }
        let id = self.next_entity_id;
        self.next_entity_id += 1;

        let EntityDescriptor {
            name,
            mesh,
            material,
            transform,
            pickable,
            cast_shadow,
            receive_shadow,
        } = descriptor;
        self.entities.push(Entity {
            id,
            name,
            mesh,
            material,
            transform,
            pickable,
            cast_shadow,
            receive_shadow,
        });
        Ok(id)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn find_entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn pickable_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.pickable)
    }

    /// World-space bounds of one entity.
    pub fn entity_bounds(&self, entity: &Entity) -> Option<Aabb> {
        let local = self.meshes.get(&entity.mesh)?.bounding()?;
        Some(local.transform(&entity.world_transform()))
    }

    /// Bounds of every entity in the scene.
    pub fn bounding(&self) -> Option<Aabb> {
        self.entities
            .iter()
            .filter_map(|e| self.entity_bounds(e))
            .reduce(|acc, b| acc.merge(&b))
    }
}
