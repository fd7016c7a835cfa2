//! Pointer picking: screen position to world ray to nearest entity.

use cgmath::{InnerSpace, Point3, SquareMatrix};

use crate::{
    camera::{Camera, Viewport},
    common::Ray,
    entity::{Entity, EntityId},
    scene::Scene,
};

/// One ray-triangle hit, expressed in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct RayPickResult {
    pub entity_id: EntityId,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub hit_point: Point3<f32>,
    pub triangle_index: usize,
    /// `(u, v, w)` with `w = 1 - u - v`.
    pub barycentric: (f32, f32, f32),
}

/// Every hit between a world-space ray and the candidate entities, nearest
/// first.
///
/// Each candidate is culled by its world bounds, then the ray is moved into
/// the entity's local space for the triangle tests. Candidates whose mesh is
/// missing or whose transform cannot be inverted are skipped.
pub fn pick_all_from_ray<'a>(
    ray: &Ray,
    scene: &'a Scene,
    candidates: impl IntoIterator<Item = &'a Entity>,
) -> Vec<RayPickResult> {
    let mut results = Vec::new();

    for entity in candidates {
        let Some(mesh) = scene.get_mesh(entity.mesh) else {
            continue;
        };
        match scene.entity_bounds(entity) {
            Some(bounds) if bounds.intersects_ray(ray).is_some() => {}
            _ => continue,
        }

        let world = entity.world_transform();
        let Some(inverse) = world.invert() else {
            continue;
        };
        let local_ray = ray.transform(&inverse);

        for hit in mesh.intersect_ray(&local_ray) {
            let hit_point = Point3::from_homogeneous(world * hit.hit_point.to_homogeneous());
            results.push(RayPickResult {
                entity_id: entity.id,
                distance: (hit_point - ray.origin).magnitude(),
                hit_point,
                triangle_index: hit.triangle_index,
                barycentric: hit.barycentric,
            });
        }
    }

    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    results
}

/// Nearest candidate under the pointer, or `None` when the ray through the
/// pixel hits nothing.
///
/// `pointer_x` and `pointer_y` are physical pixels from the top-left corner
/// of the viewport.
pub fn pick<'a>(
    pointer_x: f32,
    pointer_y: f32,
    viewport: Viewport,
    camera: &Camera,
    scene: &'a Scene,
    candidates: impl IntoIterator<Item = &'a Entity>,
) -> Option<EntityId> {
    let ray = camera.ray_from_screen(pointer_x, pointer_y, viewport)?;
    pick_all_from_ray(&ray, scene, candidates)
        .first()
        .map(|hit| hit.entity_id)
}

/// [`pick`] over every pickable entity of the scene.
pub fn pick_pickable(
    pointer_x: f32,
    pointer_y: f32,
    viewport: Viewport,
    camera: &Camera,
    scene: &Scene,
) -> Option<EntityId> {
    pick(
        pointer_x,
        pointer_y,
        viewport,
        camera,
        scene,
        scene.pickable_entities(),
    )
}
