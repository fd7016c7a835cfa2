use super::*;
use crate::common::{EPSILON, Ray, RgbaColor};
use cgmath::{Deg, InnerSpace, Point3, Quaternion, Rotation3, Vector3};

fn red() -> Material {
    Material::from_color(RgbaColor::from_hex(0xff0000))
}

/// Camera on +Z looking at the origin with a square viewport.
fn front_camera() -> (Camera, Viewport) {
    let mut camera = Camera::looking_at_origin(Point3::new(0.0, 0.0, 10.0), 60.0, 0.1, 100.0);
    let viewport = Viewport::new(400, 400);
    camera.aspect = viewport.aspect();
    (camera, viewport)
}

fn classic_setup(viewport: Viewport) -> SceneSetup {
    let mut setup = ScenePreset::Classic.build();
    setup.camera.aspect = viewport.aspect();
    setup
}

// ========================================================================
// Scene container
// ========================================================================

#[test]
fn test_scene_new_is_empty() {
    let scene = Scene::new();
    assert!(scene.entities().is_empty());
    assert!(scene.lights.is_empty());
    assert_eq!(scene.meshes().count(), 0);
    assert!(scene.bounding().is_none());
}

#[test]
fn test_ids_are_sequential() {
    let mut scene = Scene::new();
    let m1 = scene.add_mesh(Mesh::box_mesh(1.0, 1.0, 1.0));
    let m2 = scene.add_mesh(Mesh::sphere(1.0, 8, 8));
    assert_eq!((m1, m2), (1, 2));

    let e1 = scene.add_entity(EntityDescriptor::new("a", m1, red())).unwrap();
    let e2 = scene.add_entity(EntityDescriptor::new("b", m2, red())).unwrap();
    assert_eq!((e1, e2), (1, 2));
    assert_eq!(scene.get_entity(e2).unwrap().name, "b");
}

#[test]
fn test_add_entity_unknown_mesh() {
    let mut scene = Scene::new();
    let err = scene
        .add_entity(EntityDescriptor::new("orphan", 42, red()))
        .unwrap_err();
    assert_eq!(err, SceneError::UnknownMesh(42));
    assert!(scene.entities().is_empty());
}

#[test]
fn test_descriptor_defaults_and_flags() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::plane(2.0, 2.0));
    let id = scene
        .add_entity(
            EntityDescriptor::new("floor", mesh, red())
                .at(Point3::new(0.0, -1.0, 0.0))
                .pickable(false)
                .shadows(false, true),
        )
        .unwrap();

    let entity = scene.get_entity(id).unwrap();
    assert!(!entity.pickable);
    assert!(!entity.cast_shadow);
    assert!(entity.receive_shadow);
    assert_eq!(entity.transform.position, Point3::new(0.0, -1.0, 0.0));
    assert_eq!(scene.pickable_entities().count(), 0);
}

#[test]
fn test_entity_bounds_follow_transform() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::box_mesh(1.0, 1.0, 1.0));
    let id = scene
        .add_entity(EntityDescriptor::new("box", mesh, red()).at(Point3::new(5.0, 0.0, 0.0)))
        .unwrap();

    let bounds = scene.entity_bounds(scene.get_entity(id).unwrap()).unwrap();
    assert!((bounds.min.x - 4.5).abs() < EPSILON);

    scene.get_entity_mut(id).unwrap().transform.scale = Vector3::new(4.0, 4.0, 4.0);
    let bounds = scene.entity_bounds(scene.get_entity(id).unwrap()).unwrap();
    assert!((bounds.min.x - 3.0).abs() < EPSILON);
    assert!((bounds.max.y - 2.0).abs() < EPSILON);
}

#[test]
fn test_scene_bounding_merges_entities() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::box_mesh(2.0, 2.0, 2.0));
    scene
        .add_entity(EntityDescriptor::new("a", mesh, red()).at(Point3::new(-5.0, 0.0, 0.0)))
        .unwrap();
    scene
        .add_entity(EntityDescriptor::new("b", mesh, red()).at(Point3::new(5.0, 3.0, 0.0)))
        .unwrap();

    let bounds = scene.bounding().unwrap();
    assert!((bounds.min.x + 6.0).abs() < EPSILON);
    assert!((bounds.max.x - 6.0).abs() < EPSILON);
    assert!((bounds.max.y - 4.0).abs() < EPSILON);
}

// ========================================================================
// Presets
// ========================================================================

#[test]
fn test_classic_preset_layout() {
    let setup = ScenePreset::Classic.build();
    let scene = &setup.scene;

    // Five objects plus the ground.
    assert_eq!(scene.entities().len(), 6);
    assert_eq!(scene.pickable_entities().count(), 5);

    let expected = [
        (-3.0, 0xff5555),
        (0.0, 0x55ff55),
        (3.0, 0x5555ff),
        (-1.5, 0xffff55),
        (2.0, 0xff55ff),
    ];
    for (entity, (x, color)) in scene.pickable_entities().zip(expected) {
        assert_eq!(entity.transform.position.x, x);
        assert_eq!(entity.material.base_color, RgbaColor::from_hex(color));
        assert!(entity.cast_shadow);
    }

    let ground = scene.find_entity_by_name("ground").unwrap();
    assert!(!ground.pickable);
    assert!(ground.receive_shadow);
    assert_eq!(ground.transform.position.y, -1.0);

    assert_eq!(setup.camera.eye, Point3::new(8.0, 8.0, 8.0));
    assert_eq!(setup.camera.fovy, 60.0);
    assert_eq!(setup.outline_scale, 1.08);
    assert_eq!(setup.outline_color, RgbaColor::CYAN);
    assert_eq!(scene.background, RgbaColor::from_hex(0x222233));
    assert_eq!(scene.lights.len(), 2);
}

#[test]
fn test_studio_preset_layout() {
    let setup = ScenePreset::Studio.build();
    let scene = &setup.scene;

    assert_eq!(scene.pickable_entities().count(), 5);
    assert_eq!(setup.outline_scale, 1.05);
    assert_eq!(setup.outline_color, RgbaColor::WHITE.with_alpha(0.8));
    assert!(scene
        .lights
        .iter()
        .any(|l| l.light_type() == LightType::Point));
    assert!(scene.find_entity_by_name("tetrahedron-5").is_some());
}

#[test]
fn test_preset_entities_have_meshes() {
    for preset in ScenePreset::ALL {
        let setup = preset.build();
        for entity in setup.scene.entities() {
            let mesh = setup.scene.get_mesh(entity.mesh).unwrap();
            assert!(mesh.triangle_count() > 0, "{preset}: {} is empty", entity.name);
        }
    }
}

// ========================================================================
// Picking
// ========================================================================

#[test]
fn test_pick_all_sorted_and_nearest_wins() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::box_mesh(1.0, 1.0, 1.0));
    let far = scene
        .add_entity(EntityDescriptor::new("far", mesh, red()).at(Point3::new(0.0, 0.0, -3.0)))
        .unwrap();
    let near = scene
        .add_entity(EntityDescriptor::new("near", mesh, red()))
        .unwrap();

    // Off the face diagonals so each face yields exactly one triangle hit.
    let ray = Ray::new(Point3::new(0.1, 0.2, 10.0), Vector3::new(0.0, 0.0, -1.0));
    let hits = pick_all_from_ray(&ray, &scene, scene.entities());

    // Front and back face of each box.
    assert_eq!(hits.len(), 4);
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert_eq!(hits[0].entity_id, near);
    assert!((hits[0].distance - 9.5).abs() < 1e-4);
    assert_eq!(hits[3].entity_id, far);

    let (camera, viewport) = front_camera();
    assert_eq!(pick_pickable(200.0, 200.0, viewport, &camera, &scene), Some(near));
}

#[test]
fn test_pick_respects_candidate_set() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::box_mesh(1.0, 1.0, 1.0));
    let front = scene
        .add_entity(EntityDescriptor::new("front", mesh, red()).pickable(false))
        .unwrap();
    let back = scene
        .add_entity(EntityDescriptor::new("back", mesh, red()).at(Point3::new(0.0, 0.0, -3.0)))
        .unwrap();

    let (camera, viewport) = front_camera();
    assert_eq!(pick_pickable(200.0, 200.0, viewport, &camera, &scene), Some(back));

    let only_front = scene.entities().iter().filter(|e| e.id == front);
    assert_eq!(pick(200.0, 200.0, viewport, &camera, &scene, only_front), Some(front));
}

#[test]
fn test_pick_uses_world_distance_under_scale() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::box_mesh(1.0, 1.0, 1.0));
    let small = scene
        .add_entity(EntityDescriptor::new("small", mesh, red()).at(Point3::new(0.0, 0.0, 1.0)))
        .unwrap();
    let big = scene
        .add_entity(EntityDescriptor::new("big", mesh, red()).at(Point3::new(0.0, 0.0, -2.0)))
        .unwrap();
    scene.get_entity_mut(big).unwrap().transform.scale = Vector3::new(10.0, 10.0, 1.0);

    // The big box's front face (z = -1.5) is behind the small one's (z = 1.5).
    let (camera, viewport) = front_camera();
    assert_eq!(pick_pickable(200.0, 200.0, viewport, &camera, &scene), Some(small));

    // Off to the side only the scaled box is under the pointer.
    let side = camera.project_point_screen(Point3::new(3.0, 0.0, -1.5), viewport);
    assert_eq!(pick_pickable(side.x, side.y, viewport, &camera, &scene), Some(big));
}

#[test]
fn test_pick_rotated_entity() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::box_mesh(4.0, 0.2, 0.2));
    let bar = scene.add_entity(EntityDescriptor::new("bar", mesh, red())).unwrap();

    let (camera, viewport) = front_camera();
    let above = camera.project_point_screen(Point3::new(0.0, 1.5, 0.0), viewport);
    assert_eq!(pick_pickable(above.x, above.y, viewport, &camera, &scene), None);

    scene.get_entity_mut(bar).unwrap().transform.rotation = Quaternion::from_angle_z(Deg(90.0));
    assert_eq!(pick_pickable(above.x, above.y, viewport, &camera, &scene), Some(bar));
}

#[test]
fn test_pick_empty_viewport_is_none() {
    let setup = ScenePreset::Classic.build();
    let viewport = Viewport::new(0, 0);
    assert_eq!(pick_pickable(0.0, 0.0, viewport, &setup.camera, &setup.scene), None);
}

#[test]
fn test_pick_ground_is_ignored() {
    let viewport = Viewport::new(800, 600);
    let setup = classic_setup(viewport);
    let on_ground = setup
        .camera
        .project_point_screen(Point3::new(6.0, -1.0, -6.0), viewport);
    assert_eq!(
        pick_pickable(on_ground.x, on_ground.y, viewport, &setup.camera, &setup.scene),
        None
    );
}

#[test]
fn test_pick_misses_when_ray_misses_all_bounds() {
    let viewport = Viewport::new(320, 240);
    let setup = classic_setup(viewport);
    let scene = &setup.scene;

    let mut misses = 0;
    for py in (0..240).step_by(8) {
        for px in (0..320).step_by(8) {
            let (x, y) = (px as f32 + 0.5, py as f32 + 0.5);
            let ray = setup.camera.ray_from_screen(x, y, viewport).unwrap();
            let touches_any = scene
                .pickable_entities()
                .filter_map(|e| scene.entity_bounds(e))
                .any(|b| b.intersects_ray(&ray).is_some());
            if !touches_any {
                misses += 1;
                assert_eq!(pick_pickable(x, y, viewport, &setup.camera, scene), None);
            }
        }
    }
    assert!(misses > 0);
}

#[test]
fn test_pick_each_classic_object_at_its_center() {
    let viewport = Viewport::new(1280, 720);
    let setup = classic_setup(viewport);

    for entity in setup.scene.pickable_entities() {
        let screen = setup
            .camera
            .project_point_screen(entity.transform.position, viewport);
        let ray = setup.camera.ray_from_screen(screen.x, screen.y, viewport).unwrap();
        let to_center = (entity.transform.position - ray.origin).normalize();
        assert!((to_center - ray.direction).magnitude() < 1e-3);

        // The torus is open at its center, aim at its tube instead.
        let target = if entity.name.starts_with("torus") {
            entity.transform.position + Vector3::new(0.5, 0.0, 0.0)
        } else {
            entity.transform.position
        };
        let screen = setup.camera.project_point_screen(target, viewport);
        assert_eq!(
            pick_pickable(screen.x, screen.y, viewport, &setup.camera, &setup.scene),
            Some(entity.id),
            "{} not picked at its center",
            entity.name
        );
    }
}
