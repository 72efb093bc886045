//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: add/remove nodes, attach hierarchy
//! - Cameras: activation and removal
//! - Lights: placement, aiming, shadows, removal
//! - Queries: names, mesh nodes, visibility
//! - Prefab instantiation

use glam::Vec3;
use orrery::assets::{Prefab, PrefabNode};
use orrery::scene::{Camera, Geometry, Light, LightKind, Material, Mesh, Node, Scene, ShadowConfig};

fn ball() -> Mesh {
    Mesh::new(Geometry::sphere(0.5), Material::default())
}

// ============================================================================
// Node Creation & Removal
// ============================================================================

#[test]
fn scene_add_node_to_root() {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new("A"));
    assert!(scene.root_nodes.contains(&handle));
    assert_eq!(scene.get_node(handle).unwrap().name, "A");
}

#[test]
fn scene_remove_node_removes_from_root() {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new("A"));

    assert_eq!(scene.remove_node(handle), 1);
    assert!(!scene.root_nodes.contains(&handle));
    assert!(scene.get_node(handle).is_none());
}

#[test]
fn scene_remove_node_removes_subtree() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let child = scene.add_to_parent(Node::new("child"), parent);
    let grandchild = scene.add_to_parent(Node::new("grandchild"), child);

    assert_eq!(scene.remove_node(parent), 3);

    assert!(scene.get_node(parent).is_none());
    assert!(scene.get_node(child).is_none());
    assert!(scene.get_node(grandchild).is_none());
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn scene_remove_stale_handle_is_noop() {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new("A"));
    scene.remove_node(handle);
    assert_eq!(scene.remove_node(handle), 0);
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn scene_attach_sets_parent_child() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let child = scene.add_node(Node::new("child"));

    scene.attach(child, parent);

    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
    assert!(scene.get_node(parent).unwrap().children().contains(&child));
    assert!(!scene.root_nodes.contains(&child));
}

#[test]
fn scene_attach_removes_from_old_parent() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("a"));
    let b = scene.add_node(Node::new("b"));
    let child = scene.add_to_parent(Node::new("child"), a);

    scene.attach(child, b);

    assert!(!scene.get_node(a).unwrap().children().contains(&child));
    assert!(scene.get_node(b).unwrap().children().contains(&child));
}

#[test]
fn scene_attach_to_self_is_noop() {
    let mut scene = Scene::new();
    let node = scene.add_node(Node::new("n"));
    scene.attach(node, node);
    assert!(scene.get_node(node).unwrap().parent().is_none());
}

#[test]
fn scene_attach_below_descendant_is_rejected() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let child = scene.add_to_parent(Node::new("child"), parent);

    scene.attach(parent, child);

    assert!(scene.get_node(parent).unwrap().parent().is_none());
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
}

#[test]
fn scene_add_to_missing_parent_falls_back_to_root() {
    let mut scene = Scene::new();
    let gone = scene.add_node(Node::new("gone"));
    scene.remove_node(gone);

    let orphan = scene.add_to_parent(Node::new("orphan"), gone);
    assert!(scene.root_nodes.contains(&orphan));
}

// ============================================================================
// Cameras & Queries
// ============================================================================

#[test]
fn scene_first_camera_becomes_active() {
    let mut scene = Scene::new();
    assert!(scene.active_camera().is_none());

    let first = scene.add_camera(Camera::new_perspective(75.0, 1.0, 0.1, 100.0));
    let _second = scene.add_camera(Camera::new_perspective(45.0, 1.0, 0.1, 100.0));

    let (active, _) = scene.active_camera().unwrap();
    assert_eq!(active, first);
}

#[test]
fn scene_removing_active_camera_clears_it() {
    let mut scene = Scene::new();
    let cam = scene.add_camera(Camera::new_perspective(75.0, 1.0, 0.1, 100.0));
    scene.remove_node(cam);
    assert!(scene.active_camera().is_none());
    assert!(scene.cameras.is_empty());
}

#[test]
fn scene_find_by_name_and_mesh_nodes() {
    let mut scene = Scene::new();
    let ball_node = scene.add_mesh("Ball", ball(), Vec3::ZERO);
    scene.add_node(Node::new("Empty"));

    assert_eq!(scene.find_by_name("Ball"), Some(ball_node));
    assert!(scene.find_by_name("Nope").is_none());
    assert_eq!(scene.mesh_nodes().count(), 1);
}

#[test]
fn scene_hidden_parent_hides_children() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let child = scene.add_to_parent(Node::with_mesh("child", ball()), parent);

    assert!(scene.is_visible(child));
    scene.get_node_mut(parent).unwrap().visible = false;
    assert!(!scene.is_visible(child));
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn scene_add_light_places_and_aims_it() {
    let mut scene = Scene::new();
    let sun = scene.add_light(Light::new_directional(Vec3::ONE, 0.2), Vec3::splat(5.0));

    let node = scene.get_node(sun).unwrap();
    assert_eq!(node.transform.position, Vec3::splat(5.0));
    let forward = node.transform.rotation * Vec3::NEG_Z;
    assert!((forward - Vec3::splat(-1.0).normalize()).length() < 1e-5);

    assert_eq!(scene.get_light(sun).unwrap().kind, LightKind::Directional);
    assert_eq!(scene.light_nodes().count(), 1);
    assert_eq!(scene.mesh_nodes().count(), 0);
}

#[test]
fn scene_point_light_keeps_identity_rotation() {
    let mut scene = Scene::new();
    let bulb = scene.add_light(Light::new_point(Vec3::ONE, 1.0, 10.0), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(scene.get_node(bulb).unwrap().transform.rotation, glam::Quat::IDENTITY);
}

#[test]
fn ambient_light_never_casts_shadow() {
    let shadow = ShadowConfig {
        map_size: 1024,
        far: 15.0,
        ..ShadowConfig::default()
    };
    let ambient = Light::new_ambient(Vec3::ONE, 0.7).with_shadow(shadow);
    let sun = Light::new_directional(Vec3::ONE, 0.2).with_shadow(shadow);

    assert!(ambient.cast_shadow);
    assert!(!ambient.casts_shadow());
    assert!(sun.casts_shadow());
    assert_eq!(sun.shadow.map_size, 1024);
    assert!((sun.shadow.far - 15.0).abs() < f32::EPSILON);
    assert!(!Light::new_spot(Vec3::ONE, 1.0, 5.0, 0.2, 0.4).casts_shadow());
}

#[test]
fn scene_removing_light_node_drops_light() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("rig"));
    let lamp = scene.add_light(Light::new_point(Vec3::ONE, 1.0, 4.0), Vec3::ZERO);
    scene.attach(lamp, parent);

    scene.get_light_mut(lamp).unwrap().intensity = 2.0;
    assert!((scene.get_light(lamp).unwrap().intensity - 2.0).abs() < f32::EPSILON);

    assert_eq!(scene.remove_node(parent), 2);
    assert!(scene.lights.is_empty());
    assert!(scene.get_light(lamp).is_none());
}

// ============================================================================
// Prefabs
// ============================================================================

fn two_level_prefab() -> Prefab {
    let mut prefab = Prefab::new("Duck");

    let mut root = PrefabNode::new();
    root.name = Some("Root".to_string());
    root.transform.position = Vec3::new(0.0, 1.0, 0.0);
    root.children_indices = vec![1];

    let mut body = PrefabNode::new();
    body.name = Some("Body".to_string());
    body.transform.position = Vec3::new(2.0, 0.0, 0.0);
    body.mesh = Some(ball());

    prefab.nodes = vec![root, body];
    prefab.root_indices = vec![0];
    prefab
}

#[test]
fn instantiate_builds_node_tree_under_group() {
    let mut scene = Scene::new();
    let prefab = two_level_prefab();

    let group = scene.instantiate(&prefab, "Duck");

    let root = scene.find_by_name("Root").unwrap();
    let body = scene.find_by_name("Body").unwrap();
    assert_eq!(scene.get_node(root).unwrap().parent(), Some(group));
    assert_eq!(scene.get_node(body).unwrap().parent(), Some(root));
    assert!(scene.get_node(body).unwrap().mesh.is_some());
}

#[test]
fn instantiated_group_moves_whole_model() {
    let mut scene = Scene::new();
    let group = scene.instantiate(&two_level_prefab(), "Duck");
    scene.get_node_mut(group).unwrap().transform.position = Vec3::new(0.0, 0.0, -3.0);

    scene.update_matrix_world();

    let body = scene.find_by_name("Body").unwrap();
    let p = scene.get_node(body).unwrap().transform.world_position();
    assert!((p - Vec3::new(2.0, 1.0, -3.0)).length() < 1e-5, "got {p}");
}

#[test]
fn instantiate_twice_gives_independent_copies() {
    let mut scene = Scene::new();
    let prefab = two_level_prefab();
    let a = scene.instantiate(&prefab, "A");
    let b = scene.instantiate(&prefab, "B");

    assert_eq!(scene.node_count(), 6);
    scene.remove_node(a);
    assert_eq!(scene.node_count(), 3);
    assert!(scene.contains(b));
}
