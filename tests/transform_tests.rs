//! Transform and hierarchy tests
//!
//! Tests for:
//! - Transform TRS operations and dirty checking
//! - Euler angle round-trip conversions
//! - look_at orientation
//! - Pose copies from simulated bodies
//! - World matrix propagation through the scene hierarchy

use glam::{Affine3A, Mat4, Quat, Vec3};
use orrery::scene::transform::Transform;
use orrery::scene::{Camera, Node, Scene};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

// ============================================================================
// Transform Unit Tests
// ============================================================================

#[test]
fn transform_default_is_identity() {
    let t = Transform::new();
    assert_eq!(t.position, Vec3::ZERO);
    assert_eq!(t.rotation, Quat::IDENTITY);
    assert_eq!(t.scale, Vec3::ONE);
    assert_eq!(*t.local_matrix(), Affine3A::IDENTITY);
}

#[test]
fn transform_update_local_matrix_dirty_check() {
    let mut t = Transform::new();

    // A fresh transform is always dirty once.
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());

    t.position = Vec3::new(1.0, 2.0, 3.0);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());
}

#[test]
fn transform_local_matrix_reflects_trs() {
    let mut t = Transform::new();
    t.position = Vec3::new(1.0, 2.0, 3.0);
    t.scale = Vec3::splat(2.0);
    t.update_local_matrix();

    let p = t.local_matrix().transform_point3(Vec3::X);
    assert!(vec3_approx(p, Vec3::new(3.0, 2.0, 3.0)));
}

#[test]
fn transform_euler_roundtrip() {
    let mut t = Transform::new();
    t.set_rotation_euler(0.3, FRAC_PI_4, 0.1);
    let euler = t.rotation_euler();
    assert!((euler.x - 0.3).abs() < 1e-4);
    assert!((euler.y - FRAC_PI_4).abs() < 1e-4);
    assert!((euler.z - 0.1).abs() < 1e-4);
}

#[test]
fn transform_look_at_basic() {
    let mut t = Transform::new();
    t.look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::Y);

    t.update_local_matrix();
    let mat = Mat4::from(*t.local_matrix());
    let forward = -mat.z_axis.truncate().normalize();
    assert!(vec3_approx(forward, Vec3::NEG_Z));
}

#[test]
fn transform_look_at_collinear_up_noop() {
    let mut t = Transform::new();
    let original_rotation = t.rotation;
    t.look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::Y);
    assert_eq!(t.rotation, original_rotation);
}

#[test]
fn transform_set_pose_keeps_rotation_when_not_simulated() {
    let spin = Quat::from_rotation_y(FRAC_PI_2);
    let mut t = Transform::new();
    t.rotation = spin;

    t.set_pose(Vec3::new(5.0, -3.0, 7.0), None);
    assert!(vec3_approx(t.position, Vec3::new(5.0, -3.0, 7.0)));
    assert_eq!(t.rotation, spin);

    t.set_pose(Vec3::ZERO, Some(Quat::IDENTITY));
    assert_eq!(t.rotation, Quat::IDENTITY);
}

#[test]
fn transform_pose_change_rebuilds_local_matrix() {
    let mut t = Transform::new();
    t.update_local_matrix();

    t.set_pose(Vec3::new(0.0, 2.0, 0.0), Some(Quat::from_rotation_z(FRAC_PI_2)));
    assert!(t.update_local_matrix());

    let p = t.local_matrix().transform_point3(Vec3::X);
    assert!(vec3_approx(p, Vec3::new(0.0, 3.0, 0.0)));
}

#[test]
fn transform_mark_dirty_forces_update() {
    let mut t = Transform::new();
    t.update_local_matrix();
    assert!(!t.update_local_matrix());

    t.mark_dirty();
    assert!(t.update_local_matrix());
}

// ============================================================================
// Hierarchy Propagation
// ============================================================================

fn chain(scene: &mut Scene, length: usize) -> Vec<orrery::scene::NodeHandle> {
    let mut handles = Vec::with_capacity(length);
    let mut parent = None;
    for i in 0..length {
        let mut node = Node::new(&format!("link_{i}"));
        node.transform.position = Vec3::X;
        let handle = match parent {
            Some(p) => scene.add_to_parent(node, p),
            None => scene.add_node(node),
        };
        handles.push(handle);
        parent = Some(handle);
    }
    handles
}

#[test]
fn hierarchy_chain_world_positions() {
    let mut scene = Scene::new();
    let handles = chain(&mut scene, 4);
    scene.update_matrix_world();

    for (i, &h) in handles.iter().enumerate() {
        let x = scene.get_node(h).unwrap().transform.world_position().x;
        assert!(approx_eq(x, (i + 1) as f32), "link {i} at x={x}");
    }
}

#[test]
fn hierarchy_with_rotation_and_scale() {
    let mut scene = Scene::new();
    let parent = scene.build_node("parent").with_scale(2.0).build();
    scene.get_node_mut(parent).unwrap().transform.rotation = Quat::from_rotation_z(FRAC_PI_2);
    let child = scene.build_node("child").with_position(1.0, 0.0, 0.0).with_parent(parent).build();

    scene.update_matrix_world();

    // Scaled to 2 along X, then rotated onto +Y.
    let p = scene.get_node(child).unwrap().transform.world_position();
    assert!(vec3_approx(p, Vec3::new(0.0, 2.0, 0.0)), "got {p}");
}

#[test]
fn moving_parent_moves_child_on_next_update() {
    let mut scene = Scene::new();
    let handles = chain(&mut scene, 2);
    scene.update_matrix_world();

    scene.get_node_mut(handles[0]).unwrap().transform.position = Vec3::new(0.0, 5.0, 0.0);
    scene.update_matrix_world();

    let p = scene.get_node(handles[1]).unwrap().transform.world_position();
    assert!(vec3_approx(p, Vec3::new(1.0, 5.0, 0.0)));
}

#[test]
fn hierarchy_subtree_update() {
    let mut scene = Scene::new();
    let handles = chain(&mut scene, 3);
    scene.update_matrix_world();

    scene.get_node_mut(handles[1]).unwrap().transform.position = Vec3::new(0.0, 0.0, 2.0);
    scene.update_subtree(handles[1]);

    let p = scene.get_node(handles[2]).unwrap().transform.world_position();
    assert!(vec3_approx(p, Vec3::new(2.0, 0.0, 2.0)), "got {p}");
}

#[test]
fn hierarchy_camera_sync_on_update() {
    let mut scene = Scene::new();
    let cam = scene.add_camera(Camera::new_perspective(60.0, 1.0, 0.1, 100.0));
    scene.get_node_mut(cam).unwrap().transform.position = Vec3::new(0.0, 5.0, 10.0);

    scene.update_matrix_world();

    let (_, camera) = scene.active_camera().unwrap();
    assert!(vec3_approx(camera.position(), Vec3::new(0.0, 5.0, 10.0)));
}

#[test]
fn deeply_nested_hierarchy_no_stack_overflow() {
    let depth = 500;
    let mut scene = Scene::new();
    let handles = chain(&mut scene, depth);

    scene.update_matrix_world();

    let last = scene.get_node(*handles.last().unwrap()).unwrap();
    let x = last.transform.world_position().x;
    assert!((x - depth as f32).abs() < 1e-2, "expected {depth}, got {x}");
}
