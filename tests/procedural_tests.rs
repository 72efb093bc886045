//! Procedural Geometry Tests
//!
//! Tests for:
//! - Galaxy generation: bounds, determinism, colors, parameter validation
//! - Galaxy lifecycle in a scene: regenerate, spin, dispose
//! - Particle fields: placement and the sine wave animation

use glam::Vec3;
use orrery::procedural::galaxy::{self, Galaxy, GalaxyParameters};
use orrery::procedural::particles::{self, ParticleField, ParticleFieldOptions};
use orrery::scene::{Blending, Geometry, Scene};
use orrery::Error;

fn small_galaxy() -> GalaxyParameters {
    GalaxyParameters {
        count: 2_000,
        ..GalaxyParameters::default()
    }
}

fn points_of(scene: &Scene, node: orrery::NodeHandle) -> Vec<Vec3> {
    match &scene.get_node(node).unwrap().mesh.as_ref().unwrap().geometry {
        Geometry::Points(cloud) => cloud.positions.clone(),
        other => panic!("expected points, got {other:?}"),
    }
}

// ============================================================================
// Galaxy Generation
// ============================================================================

#[test]
fn galaxy_points_stay_within_scattered_radius() {
    let params = small_galaxy();
    let cloud = galaxy::generate(&params, 1).unwrap();

    assert_eq!(cloud.len(), params.count);
    assert_eq!(cloud.colors.len(), params.count);

    let reach = params.radius * (1.0 + params.randomness * 3.0_f32.sqrt()) + 1e-4;
    let max_height = params.randomness * params.radius + 1e-4;
    for p in &cloud.positions {
        assert!(p.length() <= reach, "point {p} outside {reach}");
        assert!(p.y.abs() <= max_height);
    }
}

#[test]
fn galaxy_is_deterministic_per_seed() {
    let params = small_galaxy();
    let a = galaxy::generate(&params, 42).unwrap();
    let b = galaxy::generate(&params, 42).unwrap();
    let c = galaxy::generate(&params, 43).unwrap();

    assert_eq!(a.positions, b.positions);
    assert_eq!(a.colors, b.colors);
    assert_ne!(a.positions, c.positions);
}

#[test]
fn galaxy_without_randomness_lies_on_branches() {
    let params = GalaxyParameters {
        count: 300,
        randomness: 0.0,
        spin: 0.0,
        branches: 3,
        ..GalaxyParameters::default()
    };
    let cloud = galaxy::generate(&params, 5).unwrap();

    for (i, p) in cloud.positions.iter().enumerate() {
        assert!(p.y.abs() < 1e-6);
        if p.length() < 1e-3 {
            continue;
        }
        let expected = (i % 3) as f32 / 3.0 * std::f32::consts::TAU;
        let dir = Vec3::new(expected.cos(), 0.0, expected.sin());
        assert!(p.normalize().dot(dir) > 0.9999, "point {i} off its branch");
    }
}

#[test]
fn galaxy_colors_blend_between_palette_ends() {
    let params = small_galaxy();
    let cloud = galaxy::generate(&params, 9).unwrap();
    let inside = Vec3::new(1.0, 96.0 / 255.0, 48.0 / 255.0);
    let outside = Vec3::new(27.0 / 255.0, 57.0 / 255.0, 132.0 / 255.0);
    let lo = inside.min(outside) - 1e-5;
    let hi = inside.max(outside) + 1e-5;

    for c in &cloud.colors {
        assert!(c.cmpge(lo).all() && c.cmple(hi).all(), "color {c} out of range");
    }
}

#[test]
fn galaxy_rejects_bad_parameters() {
    let no_branches = GalaxyParameters {
        branches: 0,
        ..small_galaxy()
    };
    assert!(matches!(
        galaxy::generate(&no_branches, 0),
        Err(Error::InvalidConfig { field: "branches", .. })
    ));

    let bad_color = GalaxyParameters {
        inside_color: "#12345".to_string(),
        ..small_galaxy()
    };
    assert!(matches!(galaxy::generate(&bad_color, 0), Err(Error::InvalidColor(_))));
}

#[test]
fn galaxy_parameters_from_camel_case_json() {
    let params: GalaxyParameters =
        serde_json::from_str(r##"{ "count": 10, "randomnessPower": 2.0, "insideColor": "#ffffff" }"##)
            .unwrap();

    assert_eq!(params.count, 10);
    assert!((params.randomness_power - 2.0).abs() < f32::EPSILON);
    assert_eq!(params.inside_color, "#ffffff");
    assert_eq!(params.branches, 3);
}

// ============================================================================
// Galaxy in a Scene
// ============================================================================

#[test]
fn regenerate_replaces_previous_cloud() {
    let mut scene = Scene::new();
    let mut galaxy = Galaxy::new(small_galaxy(), 3);

    let first = galaxy.regenerate(&mut scene).unwrap();
    galaxy.params.branches = 5;
    let second = galaxy.regenerate(&mut scene).unwrap();

    assert!(!scene.contains(first));
    assert!(scene.contains(second));
    assert_eq!(scene.node_count(), 1);
    assert_eq!(galaxy.node(), Some(second));

    let material = &scene.get_node(second).unwrap().mesh.as_ref().unwrap().material;
    assert_eq!(material.blending, Blending::Additive);
    assert!(!material.depth_write);
    assert!(material.vertex_colors);
}

#[test]
fn failed_regenerate_keeps_old_cloud() {
    let mut scene = Scene::new();
    let mut galaxy = Galaxy::new(small_galaxy(), 3);
    let node = galaxy.regenerate(&mut scene).unwrap();

    galaxy.params.radius = -1.0;
    assert!(galaxy.regenerate(&mut scene).is_err());
    assert!(scene.contains(node));
    assert_eq!(galaxy.node(), Some(node));
}

#[test]
fn galaxy_spins_with_elapsed_time() {
    let mut scene = Scene::new();
    let mut galaxy = Galaxy::new(small_galaxy(), 3);
    let node = galaxy.regenerate(&mut scene).unwrap();

    galaxy.update(&mut scene, 10.0);

    let euler = scene.get_node(node).unwrap().transform.rotation_euler();
    assert!((euler.y - 0.8).abs() < 1e-4);
}

#[test]
fn dispose_removes_galaxy() {
    let mut scene = Scene::new();
    let mut galaxy = Galaxy::new(small_galaxy(), 3);
    galaxy.regenerate(&mut scene).unwrap();

    galaxy.dispose(&mut scene);
    assert_eq!(scene.node_count(), 0);
    assert!(galaxy.node().is_none());

    // Updating a disposed galaxy is harmless.
    galaxy.update(&mut scene, 1.0);
}

// ============================================================================
// Particle Fields
// ============================================================================

#[test]
fn particle_field_fills_cube() {
    let options = ParticleFieldOptions {
        count: 1_000,
        extent: 4.0,
        ..ParticleFieldOptions::default()
    };
    let cloud = particles::random_field(&options, 11);

    assert_eq!(cloud.len(), 1_000);
    assert!(cloud.colors.is_empty());
    let bounds = cloud.bounding_box();
    assert!(bounds.min.cmpge(Vec3::splat(-2.0)).all());
    assert!(bounds.max.cmple(Vec3::splat(2.0)).all());
}

#[test]
fn particle_field_random_colors() {
    let options = ParticleFieldOptions {
        count: 100,
        random_colors: true,
        ..ParticleFieldOptions::default()
    };
    let cloud = particles::random_field(&options, 11);
    assert_eq!(cloud.colors.len(), 100);
}

#[test]
fn wave_sets_heights_from_x() {
    let mut scene = Scene::new();
    let mut field = ParticleField::spawn(
        &mut scene,
        ParticleFieldOptions {
            count: 200,
            ..ParticleFieldOptions::default()
        },
        4,
    );
    field.wave_amplitude = 0.5;

    assert!(field.animate_wave(&mut scene, 1.25));

    for p in points_of(&scene, field.node()) {
        assert!((p.y - (1.25 + p.x).sin() * 0.5).abs() < 1e-5);
    }
}

#[test]
fn wave_on_removed_field_reports_false() {
    let mut scene = Scene::new();
    let field = ParticleField::spawn(&mut scene, ParticleFieldOptions::default(), 4);
    scene.remove_node(field.node());
    assert!(!field.animate_wave(&mut scene, 0.0));
}
