use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::scene::{Blending, Geometry, Material, Mesh, NodeHandle, PointCloud, Scene};
use crate::utils::color;

/// Spiral galaxy shape and palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalaxyParameters {
    pub count: usize,
    /// Point sprite size
    pub size: f32,
    pub radius: f32,
    pub branches: u32,
    /// Extra branch angle per unit of distance from the center, radians
    pub spin: f32,
    /// Largest scatter away from the branch, as a fraction of the point's radius
    pub randomness: f32,
    /// Higher values pull the scatter towards the branch
    pub randomness_power: f32,
    pub inside_color: String,
    pub outside_color: String,
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            count: 100_000,
            size: 0.01,
            radius: 5.0,
            branches: 3,
            spin: 1.0,
            randomness: 0.2,
            randomness_power: 3.0,
            inside_color: "#ff6030".to_string(),
            outside_color: "#1b3984".to_string(),
        }
    }
}

impl GalaxyParameters {
    pub fn validate(&self) -> Result<()> {
        if self.branches == 0 {
            return Err(Error::InvalidConfig {
                field: "branches",
                reason: "a galaxy needs at least one branch".to_string(),
            });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(Error::InvalidConfig {
                field: "radius",
                reason: format!("must be positive, got {}", self.radius),
            });
        }
        if self.randomness < 0.0 {
            return Err(Error::InvalidConfig {
                field: "randomness",
                reason: format!("must not be negative, got {}", self.randomness),
            });
        }
        if self.randomness_power <= 0.0 {
            return Err(Error::InvalidConfig {
                field: "randomness_power",
                reason: format!("must be positive, got {}", self.randomness_power),
            });
        }
        Ok(())
    }
}

/// Generates galaxy points and their colors.
///
/// Point `i` sits on branch `i % branches` at a uniformly random distance
/// from the center. Its angle is the branch angle plus `spin * distance`,
/// and each axis gets a signed scatter of `rand^power * randomness * distance`.
/// Colors blend from the inside color to the outside color with distance.
pub fn generate(params: &GalaxyParameters, seed: u64) -> Result<PointCloud> {
    params.validate()?;
    let inside = color::parse_hex(&params.inside_color)?;
    let outside = color::parse_hex(&params.outside_color)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut cloud = PointCloud {
        positions: Vec::with_capacity(params.count),
        colors: Vec::with_capacity(params.count),
    };

    let scatter = |rng: &mut StdRng, distance: f32| {
        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        rng.random::<f32>().powf(params.randomness_power) * sign * params.randomness * distance
    };

    for i in 0..params.count {
        let distance = rng.random::<f32>() * params.radius;
        let spin_angle = distance * params.spin;
        let branch_angle = (i % params.branches as usize) as f32 / params.branches as f32 * TAU;

        let offset = Vec3::new(
            scatter(&mut rng, distance),
            scatter(&mut rng, distance),
            scatter(&mut rng, distance),
        );
        let angle = branch_angle + spin_angle;
        cloud
            .positions
            .push(Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance) + offset);
        cloud.colors.push(inside.lerp(outside, distance / params.radius));
    }

    Ok(cloud)
}

/// A galaxy living in a scene, regenerated whenever its parameters change.
pub struct Galaxy {
    pub params: GalaxyParameters,
    /// Spin around +Y, radians per second
    pub rotation_speed: f32,
    seed: u64,
    node: Option<NodeHandle>,
}

impl Galaxy {
    #[must_use]
    pub fn new(params: GalaxyParameters, seed: u64) -> Self {
        Self {
            params,
            rotation_speed: 0.08,
            seed,
            node: None,
        }
    }

    #[must_use]
    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }

    /// Builds a fresh point cloud, removing the previous one from `scene` first.
    pub fn regenerate(&mut self, scene: &mut Scene) -> Result<NodeHandle> {
        let cloud = generate(&self.params, self.seed)?;

        if let Some(old) = self.node.take() {
            scene.remove_node(old);
        }

        let mut material = Material::points(self.params.size, true);
        material.depth_write = false;
        material.blending = Blending::Additive;
        material.vertex_colors = true;

        log::debug!(
            "Generated galaxy: {} points, {} branches",
            cloud.len(),
            self.params.branches
        );
        let handle = scene.add_mesh("Galaxy", Mesh::new(Geometry::Points(cloud), material), Vec3::ZERO);
        self.node = Some(handle);
        Ok(handle)
    }

    /// Sets the galaxy's spin for `elapsed` seconds of simulation.
    pub fn update(&self, scene: &mut Scene, elapsed: f32) {
        if let Some(node) = self.node.and_then(|h| scene.get_node_mut(h)) {
            node.transform.set_rotation_euler(0.0, elapsed * self.rotation_speed, 0.0);
        }
    }

    /// Removes the galaxy from `scene`.
    pub fn dispose(&mut self, scene: &mut Scene) {
        if let Some(old) = self.node.take() {
            scene.remove_node(old);
        }
    }
}
